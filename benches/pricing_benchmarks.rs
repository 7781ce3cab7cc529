//! Performance benchmarks for the pricing engine and checkout API.
//!
//! - Pure breakdown for short, long and very long stays
//! - Scaling of the breakdown with stay length
//! - A full `GET /checkout` quote through the router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use stay_pricing::api::{AppState, create_router};
use stay_pricing::booking::{CheckoutService, SandboxCollaborators};
use stay_pricing::calculation::compute_breakdown;
use stay_pricing::config::{ConfigLoader, PricingPolicy};
use stay_pricing::models::{NightlyRate, nightly_rates_from};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn create_stay(nights: usize) -> Vec<NightlyRate> {
    let arrival = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rates: Vec<Decimal> = (0..nights)
        .map(|i| Decimal::new(12_900 + (i as i64 % 7) * 1_000, 2))
        .collect();
    nightly_rates_from(arrival, &rates)
}

fn policy() -> PricingPolicy {
    PricingPolicy::new(Decimal::new(8, 2))
}

/// Benchmark: 3-night short stay.
fn bench_short_stay(c: &mut Criterion) {
    let stay = create_stay(3);
    let policy = policy();

    c.bench_function("breakdown_short_stay", |b| {
        b.iter(|| compute_breakdown(black_box(&stay), &policy, None))
    });
}

/// Benchmark: 45-night stay with a two-period schedule.
fn bench_long_stay(c: &mut Criterion) {
    let stay = create_stay(45);
    let policy = policy();

    c.bench_function("breakdown_long_stay", |b| {
        b.iter(|| compute_breakdown(black_box(&stay), &policy, None))
    });
}

/// Benchmark: stay length scaling, up to a year.
fn bench_scaling(c: &mut Criterion) {
    let policy = policy();
    let mut group = c.benchmark_group("breakdown_scaling");

    for nights in [7usize, 30, 90, 180, 365].iter() {
        let stay = create_stay(*nights);

        group.throughput(Throughput::Elements(*nights as u64));
        group.bench_with_input(BenchmarkId::new("nights", nights), nights, |b, _| {
            b.iter(|| compute_breakdown(black_box(&stay), &policy, None))
        });
    }

    group.finish();
}

/// Benchmark: checkout quote through the HTTP router.
fn bench_checkout_quote(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config =
        Arc::new(ConfigLoader::load("./config/rewak-studios").expect("Failed to load config"));
    let sandbox = SandboxCollaborators::new(config.clone());
    let router = create_router(AppState::new(
        CheckoutService::new(config, sandbox.collaborators()),
        None,
    ));

    c.bench_function("checkout_quote_45_nights", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .uri("/checkout?room=studio-king&check_in=2026-03-02&check_out=2026-04-16")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_short_stay,
    bench_long_stay,
    bench_scaling,
    bench_checkout_quote,
);
criterion_main!(benches);
