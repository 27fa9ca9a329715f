//! Benchmarks for the request ledger hot path.
//!
//! Every webhook delivery does one `add_request` and one `update_request`;
//! both run under the ledger lock and must stay cheap with a full history.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hookwatch::ledger::{RequestLedger, RequestUpdate};
use serde_json::json;

fn full_ledger() -> RequestLedger {
    let ledger = RequestLedger::default();
    for i in 0..50 {
        let id = ledger.add_request("http://hooks.local/in", "POST", None, "text");
        ledger.update_request(&id, RequestUpdate::success().with_duration(100 + i));
    }
    ledger
}

fn bench_add_and_update(c: &mut Criterion) {
    let ledger = full_ledger();
    let payload = json!({"text": "hello", "sessionId": "bench"});

    c.bench_function("add_then_update_success", |b| {
        b.iter(|| {
            let id = ledger.add_request(
                "http://hooks.local/in",
                "POST",
                Some(black_box(payload.clone())),
                "text",
            );
            ledger.update_request(&id, RequestUpdate::success().with_duration(black_box(120)));
        })
    });
}

fn bench_queries(c: &mut Criterion) {
    let ledger = full_ledger();

    c.bench_function("recent_requests_10", |b| {
        b.iter(|| black_box(ledger.recent_requests(10)))
    });
    c.bench_function("requests_by_category", |b| {
        b.iter(|| black_box(ledger.requests_by_category("health-check")))
    });
}

criterion_group!(benches, bench_add_and_update, bench_queries);
criterion_main!(benches);
