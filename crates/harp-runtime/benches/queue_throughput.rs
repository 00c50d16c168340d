//! Benchmark: message queue push/pop and single-step dispatch.
//!
//! Measures the costs an embedder pays per message:
//!
//! - `push_pop`: N pushes followed by N pops through one queue
//! - `dispatch_get`: push + `run()` of a `get` against a permissive component
//!
//! The priority function runs outside the queue lock, so only heap
//! insertion is serialized between pushers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use harp_auth::{Context, Predicate};
use harp_event::Message;
use harp_runtime::testing::{Profile, TestBench};
use harp_runtime::MessageQueue;
use harp_types::ComponentId;
use serde_json::json;

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_throughput");
    let src = ComponentId::new("bench");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("push_pop", size), &size, |b, &n| {
            let queue = MessageQueue::new("sink");
            b.iter(|| {
                for _ in 0..n {
                    let msg = Message::new(src.clone(), "get", Context::system());
                    queue.push_message(msg).ok();
                }
                while let Some(msg) = queue.pop_next_message() {
                    black_box(msg);
                }
            });
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let bench = TestBench::new();
    let mut mem = match bench.component("mem", Profile::Permissive) {
        Ok(c) => c,
        Err(e) => panic!("build failed: {e}"),
    };
    mem.add("x", Predicate::always(), Predicate::always(), false, json!(1))
        .ok();
    let src = mem.id().clone();

    c.bench_function("dispatch_get", |b| {
        b.iter(|| {
            let msg = Message::new(src.clone(), "get", Context::system())
                .with_key("x")
                .with_context(Context::system());
            mem.push_message(msg).ok();
            black_box(mem.run().ok());
        });
    });
}

criterion_group!(benches, bench_push_pop, bench_dispatch);
criterion_main!(benches);
