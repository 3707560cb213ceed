use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pose_link::{drain_into, ControlledPose, MessageQueue, RawMessage};

const MESSAGE: &str = "SET_POSITION 1.25,-3.5,12.0|SET_QUAT 0.7071,0.0,0.7071,0.0";

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    for depth in [1usize, 16, 128, 1024] {
        group.bench_with_input(BenchmarkId::new("queue_depth", depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    let queue = MessageQueue::new();
                    for _ in 0..depth {
                        queue.enqueue(RawMessage::new(MESSAGE));
                    }
                    queue
                },
                |queue| {
                    let mut pose = ControlledPose::default();
                    drain_into(&queue, |command| {
                        pose.apply(command);
                        true
                    })
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(drain_benches, bench_drain);
criterion_main!(drain_benches);
