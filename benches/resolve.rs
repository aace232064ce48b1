use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qllama::core::media::resolve;

fn make_input(tags: usize, base: &str) -> String {
    let mut input = String::new();
    for i in 0..tags {
        input.push_str(base);
        if i % 2 == 0 {
            input.push_str(&format!(" <image:/data/frames/{i:05}.jpg> "));
        } else {
            input.push_str(&format!(" <video:https://cdn.example.com/clips/{i}.mp4> "));
        }
    }
    input
}

fn bench_resolve(c: &mut Criterion) {
    let base = "compare the lighting and composition of this frame with the previous one";

    let mut group = c.benchmark_group("resolve");
    for &tags in &[1usize, 50, 500] {
        let input = make_input(tags, base);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("tagged", tags), &input, |b, input| {
            b.iter(|| resolve(input))
        });
    }

    // Angle brackets that never form a tag take the slow path through the scanner.
    let noisy = "if a<b and c>d then <image:missing close ".repeat(200);
    group.throughput(Throughput::Bytes(noisy.len() as u64));
    group.bench_function("malformed", |b| b.iter(|| resolve(&noisy)));

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
