use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::{Duration, Instant};

use sherpa::core::message::MessageId;
use sherpa::core::typewriter::Typewriter;

fn make_deltas(words: usize, chunk_words: usize) -> Vec<String> {
    let mut deltas = Vec::new();
    let mut chunk = String::new();
    for i in 0..words {
        chunk.push_str(&format!("word{i} "));
        if (i + 1) % chunk_words == 0 {
            deltas.push(std::mem::take(&mut chunk));
        }
    }
    if !chunk.is_empty() {
        deltas.push(chunk);
    }
    deltas
}

fn stream_and_drain(deltas: &[String], interval: Duration) {
    let start = Instant::now();
    let mut tw = Typewriter::animating(MessageId::bench(), interval);
    let mut now = start;
    for delta in deltas {
        tw.append_delta(delta, now);
        tw.advance(now);
        now += Duration::from_millis(3);
    }
    tw.mark_stream_done(now);
    // Drain in coarse steps, the way the event loop ticks.
    while !tw.is_drained() {
        now += Duration::from_millis(50);
        tw.advance(now);
    }
}

fn bench_typewriter(c: &mut Criterion) {
    let interval = Duration::from_millis(85);

    for &words in &[200usize, 2000usize] {
        let mut group = c.benchmark_group(format!("typewriter_words{}", words));
        group.throughput(Throughput::Elements(words as u64));

        // Small chunks approximate token-by-token delivery; large chunks a
        // provider that batches aggressively.
        for &chunk_words in &[2usize, 32usize] {
            let deltas = make_deltas(words, chunk_words);
            group.bench_function(BenchmarkId::new("stream_and_drain", chunk_words), |b| {
                b.iter(|| stream_and_drain(&deltas, interval))
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_typewriter);
criterion_main!(benches);
