use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use matchbook::{MatchingEngine, Order, OrderType, Side};

fn random_order(rng: &mut StdRng, symbol: &str) -> Order {
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    let price = 9_900 + rng.gen_range(0..200);
    let quantity = rng.gen_range(1..10);
    Order::new(
        Uuid::new_v4(),
        symbol,
        side,
        OrderType::Limit,
        price,
        quantity,
        "bench-user",
    )
}

fn engine_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_throughput");

    for symbol_count in [1usize, 4, 16] {
        let symbols: Vec<String> = (0..symbol_count).map(|i| format!("SYM-{}", i)).collect();
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("mixed_order_flow", symbol_count),
            &symbols,
            |b, symbols| {
                let engine = MatchingEngine::new();
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| {
                    let symbol = &symbols[rng.gen_range(0..symbols.len())];
                    let order = random_order(&mut rng, symbol);
                    black_box(engine.add_order(black_box(order)));
                });
            },
        );
    }

    group.bench_function("stats_snapshot", |b| {
        let engine = MatchingEngine::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            engine.add_order(random_order(&mut rng, "BTC-USD"));
        }
        b.iter(|| black_box(engine.get_stats()));
    });

    group.finish();
}

criterion_group!(benches, engine_benchmark);
criterion_main!(benches);
