use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use matchbook::{Order, OrderBook, OrderType, Price, Quantity, Side};

fn create_limit_order(side: Side, price: Price, quantity: Quantity) -> Order {
    Order::new(
        Uuid::new_v4(),
        "BTC-USD",
        side,
        OrderType::Limit,
        price,
        quantity,
        "bench-user",
    )
}

fn orderbook_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderbook_operations");

    // Non-crossing adds: pure insertion into a level.
    group.bench_function("add_resting_order", |b| {
        let book = OrderBook::new("BTC-USD");
        b.iter(|| {
            let order = create_limit_order(Side::Buy, 9_900, 1);
            black_box(book.add_order(black_box(order)));
        });
    });

    // Adds that cross a standing ask and produce a trade each time.
    group.bench_function("add_crossing_order", |b| {
        let book = OrderBook::new("BTC-USD");
        b.iter(|| {
            book.add_order(create_limit_order(Side::Sell, 10_000, 1));
            let result = book.add_order(create_limit_order(Side::Buy, 10_000, 1));
            black_box(result.trades.len());
        });
    });

    // Cancel of a freshly rested order.
    group.bench_function("cancel_order", |b| {
        let book = OrderBook::new("BTC-USD");
        b.iter(|| {
            let order = create_limit_order(Side::Buy, 9_900, 1);
            let id = order.id;
            book.add_order(order);
            black_box(book.cancel_order(black_box(id)));
        });
    });

    // Top-of-book reads against a populated book.
    group.bench_function("best_prices", |b| {
        let book = OrderBook::new("BTC-USD");
        for i in 0..100 {
            book.add_order(create_limit_order(Side::Buy, 9_900 - i, 1));
            book.add_order(create_limit_order(Side::Sell, 10_000 + i, 1));
        }
        b.iter(|| {
            black_box(book.best_bid());
            black_box(book.best_ask());
            black_box(book.spread());
        });
    });

    // Depth aggregation across many levels.
    group.bench_function("depth_levels", |b| {
        let book = OrderBook::new("BTC-USD");
        for i in 0..100 {
            book.add_order(create_limit_order(Side::Buy, 9_900 - i, 2));
            book.add_order(create_limit_order(Side::Sell, 10_000 + i, 2));
        }
        b.iter(|| {
            black_box(book.bid_levels(black_box(20)));
            black_box(book.ask_levels(black_box(20)));
        });
    });

    group.finish();
}

criterion_group!(benches, orderbook_benchmark);
criterion_main!(benches);
