//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Multi-symbol matching engine. Routes every operation to the right book (books
// are created lazily on first reference), keeps a global id -> symbol index over
// the resting orders, aggregates engine-wide statistics, and records the trade
// history consulted by per-user queries.
//
// | Component       | Description                                                  |
// |-----------------|--------------------------------------------------------------|
// | MatchingEngine  | Public API: add/cancel/modify, queries, stats, clear, expiry |
// | EngineStats     | {total_orders, total_trades, total_volume} snapshot          |
// | EngineHooks     | BookEvents sink bridging book activity to engine state       |
//
// Locking: one engine RwLock guards the book map and the id index; adds, cancels,
// clears and expiry sweeps take it in write mode, queries and modify in read mode
// (modify only touches per-book state, which the book's own locks protect).
// Counters are atomic and the trade history has its own lock so the book
// callbacks can append to it while the engine write lock is held.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{MarketListener, NullListener};
use crate::orderbook::{BookEvents, BookLevel, OrderBook};
use crate::types::{
    MatchResult, Order, OrderId, OrderStatus, Price, Quantity, Symbol, TimeInForce, Trade,
    TradeRecord,
};

/// Aggregate counters for the whole engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Orders that passed validation, across all books.
    pub total_orders: u64,
    /// Trades executed, across all books.
    pub total_trades: u64,
    /// Total traded quantity.
    pub total_volume: u64,
}

#[derive(Default)]
struct EngineCounters {
    total_orders: AtomicU64,
    total_trades: AtomicU64,
    total_volume: AtomicU64,
}

impl EngineCounters {
    fn snapshot(&self) -> EngineStats {
        EngineStats {
            total_orders: self.total_orders.load(Ordering::Relaxed),
            total_trades: self.total_trades.load(Ordering::Relaxed),
            total_volume: self.total_volume.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.total_orders.store(0, Ordering::Relaxed);
        self.total_trades.store(0, Ordering::Relaxed);
        self.total_volume.store(0, Ordering::Relaxed);
    }
}

/// Book-side event sink installed on every book the engine creates. Bumps the
/// engine counters, appends executed trades to the engine history, and forwards
/// both event kinds to the registered listener.
struct EngineHooks {
    counters: Arc<EngineCounters>,
    history: Arc<RwLock<Vec<TradeRecord>>>,
    listener: Arc<dyn MarketListener>,
}

impl BookEvents for EngineHooks {
    fn order_accepted(&self, _order: &Order) {
        self.counters.total_orders.fetch_add(1, Ordering::Relaxed);
    }

    fn order_updated(&self, order: &Order) {
        self.listener.on_order_update(order);
    }

    fn trade_executed(&self, record: &TradeRecord) {
        self.counters.total_trades.fetch_add(1, Ordering::Relaxed);
        self.counters
            .total_volume
            .fetch_add(record.trade.quantity, Ordering::Relaxed);
        self.history.write().push(record.clone());
        self.listener.on_trade(&record.trade);
    }
}

struct EngineInner {
    books: HashMap<Symbol, Arc<OrderBook>>,
    id_to_symbol: HashMap<OrderId, Symbol>,
}

/// Multi-symbol matching engine.
///
/// Books are independent: there is no cross-symbol operation and no ordering
/// guarantee between books. Within one book, trades are produced in a total
/// order consistent with the order in which submissions entered the book's
/// write section and the FIFO order at each level.
pub struct MatchingEngine {
    inner: RwLock<EngineInner>,
    counters: Arc<EngineCounters>,
    history: Arc<RwLock<Vec<TradeRecord>>>,
    hooks: Arc<EngineHooks>,
}

impl MatchingEngine {
    /// Creates an engine with no external listener.
    pub fn new() -> Self {
        Self::with_listener(Arc::new(NullListener))
    }

    /// Creates an engine that reports trades and order updates to `listener`.
    ///
    /// The listener is registered at construction and invoked while book locks
    /// are held; it must not call back into the engine.
    pub fn with_listener(listener: Arc<dyn MarketListener>) -> Self {
        let counters = Arc::new(EngineCounters::default());
        let history = Arc::new(RwLock::new(Vec::new()));
        let hooks = Arc::new(EngineHooks {
            counters: counters.clone(),
            history: history.clone(),
            listener,
        });
        Self {
            inner: RwLock::new(EngineInner {
                books: HashMap::new(),
                id_to_symbol: HashMap::new(),
            }),
            counters,
            history,
            hooks,
        }
    }

    /// Submits an order to its symbol's book, creating the book on first use.
    ///
    /// Returns the trades produced and a snapshot of the order with its final
    /// status. IOC remainders are cancelled here, after the book add completes;
    /// FOK atomicity is enforced inside the book's matching loop.
    pub fn add_order(&self, order: Order) -> MatchResult {
        let mut inner = self.inner.write();

        let book = match inner.books.get(&order.symbol) {
            Some(book) => book.clone(),
            None => {
                info!(symbol = %order.symbol, "creating order book");
                let book = Arc::new(OrderBook::with_events(
                    order.symbol.clone(),
                    self.hooks.clone() as Arc<dyn BookEvents>,
                ));
                inner.books.insert(order.symbol.clone(), book.clone());
                book
            }
        };

        let order_id = order.id;
        let tif = order.time_in_force;
        let mut result = book.add_order(order);

        if tif == TimeInForce::IOC && !result.order.is_terminal() && result.order.remaining() > 0 {
            book.cancel_order(order_id);
            result.order.status = OrderStatus::Cancelled;
        }

        // Keep the id index in step: drop ids of counter-orders that just went
        // terminal, and map the incoming id only while it rests.
        for affected in &result.affected_orders {
            if affected.is_terminal() {
                inner.id_to_symbol.remove(&affected.id);
            }
        }
        if result.order.is_terminal() {
            inner.id_to_symbol.remove(&order_id);
        } else {
            inner
                .id_to_symbol
                .insert(order_id, result.order.symbol.clone());
        }

        result
    }

    /// Cancels a resting order anywhere in the engine. Returns false for ids
    /// that are unknown or already terminal.
    pub fn cancel_order(&self, order_id: OrderId) -> bool {
        let mut inner = self.inner.write();
        let symbol = match inner.id_to_symbol.get(&order_id) {
            Some(symbol) => symbol.clone(),
            None => return false,
        };
        let book = match inner.books.get(&symbol) {
            Some(book) => book.clone(),
            None => return false,
        };
        let cancelled = book.cancel_order(order_id);
        if cancelled {
            inner.id_to_symbol.remove(&order_id);
        }
        cancelled
    }

    /// Modifies a resting order; see [`OrderBook::modify_order`] for the
    /// in-place versus cancel-and-re-add semantics. Takes the engine lock in
    /// read mode since only per-book state changes.
    pub fn modify_order(&self, order_id: OrderId, new_price: Price, new_quantity: Quantity) -> bool {
        let book = {
            let inner = self.inner.read();
            let symbol = match inner.id_to_symbol.get(&order_id) {
                Some(symbol) => symbol.clone(),
                None => return false,
            };
            match inner.books.get(&symbol) {
                Some(book) => book.clone(),
                None => return false,
            }
        };
        book.modify_order(order_id, new_price, new_quantity)
    }

    /// Snapshot of a live order, or `None` for unknown and terminal ids.
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        let inner = self.inner.read();
        let symbol = inner.id_to_symbol.get(&order_id)?;
        inner.books.get(symbol)?.get_order(order_id)
    }

    /// Best bid for a symbol, 0 when the symbol or side is empty.
    pub fn best_bid(&self, symbol: &str) -> Price {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or(0, |book| book.best_bid())
    }

    /// Best ask for a symbol, 0 when the symbol or side is empty.
    pub fn best_ask(&self, symbol: &str) -> Price {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or(0, |book| book.best_ask())
    }

    /// Spread for a symbol, 0 when either side is empty.
    pub fn spread(&self, symbol: &str) -> Price {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or(0, |book| book.spread())
    }

    /// The best `depth` bid levels for a symbol, highest price first.
    pub fn bid_levels(&self, symbol: &str, depth: usize) -> Vec<BookLevel> {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or_else(Vec::new, |book| book.bid_levels(depth))
    }

    /// The best `depth` ask levels for a symbol, lowest price first.
    pub fn ask_levels(&self, symbol: &str, depth: usize) -> Vec<BookLevel> {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or_else(Vec::new, |book| book.ask_levels(depth))
    }

    /// Total bid quantity at or above `price` for a symbol.
    pub fn bid_depth(&self, symbol: &str, price: Price) -> Quantity {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or(0, |book| book.bid_depth(price))
    }

    /// Total ask quantity at or below `price` for a symbol.
    pub fn ask_depth(&self, symbol: &str, price: Price) -> Quantity {
        self.inner
            .read()
            .books
            .get(symbol)
            .map_or(0, |book| book.ask_depth(price))
    }

    /// Symbols with a book, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.inner.read().books.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Number of live orders across all books.
    pub fn order_count(&self) -> usize {
        self.inner
            .read()
            .books
            .values()
            .map(|book| book.order_count())
            .sum()
    }

    /// True when no book holds a resting order.
    pub fn is_empty(&self) -> bool {
        self.inner.read().books.values().all(|book| book.is_empty())
    }

    /// Snapshots of every live order in the engine, oldest first. Linear in the
    /// number of resting orders; not a hot path.
    pub fn get_all_orders(&self) -> Vec<Order> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner
            .books
            .values()
            .flat_map(|book| book.all_orders())
            .collect();
        orders.sort_by_key(|order| order.timestamp);
        orders
    }

    /// Snapshots of a user's live orders across all books, oldest first.
    pub fn get_user_orders(&self, user_id: &str) -> Vec<Order> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner
            .books
            .values()
            .flat_map(|book| book.get_user_orders(user_id))
            .collect();
        orders.sort_by_key(|order| order.timestamp);
        orders
    }

    /// Every trade the user took part in, in the order the engine recorded them.
    pub fn get_user_trades(&self, user_id: &str) -> Vec<Trade> {
        self.history
            .read()
            .iter()
            .filter(|record| record.involves(user_id))
            .map(|record| record.trade.clone())
            .collect()
    }

    /// The most recent `limit` trades, oldest of the window first.
    pub fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        let history = self.history.read();
        let skip = history.len().saturating_sub(limit);
        history
            .iter()
            .skip(skip)
            .map(|record| record.trade.clone())
            .collect()
    }

    /// Appends an externally sourced trade to the history (used when a
    /// collaborator replays persisted trades after a restart) and bumps the
    /// trade counters so they stay equal to the history totals.
    pub fn add_trade_history(&self, record: TradeRecord) {
        self.counters.total_trades.fetch_add(1, Ordering::Relaxed);
        self.counters
            .total_volume
            .fetch_add(record.trade.quantity, Ordering::Relaxed);
        self.history.write().push(record);
    }

    /// Engine-wide counters.
    pub fn get_stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    /// Drops every book, index entry, trade and counter.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.books.clear();
        inner.id_to_symbol.clear();
        self.history.write().clear();
        self.counters.reset();
        info!("engine cleared");
    }

    /// Sweeps every book for expired resting orders and cancels them through
    /// the normal cancel path. Invoked periodically by the expiry sweeper.
    pub fn cancel_expired_orders(&self) {
        let mut inner = self.inner.write();
        let books: Vec<Arc<OrderBook>> = inner.books.values().cloned().collect();
        let mut swept = 0usize;
        for book in books {
            for order_id in book.cancel_expired_orders() {
                inner.id_to_symbol.remove(&order_id);
                swept += 1;
            }
        }
        if swept > 0 {
            debug!(count = swept, "expiry sweep cancelled orders");
        }
    }

    /// Per-book metrics for a symbol: (average spread over the top `depth`
    /// levels, order-to-trade ratio, cancellation rate).
    pub fn book_metrics(&self, symbol: &str, depth: usize) -> Option<(f64, f64, f64)> {
        let book = self.inner.read().books.get(symbol)?.clone();
        Some((
            book.average_spread(depth),
            book.order_to_trade_ratio(),
            book.cancellation_rate(),
        ))
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, OrderType, Side};
    use chrono::Utc;
    use parking_lot::Mutex;
    use uuid::Uuid;

    fn limit(symbol: &str, side: Side, price: Price, quantity: Quantity, user: &str) -> Order {
        Order::new(
            Uuid::new_v4(),
            symbol,
            side,
            OrderType::Limit,
            price,
            quantity,
            user,
        )
    }

    #[test]
    fn test_books_created_lazily_and_kept_independent() {
        let engine = MatchingEngine::new();
        engine.add_order(limit("BTC-USD", Side::Buy, 10_000, 1, "alice"));
        engine.add_order(limit("ETH-USD", Side::Sell, 2_000, 1, "bob"));

        assert_eq!(engine.symbols(), vec!["BTC-USD", "ETH-USD"]);
        assert_eq!(engine.best_bid("BTC-USD"), 10_000);
        assert_eq!(engine.best_ask("ETH-USD"), 2_000);
        // A matching pair on different symbols never crosses.
        assert_eq!(engine.get_stats().total_trades, 0);
    }

    #[test]
    fn test_add_match_and_stats() {
        let engine = MatchingEngine::new();
        engine.add_order(limit("BTC-USD", Side::Sell, 10_000, 2, "bob"));
        let result = engine.add_order(limit("BTC-USD", Side::Buy, 10_000, 1, "alice"));

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.order.status, OrderStatus::Filled);

        let stats = engine.get_stats();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.total_volume, 1);
    }

    #[test]
    fn test_cancel_via_engine() {
        let engine = MatchingEngine::new();
        let order = limit("BTC-USD", Side::Buy, 9_900, 5, "alice");
        let id = order.id;
        engine.add_order(order);

        assert!(engine.get_order(id).is_some());
        assert!(engine.cancel_order(id));
        assert!(engine.get_order(id).is_none());
        assert!(!engine.cancel_order(id));
        assert!(!engine.cancel_order(Uuid::new_v4()));
    }

    #[test]
    fn test_terminal_orders_drop_out_of_the_index() {
        let engine = MatchingEngine::new();
        let sell = limit("BTC-USD", Side::Sell, 10_000, 1, "bob");
        let sell_id = sell.id;
        engine.add_order(sell);

        let buy = limit("BTC-USD", Side::Buy, 10_000, 1, "alice");
        let buy_id = buy.id;
        engine.add_order(buy);

        // Both sides filled: neither id resolves any more.
        assert!(engine.get_order(sell_id).is_none());
        assert!(engine.get_order(buy_id).is_none());
        assert!(!engine.cancel_order(sell_id));
        assert_eq!(engine.order_count(), 0);
    }

    #[test]
    fn test_ioc_remainder_cancelled_at_engine_level() {
        let engine = MatchingEngine::new();
        engine.add_order(limit("BTC-USD", Side::Sell, 10_000, 1, "bob"));

        let ioc = limit("BTC-USD", Side::Buy, 10_000, 3, "alice")
            .with_time_in_force(TimeInForce::IOC);
        let ioc_id = ioc.id;
        let result = engine.add_order(ioc);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.order.status, OrderStatus::Cancelled);
        assert!(engine.get_order(ioc_id).is_none());
        assert_eq!(engine.best_bid("BTC-USD"), 0);
        // The one fill stands.
        assert_eq!(engine.get_stats().total_volume, 1);
    }

    #[test]
    fn test_ioc_unfilled_is_cancelled_not_rested() {
        let engine = MatchingEngine::new();
        let ioc = limit("BTC-USD", Side::Buy, 10_000, 3, "alice")
            .with_time_in_force(TimeInForce::IOC);
        let result = engine.add_order(ioc);
        assert!(result.trades.is_empty());
        assert_eq!(result.order.status, OrderStatus::Cancelled);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_modify_through_the_engine() {
        let engine = MatchingEngine::new();
        let order = limit("BTC-USD", Side::Buy, 9_900, 5, "alice");
        let id = order.id;
        engine.add_order(order);

        assert!(engine.modify_order(id, 9_900, 3));
        assert_eq!(engine.get_order(id).map(|o| o.quantity), Some(3));
        assert!(!engine.modify_order(Uuid::new_v4(), 9_900, 3));
    }

    #[test]
    fn test_user_queries_across_books() {
        let engine = MatchingEngine::new();
        engine.add_order(limit("BTC-USD", Side::Sell, 10_000, 1, "bob"));
        engine.add_order(limit("BTC-USD", Side::Buy, 10_000, 1, "alice"));
        engine.add_order(limit("ETH-USD", Side::Buy, 2_000, 4, "alice"));

        let alice_orders = engine.get_user_orders("alice");
        assert_eq!(alice_orders.len(), 1);
        assert_eq!(alice_orders[0].symbol, "ETH-USD");

        let alice_trades = engine.get_user_trades("alice");
        assert_eq!(alice_trades.len(), 1);
        assert_eq!(alice_trades[0].symbol, "BTC-USD");
        assert_eq!(engine.get_user_trades("bob").len(), 1);
        assert!(engine.get_user_trades("carol").is_empty());
    }

    #[test]
    fn test_trade_history_replay_ingestion() {
        let engine = MatchingEngine::new();
        let record = TradeRecord {
            trade: Trade {
                buy_order_id: Uuid::new_v4(),
                sell_order_id: Uuid::new_v4(),
                symbol: "BTC-USD".to_string(),
                price: 10_000,
                quantity: 4,
                timestamp: Utc::now(),
            },
            buy_user: "alice".to_string(),
            sell_user: "bob".to_string(),
        };
        engine.add_trade_history(record);

        let stats = engine.get_stats();
        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.total_volume, 4);
        assert_eq!(engine.get_user_trades("alice").len(), 1);
        assert_eq!(engine.recent_trades(10).len(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let engine = MatchingEngine::new();
        engine.add_order(limit("BTC-USD", Side::Sell, 10_000, 1, "bob"));
        engine.add_order(limit("BTC-USD", Side::Buy, 10_000, 1, "alice"));
        engine.clear();

        assert!(engine.symbols().is_empty());
        assert_eq!(engine.get_stats(), EngineStats::default());
        assert!(engine.get_user_trades("alice").is_empty());
    }

    #[test]
    fn test_expiry_sweep_purges_the_index() {
        let engine = MatchingEngine::new();
        let now = Utc::now().timestamp();
        let expired = limit("BTC-USD", Side::Buy, 9_900, 5, "alice").with_expiry(now - 10);
        let id = expired.id;
        engine.add_order(expired);

        engine.cancel_expired_orders();
        assert!(engine.get_order(id).is_none());
        assert_eq!(engine.best_bid("BTC-USD"), 0);
        // The id is no longer cancellable either: it left the index.
        assert!(!engine.cancel_order(id));
    }

    struct Recording {
        trades: Mutex<Vec<Trade>>,
        updates: Mutex<Vec<(OrderId, OrderStatus)>>,
    }

    impl MarketListener for Recording {
        fn on_trade(&self, trade: &Trade) {
            self.trades.lock().push(trade.clone());
        }

        fn on_order_update(&self, order: &Order) {
            self.updates.lock().push((order.id, order.status));
        }
    }

    #[test]
    fn test_listener_receives_engine_activity() {
        let recording = Arc::new(Recording {
            trades: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        });
        let engine = MatchingEngine::with_listener(recording.clone());

        engine.add_order(limit("BTC-USD", Side::Sell, 10_000, 2, "bob"));
        let buy = limit("BTC-USD", Side::Buy, 10_000, 1, "alice");
        let buy_id = buy.id;
        engine.add_order(buy);

        let trades = recording.trades.lock();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 10_000);

        let updates = recording.updates.lock();
        assert!(updates.contains(&(buy_id, OrderStatus::Filled)));
    }
}
