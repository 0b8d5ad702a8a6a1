//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Per-symbol limit order book: two price-sorted ladders of FIFO price levels, an
// id index over the resting orders, and the matching state machine for market,
// limit, stop and stop-limit orders under strict price-time priority.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | PriceLevel    | FIFO queue of resting order ids at one price, with cached total quantity  |
// | Ladder        | Bid (descending) and ask (ascending) BTreeMaps of price levels            |
// | OrderBook     | Admission, matching, cancel/modify, expiry, depth queries, metrics        |
// | BookEvents    | Callback interface the engine installs to observe book activity           |
//
// Lock discipline: `orders` is always acquired before `ladder`, and `history` is
// only acquired while both are held or on its own. Callbacks fire while the write
// locks are held; handlers must not call back into the book.
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    MatchResult, Order, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol,
    TimeInForce, Trade, TradeRecord, MAX_ORDER_PRICE, MAX_ORDER_QUANTITY,
};

/// Callback interface for observing a single book.
///
/// The matching engine installs an implementation when it creates a book, using
/// it to maintain engine-wide counters and to forward trades and order updates
/// to the registered `MarketListener`. Callbacks fire while the book's write
/// locks are held; implementations must not call back into the book.
pub trait BookEvents: Send + Sync {
    /// An order passed validation and entered the book's state machine.
    fn order_accepted(&self, _order: &Order) {}

    /// An order's fill state or status changed.
    fn order_updated(&self, _order: &Order) {}

    /// A trade was executed, with the users on both sides attached.
    fn trade_executed(&self, _record: &TradeRecord) {}
}

/// Aggregated view of one price level, as returned by the depth queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    /// The price of this level.
    pub price: Price,
    /// Sum of the remaining quantity of every order resting at this price.
    pub total_quantity: Quantity,
    /// Number of orders resting at this price.
    pub order_count: usize,
}

/// FIFO queue of resting orders at a single price.
///
/// The level stores order ids; the orders themselves live in the book's id
/// index. `total_quantity` is kept equal to the sum of the remaining quantity
/// of every queued order at all times.
#[derive(Debug)]
pub struct PriceLevel {
    price: Price,
    queue: VecDeque<OrderId>,
    total_quantity: Quantity,
}

impl PriceLevel {
    fn new(price: Price) -> Self {
        Self {
            price,
            queue: VecDeque::new(),
            total_quantity: 0,
        }
    }

    /// The price of this level.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Cached sum of remaining quantities at this level.
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of orders queued at this level.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no orders rest at this level.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Next order to match, without removing it.
    pub fn front(&self) -> Option<OrderId> {
        self.queue.front().copied()
    }

    /// Appends an order at the back of the queue.
    fn push_back(&mut self, order_id: OrderId, remaining: Quantity) {
        self.queue.push_back(order_id);
        self.total_quantity += remaining;
    }

    /// Removes the front order. The caller accounts for its quantity separately,
    /// since fills have already been subtracted through `reduce`.
    fn pop_front(&mut self) -> Option<OrderId> {
        self.queue.pop_front()
    }

    /// Removes an order from anywhere in the queue (cancel of a resting order).
    fn remove(&mut self, order_id: OrderId, remaining: Quantity) -> bool {
        match self.queue.iter().position(|id| *id == order_id) {
            Some(pos) => {
                self.queue.remove(pos);
                self.total_quantity -= remaining;
                true
            }
            None => false,
        }
    }

    /// Subtracts filled or shrunk quantity from the cached total.
    fn reduce(&mut self, quantity: Quantity) {
        self.total_quantity -= quantity;
    }

    fn summary(&self) -> BookLevel {
        BookLevel {
            price: self.price,
            total_quantity: self.total_quantity,
            order_count: self.queue.len(),
        }
    }
}

/// Both sides of the book. Bids iterate best-first via `.rev()`, asks natively.
#[derive(Debug, Default)]
struct Ladder {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
}

impl Ladder {
    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Highest resting buy price, or 0 when the bid side is empty.
    fn best_bid(&self) -> Price {
        self.bids.keys().next_back().copied().unwrap_or(0)
    }

    /// Lowest resting sell price, or 0 when the ask side is empty.
    fn best_ask(&self) -> Price {
        self.asks.keys().next().copied().unwrap_or(0)
    }
}

/// Order book for a single symbol.
///
/// Thread safe: admission, cancellation and modification serialize on the book's
/// write locks, queries take read locks, counters are atomic. A cancel racing a
/// match is resolved entirely by lock order: either the cancel sees the order
/// still resting and removes it, or matching already filled it and the cancel
/// returns false.
pub struct OrderBook {
    symbol: Symbol,
    /// Resting (and in-flight) orders by id. Lock before `ladder`.
    orders: RwLock<HashMap<OrderId, Order>>,
    /// Price levels on both sides. Lock after `orders`.
    ladder: RwLock<Ladder>,
    /// Trades produced by this book, with user attribution.
    history: RwLock<Vec<TradeRecord>>,
    events: Option<Arc<dyn BookEvents>>,
    total_orders: AtomicU64,
    total_trades: AtomicU64,
    total_volume: AtomicU64,
    cancelled_orders: AtomicU64,
}

impl OrderBook {
    /// Creates an empty book with no event sink. Used directly in tests and
    /// benchmarks; the engine uses [`OrderBook::with_events`].
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            orders: RwLock::new(HashMap::new()),
            ladder: RwLock::new(Ladder::default()),
            history: RwLock::new(Vec::new()),
            events: None,
            total_orders: AtomicU64::new(0),
            total_trades: AtomicU64::new(0),
            total_volume: AtomicU64::new(0),
            cancelled_orders: AtomicU64::new(0),
        }
    }

    /// Creates an empty book that reports activity to `events`. The sink is
    /// installed before the book processes anything, so no event is missed.
    pub fn with_events(symbol: impl Into<Symbol>, events: Arc<dyn BookEvents>) -> Self {
        let mut book = Self::new(symbol);
        book.events = Some(events);
        book
    }

    /// The symbol this book trades.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    //----------------------------------------------------------------------------------------------
    // Admission and matching
    //----------------------------------------------------------------------------------------------

    /// Submits an order to the book.
    ///
    /// Out-of-bounds orders are marked `Rejected` and produce no trades. Valid
    /// orders are registered in the id index, routed by type through the
    /// matching loop, and any unfilled limit remainder rests at its price level
    /// with time priority taken from the submission timestamp.
    ///
    /// FOK orders are all-or-none: the book first walks the opposite side to
    /// check that the full quantity can cross, and commits nothing otherwise.
    /// IOC remainders are cancelled by the engine after this call returns.
    pub fn add_order(&self, order: Order) -> MatchResult {
        let mut orders = self.orders.write();
        let mut ladder = self.ladder.write();
        self.admit(order, &mut orders, &mut ladder)
    }

    /// Runs the admission state machine under the held write locks. Shared by
    /// `add_order` and the re-add half of `modify_order`.
    fn admit(
        &self,
        mut order: Order,
        orders: &mut HashMap<OrderId, Order>,
        ladder: &mut Ladder,
    ) -> MatchResult {
        if !Self::validate(&order) {
            order.status = OrderStatus::Rejected;
            return MatchResult::unmatched(order);
        }

        // Register before matching so the order is observable by id while the
        // state machine runs.
        orders.insert(order.id, order.clone());
        self.total_orders.fetch_add(1, Ordering::Relaxed);
        if let Some(events) = &self.events {
            events.order_accepted(&order);
        }

        let mut trades = Vec::new();
        let mut affected = Vec::new();

        match order.order_type {
            OrderType::Limit => {
                self.run_limit(&mut order, orders, ladder, &mut trades, &mut affected)
            }
            OrderType::Market => {
                self.run_market(&mut order, orders, ladder, &mut trades, &mut affected)
            }
            OrderType::Stop => {
                if Self::stop_triggered(&order, ladder) {
                    order.order_type = OrderType::Market;
                    self.run_market(&mut order, orders, ladder, &mut trades, &mut affected);
                } else {
                    order.status = OrderStatus::Rejected;
                }
            }
            OrderType::StopLimit => {
                if Self::stop_triggered(&order, ladder) {
                    order.order_type = OrderType::Limit;
                    self.run_limit(&mut order, orders, ladder, &mut trades, &mut affected);
                } else {
                    order.status = OrderStatus::Rejected;
                }
            }
        }

        if order.filled_quantity == order.quantity {
            order.status = OrderStatus::Filled;
        } else if order.filled_quantity > 0 && order.status == OrderStatus::New {
            order.status = OrderStatus::Partial;
        }

        if order.is_terminal() {
            orders.remove(&order.id);
        } else {
            orders.insert(order.id, order.clone());
        }
        if let Some(events) = &self.events {
            events.order_updated(&order);
        }

        MatchResult {
            order,
            trades,
            affected_orders: affected,
        }
    }

    fn validate(order: &Order) -> bool {
        if order.quantity == 0 || order.quantity > MAX_ORDER_QUANTITY {
            return false;
        }
        if matches!(order.order_type, OrderType::Limit | OrderType::StopLimit)
            && (order.price == 0 || order.price > MAX_ORDER_PRICE)
        {
            return false;
        }
        true
    }

    /// Trigger condition for stop and stop-limit orders. The reference price is
    /// the best ask for a buy and the best bid for a sell; an empty reference
    /// side never triggers.
    fn stop_triggered(order: &Order, ladder: &Ladder) -> bool {
        let reference = match order.side {
            Side::Buy => ladder.best_ask(),
            Side::Sell => ladder.best_bid(),
        };
        if reference == 0 {
            return false;
        }
        match order.side {
            Side::Buy => reference >= order.stop_price,
            Side::Sell => reference <= order.stop_price,
        }
    }

    fn run_limit(
        &self,
        order: &mut Order,
        orders: &mut HashMap<OrderId, Order>,
        ladder: &mut Ladder,
        trades: &mut Vec<Trade>,
        affected: &mut Vec<Order>,
    ) {
        if order.time_in_force == TimeInForce::FOK && !Self::fok_fillable(order, ladder) {
            order.status = OrderStatus::Cancelled;
            return;
        }
        self.match_incoming(order, orders, ladder, trades, affected);
        if order.remaining() > 0 {
            Self::rest(order, ladder);
        }
    }

    fn run_market(
        &self,
        order: &mut Order,
        orders: &mut HashMap<OrderId, Order>,
        ladder: &mut Ladder,
        trades: &mut Vec<Trade>,
        affected: &mut Vec<Order>,
    ) {
        if order.time_in_force == TimeInForce::FOK && !Self::fok_fillable(order, ladder) {
            order.status = OrderStatus::Cancelled;
            return;
        }
        self.match_incoming(order, orders, ladder, trades, affected);
        if order.remaining() > 0 {
            // Market orders never rest; whatever already filled stands.
            order.status = OrderStatus::Rejected;
        }
    }

    /// Walks the opposite side accumulating crossable quantity and reports
    /// whether the whole order could fill. Nothing is committed here.
    fn fok_fillable(order: &Order, ladder: &Ladder) -> bool {
        let mut crossable: Quantity = 0;
        match order.side {
            Side::Buy => {
                for (price, level) in ladder.asks.iter() {
                    if order.order_type == OrderType::Limit && *price > order.price {
                        break;
                    }
                    crossable += level.total_quantity;
                    if crossable >= order.quantity {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (price, level) in ladder.bids.iter().rev() {
                    if order.order_type == OrderType::Limit && *price < order.price {
                        break;
                    }
                    crossable += level.total_quantity;
                    if crossable >= order.quantity {
                        return true;
                    }
                }
            }
        }
        crossable >= order.quantity
    }

    /// The matching loop. Repeatedly picks the best opposite level, checks the
    /// crossing predicate, and fills against its FIFO queue front to back.
    /// Trades execute at the resting order's price.
    fn match_incoming(
        &self,
        order: &mut Order,
        orders: &mut HashMap<OrderId, Order>,
        ladder: &mut Ladder,
        trades: &mut Vec<Trade>,
        affected: &mut Vec<Order>,
    ) {
        loop {
            if order.remaining() == 0 {
                break;
            }

            let level_price = match order.side {
                Side::Buy => match ladder.asks.keys().next() {
                    Some(&price) => price,
                    None => break,
                },
                Side::Sell => match ladder.bids.keys().next_back() {
                    Some(&price) => price,
                    None => break,
                },
            };

            let crosses = match order.order_type {
                OrderType::Market => true,
                _ => match order.side {
                    Side::Buy => level_price <= order.price,
                    Side::Sell => level_price >= order.price,
                },
            };
            if !crosses {
                break;
            }

            let book_side = ladder.side_mut(order.side.opposite());
            let emptied = {
                let level = match book_side.get_mut(&level_price) {
                    Some(level) => level,
                    None => break,
                };

                while order.remaining() > 0 {
                    let maker_id = match level.front() {
                        Some(id) => id,
                        None => break,
                    };
                    // A level may only reference orders present in the id index;
                    // anything else is a fatal bookkeeping error.
                    let maker = orders
                        .get_mut(&maker_id)
                        .expect("price level references an order missing from the id index");

                    let trade_qty = order.remaining().min(maker.remaining());
                    let trade = Trade {
                        buy_order_id: if order.side == Side::Buy { order.id } else { maker.id },
                        sell_order_id: if order.side == Side::Buy { maker.id } else { order.id },
                        symbol: self.symbol.clone(),
                        price: level_price,
                        quantity: trade_qty,
                        timestamp: Utc::now(),
                    };

                    order.filled_quantity += trade_qty;
                    maker.filled_quantity += trade_qty;
                    level.reduce(trade_qty);

                    self.total_trades.fetch_add(1, Ordering::Relaxed);
                    self.total_volume.fetch_add(trade_qty, Ordering::Relaxed);

                    let record = if order.side == Side::Buy {
                        TradeRecord {
                            trade: trade.clone(),
                            buy_user: order.user_id.clone(),
                            sell_user: maker.user_id.clone(),
                        }
                    } else {
                        TradeRecord {
                            trade: trade.clone(),
                            buy_user: maker.user_id.clone(),
                            sell_user: order.user_id.clone(),
                        }
                    };
                    self.history.write().push(record.clone());
                    if let Some(events) = &self.events {
                        events.trade_executed(&record);
                    }
                    trades.push(trade);

                    let maker_done = maker.remaining() == 0;
                    maker.status = if maker_done {
                        OrderStatus::Filled
                    } else {
                        OrderStatus::Partial
                    };
                    let snapshot = maker.clone();
                    if maker_done {
                        level.pop_front();
                        orders.remove(&maker_id);
                    }
                    affected.push(snapshot.clone());
                    if let Some(events) = &self.events {
                        events.order_updated(&snapshot);
                    }
                }

                level.is_empty()
            };
            if emptied {
                book_side.remove(&level_price);
            }
        }
    }

    /// Rests the unfilled remainder at its price level, FIFO at the back.
    fn rest(order: &Order, ladder: &mut Ladder) {
        let level = ladder
            .side_mut(order.side)
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price));
        level.push_back(order.id, order.remaining());
    }

    /// Removes a resting order from its price level, dropping the level when it
    /// empties.
    fn unrest(order: &Order, ladder: &mut Ladder) {
        let book_side = ladder.side_mut(order.side);
        let emptied = match book_side.get_mut(&order.price) {
            Some(level) => {
                level.remove(order.id, order.remaining());
                level.is_empty()
            }
            None => false,
        };
        if emptied {
            book_side.remove(&order.price);
        }
    }

    //----------------------------------------------------------------------------------------------
    // Cancel / modify / expiry
    //----------------------------------------------------------------------------------------------

    /// Cancels a resting order. Returns false when the id is unknown; terminal
    /// orders are purged on transition, so an indexed order is always live.
    pub fn cancel_order(&self, order_id: OrderId) -> bool {
        let mut orders = self.orders.write();
        let mut ladder = self.ladder.write();

        let mut order = match orders.remove(&order_id) {
            Some(order) => order,
            None => {
                debug!(%order_id, symbol = %self.symbol, "cancel: order not found");
                return false;
            }
        };

        order.status = OrderStatus::Cancelled;
        if order.order_type == OrderType::Limit {
            Self::unrest(&order, &mut ladder);
        }
        self.cancelled_orders.fetch_add(1, Ordering::Relaxed);
        if let Some(events) = &self.events {
            events.order_updated(&order);
        }
        debug!(%order_id, symbol = %self.symbol, "order cancelled");
        true
    }

    /// Modifies a resting order.
    ///
    /// Shrinking the quantity at the same price is applied in place and keeps
    /// the order's position in its level. Any other change is an atomic
    /// cancel-and-re-add under the book's write locks: the order keeps its id
    /// but takes a fresh submission timestamp and loses time priority, and the
    /// replacement runs through full admission (it may trade immediately).
    /// Side, type, symbol, user, expiry and time in force are preserved.
    pub fn modify_order(
        &self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> bool {
        let mut orders = self.orders.write();
        let mut ladder = self.ladder.write();

        let (applied_in_place, snapshot) = {
            let order = match orders.get_mut(&order_id) {
                Some(order) => order,
                None => return false,
            };
            if order.filled_quantity >= order.quantity {
                return false;
            }
            if new_quantity <= order.quantity && new_price == order.price {
                // Shrinking below the filled quantity would corrupt the fill
                // accounting; callers cancel instead.
                if new_quantity <= order.filled_quantity {
                    return false;
                }
                let delta = order.quantity - new_quantity;
                order.quantity = new_quantity;
                if order.order_type == OrderType::Limit {
                    if let Some(level) = ladder.side_mut(order.side).get_mut(&order.price) {
                        level.reduce(delta);
                    }
                }
                (true, order.clone())
            } else {
                (false, order.clone())
            }
        };

        if applied_in_place {
            if let Some(events) = &self.events {
                events.order_updated(&snapshot);
            }
            return true;
        }

        // Reprice or grow: swap out the old order and re-admit under the same
        // locks so no reader ever observes the id absent.
        if snapshot.order_type == OrderType::Limit {
            Self::unrest(&snapshot, &mut ladder);
        }
        orders.remove(&order_id);

        let replacement = Order::new(
            snapshot.id,
            snapshot.symbol.clone(),
            snapshot.side,
            snapshot.order_type,
            new_price,
            new_quantity,
            snapshot.user_id.clone(),
        )
        .with_stop_price(snapshot.stop_price)
        .with_expiry(snapshot.expiry)
        .with_time_in_force(snapshot.time_in_force);

        self.admit(replacement, &mut orders, &mut ladder);
        true
    }

    /// Cancels every resting order whose expiry has elapsed and whose status is
    /// still `New`, through the normal cancel path. Returns the cancelled ids so
    /// the engine can keep its symbol index in step.
    pub fn cancel_expired_orders(&self) -> Vec<OrderId> {
        let now = Utc::now().timestamp();
        let expired: Vec<OrderId> = {
            let orders = self.orders.read();
            orders
                .iter()
                .filter(|(_, order)| {
                    order.expiry > 0 && order.expiry <= now && order.status == OrderStatus::New
                })
                .map(|(id, _)| *id)
                .collect()
        };
        for order_id in &expired {
            self.cancel_order(*order_id);
        }
        if !expired.is_empty() {
            debug!(symbol = %self.symbol, count = expired.len(), "expired orders cancelled");
        }
        expired
    }

    //----------------------------------------------------------------------------------------------
    // Queries
    //----------------------------------------------------------------------------------------------

    /// Snapshot of a live order. Terminal orders are not retrievable.
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.orders.read().get(&order_id).cloned()
    }

    /// Highest resting buy price, or 0 when the bid side is empty.
    pub fn best_bid(&self) -> Price {
        self.ladder.read().best_bid()
    }

    /// Lowest resting sell price, or 0 when the ask side is empty.
    pub fn best_ask(&self) -> Price {
        self.ladder.read().best_ask()
    }

    /// Best ask minus best bid, or 0 when either side is empty.
    pub fn spread(&self) -> Price {
        let ladder = self.ladder.read();
        let (bid, ask) = (ladder.best_bid(), ladder.best_ask());
        if bid == 0 || ask == 0 {
            0
        } else {
            ask - bid
        }
    }

    /// Total bid quantity at or above `price`.
    pub fn bid_depth(&self, price: Price) -> Quantity {
        self.ladder
            .read()
            .bids
            .range(price..)
            .map(|(_, level)| level.total_quantity)
            .sum()
    }

    /// Total ask quantity at or below `price`.
    pub fn ask_depth(&self, price: Price) -> Quantity {
        self.ladder
            .read()
            .asks
            .range(..=price)
            .map(|(_, level)| level.total_quantity)
            .sum()
    }

    /// The best `depth` bid levels, highest price first.
    pub fn bid_levels(&self, depth: usize) -> Vec<BookLevel> {
        self.ladder
            .read()
            .bids
            .values()
            .rev()
            .take(depth)
            .map(PriceLevel::summary)
            .collect()
    }

    /// The best `depth` ask levels, lowest price first.
    pub fn ask_levels(&self, depth: usize) -> Vec<BookLevel> {
        self.ladder
            .read()
            .asks
            .values()
            .take(depth)
            .map(PriceLevel::summary)
            .collect()
    }

    /// True when neither side has resting orders.
    pub fn is_empty(&self) -> bool {
        let ladder = self.ladder.read();
        ladder.bids.is_empty() && ladder.asks.is_empty()
    }

    /// Number of live orders in the book.
    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }

    /// Snapshots of every live order, oldest first.
    pub fn all_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.read().values().cloned().collect();
        orders.sort_by_key(|order| order.timestamp);
        orders
    }

    /// Snapshots of a user's live orders, oldest first.
    pub fn get_user_orders(&self, user_id: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.timestamp);
        orders
    }

    /// Trades in which the user took either side, in production order.
    pub fn get_user_trades(&self, user_id: &str) -> Vec<Trade> {
        self.history
            .read()
            .iter()
            .filter(|record| record.involves(user_id))
            .map(|record| record.trade.clone())
            .collect()
    }

    /// Drops every order, level, trade and counter.
    pub fn clear(&self) {
        let mut orders = self.orders.write();
        let mut ladder = self.ladder.write();
        orders.clear();
        ladder.bids.clear();
        ladder.asks.clear();
        self.history.write().clear();
        self.total_orders.store(0, Ordering::Relaxed);
        self.total_trades.store(0, Ordering::Relaxed);
        self.total_volume.store(0, Ordering::Relaxed);
        self.cancelled_orders.store(0, Ordering::Relaxed);
    }

    //----------------------------------------------------------------------------------------------
    // Counters and metrics
    //----------------------------------------------------------------------------------------------

    /// Orders accepted by this book since creation (or the last clear).
    pub fn total_orders(&self) -> u64 {
        self.total_orders.load(Ordering::Relaxed)
    }

    /// Trades produced by this book.
    pub fn total_trades(&self) -> u64 {
        self.total_trades.load(Ordering::Relaxed)
    }

    /// Total traded quantity.
    pub fn total_volume(&self) -> u64 {
        self.total_volume.load(Ordering::Relaxed)
    }

    /// Mean bid/ask gap across the top `depth` level pairs, 0.0 when either
    /// side is too shallow.
    pub fn average_spread(&self, depth: usize) -> f64 {
        let bids = self.bid_levels(depth);
        let asks = self.ask_levels(depth);
        let pairs = bids.len().min(asks.len());
        if pairs == 0 {
            return 0.0;
        }
        let total: f64 = bids
            .iter()
            .zip(asks.iter())
            .map(|(bid, ask)| ask.price as f64 - bid.price as f64)
            .sum();
        total / pairs as f64
    }

    /// Accepted orders per trade, 0.0 before the first trade.
    pub fn order_to_trade_ratio(&self) -> f64 {
        let trades = self.total_trades.load(Ordering::Relaxed);
        if trades == 0 {
            return 0.0;
        }
        self.total_orders.load(Ordering::Relaxed) as f64 / trades as f64
    }

    /// Fraction of accepted orders that ended cancelled.
    pub fn cancellation_rate(&self) -> f64 {
        let orders = self.total_orders.load(Ordering::Relaxed);
        if orders == 0 {
            return 0.0;
        }
        self.cancelled_orders.load(Ordering::Relaxed) as f64 / orders as f64
    }
}
