//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Core data types shared by the order book and the matching engine: orders, trades,
// and the enums describing order intent and lifecycle.
//
// | Section          | Description                                                    |
// |------------------|----------------------------------------------------------------|
// | ALIASES / BOUNDS | Integer price/quantity units and their hard limits.            |
// | ENUMS            | Side, OrderType, OrderStatus, TimeInForce.                     |
// | STRUCTS          | Order (mutable fill state), Trade, TradeRecord, MatchResult.   |
// | ERRORS           | TypeError for parsing wire-level strings into enums.           |
// | TESTS            | Unit tests for the defined types.                              |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an order. Assigned by the collaborator that submits the
/// order (the HTTP layer uses `Uuid::new_v4`); the engine treats it as opaque but
/// requires it to be unique for the engine's lifetime.
pub type OrderId = Uuid;

/// Identifier for the account that owns an order.
pub type UserId = String;

/// Trading pair identifier, e.g. `BTC-USD`.
pub type Symbol = String;

/// Price in fixed integer units. The core never touches floating point.
pub type Price = u64;

/// Quantity in fixed integer units.
pub type Quantity = u64;

/// Upper bound for an order's limit price. Orders above it are rejected outright.
pub const MAX_ORDER_PRICE: Price = 1_000_000;

/// Upper bound for an order's quantity. Orders above it are rejected outright.
pub const MAX_ORDER_QUANTITY: Quantity = 1_000_000;

/// Which side of the book an order sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A buy order (a bid).
    Buy,
    /// A sell order (an ask).
    Sell,
}

impl Side {
    /// The side this order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// How an order executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Execute immediately at the best available price; never rests.
    Market,
    /// Execute at the limit price or better; the remainder rests.
    Limit,
    /// Becomes a market order once the reference price crosses the stop price.
    Stop,
    /// Becomes a limit order once the reference price crosses the stop price.
    StopLimit,
}

/// Lifecycle status of an order.
///
/// `New` may become `Partial`, `Filled`, `Cancelled` or `Rejected`; `Partial` may
/// become `Filled` or `Cancelled`. The last three are terminal: terminal orders are
/// removed from every index and are no longer retrievable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted and resting, nothing filled yet.
    New,
    /// Some quantity filled, the rest still live.
    Partial,
    /// Completely filled.
    Filled,
    /// Cancelled by the owner, a time-in-force rule, or the expiry sweeper.
    Cancelled,
    /// Refused: invalid parameters, an unfillable market remainder, or a missed
    /// stop trigger.
    Rejected,
}

impl OrderStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// How long an order stays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good Till Cancelled: rests until filled, cancelled, or expired.
    GTC,
    /// Immediate Or Cancel: fills what it can, the remainder is cancelled.
    IOC,
    /// Fill Or Kill: fills entirely in one pass or not at all.
    FOK,
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::GTC
    }
}

/// Errors raised when wire-level strings cannot be mapped onto the enums above.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid side: {0}")]
    InvalidSide(String),
    #[error("invalid order type: {0}")]
    InvalidOrderType(String),
    #[error("invalid time in force: {0}")]
    InvalidTimeInForce(String),
}

impl FromStr for Side {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(TypeError::InvalidSide(other.to_string())),
        }
    }
}

impl FromStr for OrderType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "stop" => Ok(OrderType::Stop),
            "stop_limit" => Ok(OrderType::StopLimit),
            other => Err(TypeError::InvalidOrderType(other.to_string())),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GTC" => Ok(TimeInForce::GTC),
            "IOC" => Ok(TimeInForce::IOC),
            "FOK" => Ok(TimeInForce::FOK),
            other => Err(TypeError::InvalidTimeInForce(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A trading order.
///
/// Identity fields (`id`, `symbol`, `side`, `user_id`, `stop_price`, `expiry`,
/// `time_in_force`) never change after submission. `order_type` transitions only
/// on stop triggers (Stop -> Market, StopLimit -> Limit); `price` and `quantity`
/// change only through a modify; `filled_quantity` grows monotonically and never
/// exceeds `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Trading pair this order belongs to.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: Side,
    /// Market, limit, stop, or stop-limit.
    pub order_type: OrderType,
    /// Limit price. Ignored for market orders.
    pub price: Price,
    /// Trigger price for stop and stop-limit orders.
    pub stop_price: Price,
    /// Original size.
    pub quantity: Quantity,
    /// Cumulative filled size.
    pub filled_quantity: Quantity,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Owner of the order.
    pub user_id: UserId,
    /// Submission time; the time-priority key within a price level.
    pub timestamp: DateTime<Utc>,
    /// Absolute expiry in Unix seconds. Zero means the order never expires.
    pub expiry: i64,
    /// Time-in-force policy.
    pub time_in_force: TimeInForce,
}

impl Order {
    /// Creates a new order with status `New`, nothing filled, no stop price, no
    /// expiry and GTC time in force. The submission timestamp is taken now.
    pub fn new(
        id: OrderId,
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        user_id: impl Into<UserId>,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            order_type,
            price,
            stop_price: 0,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::New,
            user_id: user_id.into(),
            timestamp: Utc::now(),
            expiry: 0,
            time_in_force: TimeInForce::GTC,
        }
    }

    /// Sets the trigger price for stop and stop-limit orders.
    pub fn with_stop_price(mut self, stop_price: Price) -> Self {
        self.stop_price = stop_price;
        self
    }

    /// Sets an absolute expiry in Unix seconds.
    pub fn with_expiry(mut self, expiry: i64) -> Self {
        self.expiry = expiry;
        self
    }

    /// Sets the time-in-force policy.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Quantity still open.
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled_quantity
    }

    /// Whether the order has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A completed trade between two orders. Emitted exactly once per matching event
/// and priced at the resting order's level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the buy-side order.
    pub buy_order_id: OrderId,
    /// Id of the sell-side order.
    pub sell_order_id: OrderId,
    /// Trading pair.
    pub symbol: Symbol,
    /// Execution price (the resting order's price).
    pub price: Price,
    /// Executed quantity.
    pub quantity: Quantity,
    /// When the trade was produced.
    pub timestamp: DateTime<Utc>,
}

/// A trade together with the users on each side.
///
/// The participating orders are purged from the book once they fill, so the
/// history keeps the owner tags alongside the trade to answer per-user queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade: Trade,
    pub buy_user: UserId,
    pub sell_user: UserId,
}

impl TradeRecord {
    /// Whether the given user was on either side of the trade.
    pub fn involves(&self, user_id: &str) -> bool {
        self.buy_user == user_id || self.sell_user == user_id
    }
}

/// Outcome of submitting an order: the trades it produced (in production order)
/// and a snapshot of the order after processing, with `status` reflecting the
/// final outcome.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The submitted order after processing.
    pub order: Order,
    /// Trades produced by this submission, best price first, FIFO within a price.
    pub trades: Vec<Trade>,
    /// Resting counter-orders whose fill state changed, in the order they were touched.
    pub affected_orders: Vec<Order>,
}

impl MatchResult {
    /// A result with no trades, for orders that never reached the matching loop.
    pub fn unmatched(order: Order) -> Self {
        Self {
            order,
            trades: Vec::new(),
            affected_orders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parsing() {
        assert_eq!("buy".parse::<Side>(), Ok(Side::Buy));
        assert_eq!("sell".parse::<Side>(), Ok(Side::Sell));
        assert_eq!(
            "hold".parse::<Side>(),
            Err(TypeError::InvalidSide("hold".to_string()))
        );
    }

    #[test]
    fn test_order_type_parsing() {
        assert_eq!("market".parse::<OrderType>(), Ok(OrderType::Market));
        assert_eq!("limit".parse::<OrderType>(), Ok(OrderType::Limit));
        assert_eq!("stop".parse::<OrderType>(), Ok(OrderType::Stop));
        assert_eq!("stop_limit".parse::<OrderType>(), Ok(OrderType::StopLimit));
        assert!("trailing".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_time_in_force_parsing() {
        assert_eq!("GTC".parse::<TimeInForce>(), Ok(TimeInForce::GTC));
        assert_eq!("IOC".parse::<TimeInForce>(), Ok(TimeInForce::IOC));
        assert_eq!("FOK".parse::<TimeInForce>(), Ok(TimeInForce::FOK));
        assert!("gtc".parse::<TimeInForce>().is_err());
        assert_eq!(TimeInForce::default(), TimeInForce::GTC);
    }

    #[test]
    fn test_order_remaining_and_terminal() {
        let mut order = Order::new(
            Uuid::new_v4(),
            "BTC-USD",
            Side::Buy,
            OrderType::Limit,
            10_000,
            5,
            "alice",
        );
        assert_eq!(order.remaining(), 5);
        assert!(!order.is_terminal());

        order.filled_quantity = 2;
        order.status = OrderStatus::Partial;
        assert_eq!(order.remaining(), 3);
        assert!(!order.is_terminal());

        order.filled_quantity = 5;
        order.status = OrderStatus::Filled;
        assert_eq!(order.remaining(), 0);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_order_builders() {
        let order = Order::new(
            Uuid::new_v4(),
            "ETH-USD",
            Side::Sell,
            OrderType::StopLimit,
            9_900,
            10,
            "bob",
        )
        .with_stop_price(9_950)
        .with_expiry(1_700_000_000)
        .with_time_in_force(TimeInForce::IOC);

        assert_eq!(order.stop_price, 9_950);
        assert_eq!(order.expiry, 1_700_000_000);
        assert_eq!(order.time_in_force, TimeInForce::IOC);
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.filled_quantity, 0);
    }

    #[test]
    fn test_trade_record_involves() {
        let trade = Trade {
            buy_order_id: Uuid::new_v4(),
            sell_order_id: Uuid::new_v4(),
            symbol: "BTC-USD".to_string(),
            price: 10_000,
            quantity: 1,
            timestamp: Utc::now(),
        };
        let record = TradeRecord {
            trade,
            buy_user: "alice".to_string(),
            sell_user: "bob".to_string(),
        };
        assert!(record.involves("alice"));
        assert!(record.involves("bob"));
        assert!(!record.involves("carol"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        assert_eq!(
            serde_json::to_string(&OrderType::StopLimit).unwrap(),
            "\"stop_limit\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(serde_json::to_string(&TimeInForce::FOK).unwrap(), "\"FOK\"");
    }
}
