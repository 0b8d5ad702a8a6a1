// Expose the modules
pub mod api;
pub mod config;
pub mod engine;
pub mod events;
pub mod orderbook;
pub mod sweeper;
pub mod types;

// Re-export key types for easier usage
pub use engine::{EngineStats, MatchingEngine};
pub use events::{MarketListener, NullListener, TracingListener};
pub use orderbook::{BookEvents, BookLevel, OrderBook, PriceLevel};
pub use sweeper::ExpirySweeper;
pub use types::{
    MatchResult, Order, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol,
    TimeInForce, Trade, TradeRecord, UserId, MAX_ORDER_PRICE, MAX_ORDER_QUANTITY,
};
