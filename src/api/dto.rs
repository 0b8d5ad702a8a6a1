//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                                 |
// |----------------------|---------------------------------------------|
// | CreateOrderRequest   | JSON payload for placing an order           |
// | ModifyOrderRequest   | JSON payload for modifying an order         |
// | OrderAckResponse     | Processed order snapshot plus its trades    |
// | DepthResponse        | Per-symbol depth with best prices           |
// | MetricsResponse      | Per-book quality metrics                    |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::orderbook::BookLevel;
use crate::types::{MatchResult, Order, Price, Quantity, Trade};

/// Strips a wire-level string down to `[A-Za-z0-9_-]`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn default_tif() -> String {
    "GTC".to_string()
}

/// Request to place a new order. Side, type and tif come in as the lowercase /
/// uppercase wire strings the matching enums parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(default)]
    pub price: Price,
    pub quantity: Quantity,
    pub user_id: String,
    #[serde(default)]
    pub stop_price: Price,
    #[serde(default)]
    pub expiry: i64,
    #[serde(default = "default_tif")]
    pub tif: String,
}

impl CreateOrderRequest {
    /// Converts the request into an engine order. The server assigns the id:
    /// a random UUID, unique for the engine's lifetime.
    pub fn into_order(self) -> ApiResult<Order> {
        let symbol = sanitize(&self.symbol);
        if symbol.is_empty() {
            return Err(ApiError::BadRequest("symbol must not be empty".to_string()));
        }
        let side = self.side.parse()?;
        let order_type = self.order_type.parse()?;
        let tif = sanitize(&self.tif).parse()?;

        Ok(Order::new(
            Uuid::new_v4(),
            symbol,
            side,
            order_type,
            self.price,
            self.quantity,
            self.user_id,
        )
        .with_stop_price(self.stop_price)
        .with_expiry(self.expiry)
        .with_time_in_force(tif))
    }
}

/// Request to modify a resting order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    pub price: Price,
    pub quantity: Quantity,
}

/// Response for a processed order: the final snapshot and the trades it caused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAckResponse {
    pub order: Order,
    pub trades: Vec<Trade>,
}

impl From<MatchResult> for OrderAckResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            order: result.order,
            trades: result.trades,
        }
    }
}

/// Per-symbol depth snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthResponse {
    pub symbol: String,
    /// Bid levels, highest price first.
    pub bids: Vec<BookLevel>,
    /// Ask levels, lowest price first.
    pub asks: Vec<BookLevel>,
    pub best_bid: Price,
    pub best_ask: Price,
    pub spread: Price,
    pub timestamp: DateTime<Utc>,
}

/// Per-book quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub symbol: String,
    pub average_spread: f64,
    pub order_to_trade_ratio: f64,
    pub cancellation_rate: f64,
}
