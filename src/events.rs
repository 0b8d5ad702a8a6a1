//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Outbound event surface of the engine. Collaborators (websocket broadcasters,
// persistence writers, ...) implement `MarketListener` and register it when the
// engine is constructed; the engine owns the listener and invokes it directly.
// Multiplexing to several observers is the collaborator's job, not the engine's.
//--------------------------------------------------------------------------------------------------

use tracing::{debug, info};

use crate::types::{Order, Trade};

/// Capability trait for observing engine activity.
///
/// Callbacks fire while the originating book's locks are held, so implementations
/// must be fast and must not call back into the engine: re-entering would acquire
/// the engine or book locks recursively.
pub trait MarketListener: Send + Sync {
    /// A trade was executed. Invoked once per trade, in production order.
    fn on_trade(&self, _trade: &Trade) {}

    /// An order's fill state or status changed. Invoked in state-transition order.
    fn on_order_update(&self, _order: &Order) {}
}

/// Listener that ignores every event. Used when no collaborator is registered.
pub struct NullListener;

impl MarketListener for NullListener {}

/// Listener that logs engine activity through `tracing`.
pub struct TracingListener;

impl MarketListener for TracingListener {
    fn on_trade(&self, trade: &Trade) {
        info!(
            symbol = %trade.symbol,
            price = trade.price,
            quantity = trade.quantity,
            buy_order = %trade.buy_order_id,
            sell_order = %trade.sell_order_id,
            "trade executed"
        );
    }

    fn on_order_update(&self, order: &Order) {
        debug!(
            order_id = %order.id,
            symbol = %order.symbol,
            status = ?order.status,
            filled = order.filled_quantity,
            "order updated"
        );
    }
}
