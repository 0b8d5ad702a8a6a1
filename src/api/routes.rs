//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                              | Return Type         |
// |-----------------|------------------------------------------|---------------------|
// | health          | Liveness probe                           | Response            |
// | create_order    | Place and process a new order            | ApiResult<Response> |
// | get_order       | Look up a live order                     | ApiResult<Response> |
// | cancel_order    | Cancel a resting order                   | ApiResult<Response> |
// | modify_order    | Modify a resting order                   | ApiResult<Response> |
// | get_depth       | Per-symbol depth snapshot                | ApiResult<Response> |
// | get_metrics     | Per-book quality metrics                 | ApiResult<Response> |
// | user_orders     | A user's live orders                     | Response            |
// | user_trades     | A user's trade history                   | Response            |
// | get_stats       | Engine-wide counters                     | Response            |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{
    sanitize, CreateOrderRequest, DepthResponse, MetricsResponse, ModifyOrderRequest,
    OrderAckResponse,
};
use super::{ApiError, ApiResult, AppState};

const DEFAULT_DEPTH: usize = 10;

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Places a new order. The engine processes it synchronously; the response
/// carries the final order snapshot (its status reflects the outcome) and the
/// trades it produced.
pub async fn create_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<Response> {
    let order = request.into_order()?;
    let result = state.engine.add_order(order);
    let response = OrderAckResponse::from(result);
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Looks up a live order by id. Terminal orders are gone and return 404.
pub async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Response> {
    match state.engine.get_order(order_id) {
        Some(order) => Ok((StatusCode::OK, Json(order)).into_response()),
        None => Err(ApiError::NotFound(format!("order {} not found", order_id))),
    }
}

/// Cancels a resting order.
pub async fn cancel_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Response> {
    if state.engine.cancel_order(order_id) {
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "cancelled": order_id })),
        )
            .into_response())
    } else {
        Err(ApiError::NotFound(format!("order {} not found", order_id)))
    }
}

/// Modifies a resting order's price and quantity.
pub async fn modify_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<ModifyOrderRequest>,
) -> ApiResult<Response> {
    if state
        .engine
        .modify_order(order_id, request.price, request.quantity)
    {
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "modified": order_id })),
        )
            .into_response())
    } else {
        Err(ApiError::NotFound(format!("order {} not found", order_id)))
    }
}

/// Depth snapshot for a symbol: the top `levels` on each side plus best prices.
pub async fn get_depth(
    Extension(state): Extension<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let symbol = sanitize(&symbol);
    let levels = params
        .get("levels")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_DEPTH);

    let response = DepthResponse {
        bids: state.engine.bid_levels(&symbol, levels),
        asks: state.engine.ask_levels(&symbol, levels),
        best_bid: state.engine.best_bid(&symbol),
        best_ask: state.engine.best_ask(&symbol),
        spread: state.engine.spread(&symbol),
        timestamp: Utc::now(),
        symbol,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Book quality metrics for a symbol.
pub async fn get_metrics(
    Extension(state): Extension<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Response> {
    let symbol = sanitize(&symbol);
    match state.engine.book_metrics(&symbol, DEFAULT_DEPTH) {
        Some((average_spread, order_to_trade_ratio, cancellation_rate)) => {
            let response = MetricsResponse {
                symbol,
                average_spread,
                order_to_trade_ratio,
                cancellation_rate,
            };
            Ok((StatusCode::OK, Json(response)).into_response())
        }
        None => Err(ApiError::NotFound(format!("symbol {} not found", symbol))),
    }
}

/// A user's live orders across all symbols.
pub async fn user_orders(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    Json(state.engine.get_user_orders(&user_id))
}

/// A user's trades across all symbols.
pub async fn user_trades(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    Json(state.engine.get_user_trades(&user_id))
}

/// Engine-wide counters.
pub async fn get_stats(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.get_stats())
}
