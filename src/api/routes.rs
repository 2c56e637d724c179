/*
 * Responsibility
 * - URL 構造を定義
 * - /health は gate の外、それ以外はすべて gate → upstream proxy
 */
use axum::{Router, routing::get};

use crate::api::handlers::{health::health, proxy::proxy};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let gated = middleware::gate::apply(Router::new().fallback(proxy), state);

    Router::new().route("/health", get(health)).merge(gated)
}
