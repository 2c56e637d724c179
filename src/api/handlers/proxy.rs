/*
 * Responsibility
 * - gate を通過したリクエストを front-end (upstream) へ転送する fallback handler
 * - gate が Identity を載せていれば role を upstream に渡す
 */
use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
};

use crate::{error::AppError, middleware::gate::Identity, state::AppState};

pub async fn proxy(
    State(state): State<AppState>,
    req: Request<Body>,
) -> Result<Response<Body>, AppError> {
    let role = req
        .extensions()
        .get::<Identity>()
        .and_then(|identity| identity.role.clone());

    state.upstream.forward(req, role.as_deref()).await
}
