/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate: 判定エンジン (route table / negotiator / verifier)
 *   - upstream: front-end への proxy
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::gate::Gate;
use crate::services::upstream::Upstream;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<Gate>,
    pub upstream: Upstream,
}

impl AppState {
    pub fn new(gate: Arc<Gate>, upstream: Upstream) -> Self {
        Self { gate, upstream }
    }
}
