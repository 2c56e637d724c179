/*
 * Responsibility
 * - リクエスト単位の認可ゲート (locale / route 分類 / credential / 判定)
 * - HTTP 層 (axum middleware) からは `Gate::evaluate` だけを呼ぶ
 */
pub mod credential;
pub mod engine;
pub mod locale;
pub mod path;
pub mod request;
pub mod routes;

pub use engine::{Decision, FORBIDDEN_PAGE, Gate, LOGIN_PAGE};
pub use request::GateRequest;
