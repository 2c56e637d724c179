/*
 * Responsibility
 * - middleware の公開インターフェース
 * - gate: locale / 認証 / 認可の判定
 * - http: request-id / trace / body limit / timeout
 */
pub mod gate;
pub mod http;
