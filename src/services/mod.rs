/*
 * Responsibility
 * - gate から使う外部協調者 (identity service / locale negotiation / upstream)
 */
pub mod auth;
pub mod locale;
pub mod upstream;
