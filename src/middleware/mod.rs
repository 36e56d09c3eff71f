/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::admin_gate (認可), http (request id / trace / timeout / body limit)
 */
pub mod auth;
pub mod http;
