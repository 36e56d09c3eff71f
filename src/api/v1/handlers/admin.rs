/*
 * Responsibility
 * - GET /api/v1/admin/session
 * - gate を通過した principal をそのまま返す (login 画面側の疎通確認用)
 */
use axum::Json;

use crate::api::v1::dto::session::SessionResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn session(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<SessionResponse> {
    Json(SessionResponse::from(ctx))
}
