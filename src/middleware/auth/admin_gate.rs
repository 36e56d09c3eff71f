//! admin token 検証 → 通過なら AuthCtx を extensions に入れる / 拒否なら login へ 302
//!
//! - token は cookie (`jwtToken`) から取り出す。無ければ `Authorization: Bearer` を見る
//! - 拒否理由は log にだけ残し、レスポンスは理由に関わらず同一

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::Decision;
use crate::state::AppState;

/// admin 領域に gate を掛ける。
///
/// ```ignore
/// let admin = Router::new().route("/admin/session", get(session));
/// let admin = middleware::auth::admin_gate::apply(admin, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, admin_gate))
}

async fn admin_gate(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers(), &state.cookie_name);

    // `now` は毎リクエスト取り直す
    match state.authorizer.authorize(token, Utc::now()) {
        Decision::Allow(principal) => {
            tracing::debug!(subject = %principal.subject, "admin token accepted");
            req.extensions_mut().insert(AuthCtx::from(principal));
            Ok(next.run(req).await)
        }
        Decision::Deny(reason) => {
            tracing::warn!(
                code = reason.code(),
                reason = ?reason,
                path = %original_uri.path(),
                "admin token rejected"
            );
            Err(AppError::LoginRequired {
                location: state.login_redirect.clone(),
            })
        }
    }
}

fn extract_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))
}

// First matching cookie wins, across every `Cookie` header.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
