/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - authorizer: TokenAuthorizer, 拒否時の redirect 先, token cookie 名
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use axum::http::HeaderValue;

use crate::services::auth::TokenAuthorizer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub authorizer: Arc<TokenAuthorizer>,
    pub login_redirect: HeaderValue,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(
        authorizer: Arc<TokenAuthorizer>,
        login_redirect: HeaderValue,
        cookie_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            authorizer,
            login_redirect,
            cookie_name: cookie_name.into(),
        }
    }
}
