/// Factory: build `TokenAuthorizer` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenAuthorizer;

pub fn build_token_authorizer(config: &Config) -> Arc<TokenAuthorizer> {
    if config.token_secret.is_empty() {
        // Fail closed: the gateway still starts, but every request is redirected.
        tracing::warn!("TOKEN_SECRET is not configured; all admin requests will be denied");
    }

    let authorizer = TokenAuthorizer::new(&config.token_secret, config.required_role.clone())
        .with_role_claim(config.role_claim.clone());

    Arc::new(authorizer)
}
