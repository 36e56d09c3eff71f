/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (admin gate / http)
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::{Router, routing::get};
use std::{panic, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_token_authorizer;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,admin_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // Development: crash the whole process. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        required_role = %config.required_role,
        cookie = %config.cookie_name,
        "starting admin gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    AppState::new(
        build_token_authorizer(config),
        config.login_redirect.clone(),
        config.cookie_name.as_str(),
    )
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router, config.request_timeout)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::authorizer::tests::mint;

    fn app(pairs: &[(&str, &str)]) -> Router {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_lookup(|key| map.get(key).cloned()).unwrap();
        build_router(build_state(&config), &config)
    }

    fn session_request(cookie: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/v1/admin/session");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(&[]).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn session_returns_principal() {
        let app = app(&[("TOKEN_SECRET", "c2Vzc2lvbi1zZWNyZXQ=")]);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(
            b"session-secret",
            json!({ "sub": "manager-7", "status": "ADMIN", "exp": exp }),
        );

        let response = app
            .oneshot(session_request(Some(format!("jwtToken={token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["subject"], "manager-7");
        assert_eq!(body["role"], "ADMIN");
        assert!(body["expires_at"].is_string());
    }

    #[tokio::test]
    async fn unconfigured_secret_fails_closed() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(b"", json!({ "sub": "u1", "status": "ADMIN", "exp": exp }));

        let response = app(&[])
            .oneshot(session_request(Some(format!("jwtToken={token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/manager-service/admin/login"
        );
    }

    #[tokio::test]
    async fn redirect_target_and_cookie_are_configurable() {
        let app = app(&[
            ("TOKEN_SECRET", "k"),
            ("TOKEN_SECRET_ENCODING", "raw"),
            ("TOKEN_COOKIE_NAME", "adminToken"),
            ("LOGIN_REDIRECT", "/login"),
        ]);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(b"k", json!({ "sub": "u1", "status": "ADMIN", "exp": exp }));

        let response = app
            .clone()
            .oneshot(session_request(Some(format!("jwtToken={token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");

        let response = app
            .oneshot(session_request(Some(format!("adminToken={token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
