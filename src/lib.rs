//! Admin gateway: verifies an HMAC-signed admin token carried in a cookie and
//! either forwards the request or redirects it to the login page.
//!
//! The policy itself lives in [`services::auth::TokenAuthorizer`] and has no
//! HTTP dependency; [`middleware::auth::admin_gate`] binds it to axum.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
