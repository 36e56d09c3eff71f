/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /admin 配下はすべて admin gate の内側に置く
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::admin::session;
use crate::middleware::auth::admin_gate;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new().route("/admin/session", get(session));

    admin_gate::apply(admin, state)
}
