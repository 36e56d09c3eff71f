use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub subject: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthCtx> for SessionResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            subject: ctx.subject,
            role: ctx.role,
            expires_at: ctx.expires_at,
        }
    }
}
