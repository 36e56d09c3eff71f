/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - admin gate が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use chrono::{DateTime, Utc};

use crate::services::auth::Principal;

/// Context attached to a request that passed the admin gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Principal> for AuthCtx {
    fn from(p: Principal) -> Self {
        Self {
            subject: p.subject,
            role: p.role,
            expires_at: p.expires_at,
        }
    }
}
