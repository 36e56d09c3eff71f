use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::auth::secret::SigningSecret;

pub const DEFAULT_REQUIRED_ROLE: &str = "ADMIN";
pub const DEFAULT_ROLE_CLAIM: &str = "status";

/// Why a token could not be parsed or verified. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenCause {
    /// Not three segments, bad base64, bad UTF-8.
    Malformed,
    /// Header names an algorithm outside the HMAC family we accept.
    UnsupportedAlgorithm,
    SignatureMismatch,
    /// Header or payload JSON did not decode into the expected shape.
    Undecodable,
}

impl From<&jsonwebtoken::errors::Error> for InvalidTokenCause {
    fn from(e: &jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::SignatureMismatch,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                Self::UnsupportedAlgorithm
            }
            ErrorKind::Json(_) => Self::Undecodable,
            _ => Self::Malformed,
        }
    }
}

/// Reason attached to a denial.
///
/// Used for logs only. The HTTP response is identical for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("missing token")]
    MissingToken,
    #[error("signing secret unavailable")]
    SigningSecretUnavailable,
    #[error("invalid signature")]
    MalformedOrUnverifiable(InvalidTokenCause),
    #[error("expired")]
    Expired,
    #[error("not yet valid")]
    NotYetValid,
    #[error("missing subject")]
    MissingSubject,
    #[error("role mismatch")]
    RoleMismatch,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::SigningSecretUnavailable => "signing_secret_unavailable",
            Self::MalformedOrUnverifiable(_) => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::MissingSubject => "missing_subject",
            Self::RoleMismatch => "role_mismatch",
        }
    }
}

// Timestamps outside chrono's range.
const UNDECODABLE: DenyReason = DenyReason::MalformedOrUnverifiable(InvalidTokenCause::Undecodable);

/// Identity carried by a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Principal),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow(_) => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}

// Claims are read leniently so that each missing piece maps to its own denial;
// a wrongly typed `sub`/`exp`/`nbf` still fails decoding.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    exp: Option<i64>,
    nbf: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// HMAC (HS256/384/512) token verifier plus the single-role admin policy.
///
/// Stateless after construction: safe to share behind an `Arc` across requests.
/// Time is always supplied by the caller.
#[derive(Clone)]
pub struct TokenAuthorizer {
    secret_configured: bool,
    decoding_key: DecodingKey,
    validation: Validation,
    required_role: String,
    role_claim: String,
}

impl std::fmt::Debug for TokenAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenAuthorizer")
            .field("secret_configured", &self.secret_configured)
            .field("required_role", &self.required_role)
            .field("role_claim", &self.role_claim)
            .finish()
    }
}

impl TokenAuthorizer {
    pub fn new(secret: &SigningSecret, required_role: impl Into<String>) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.expose());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp/nbf are checked against the caller's `now`, not the library clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            secret_configured: !secret.is_empty(),
            decoding_key,
            validation,
            required_role: required_role.into(),
            role_claim: DEFAULT_ROLE_CLAIM.to_string(),
        }
    }

    pub fn with_role_claim(mut self, role_claim: impl Into<String>) -> Self {
        self.role_claim = role_claim.into();
        self
    }

    /// Evaluate a candidate token.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// presence, signature, expiry (`exp <= now` is expired), not-before
    /// (`nbf > now`), subject, role.
    pub fn authorize(&self, token: Option<&str>, now: DateTime<Utc>) -> Decision {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Decision::Deny(DenyReason::MissingToken),
        };

        if !self.secret_configured {
            return Decision::Deny(DenyReason::SigningSecretUnavailable);
        }

        let claims = match jsonwebtoken::decode::<TokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                return Decision::Deny(DenyReason::MalformedOrUnverifiable(
                    InvalidTokenCause::from(&e),
                ));
            }
        };

        let expires_at = match claims.exp.map(|exp| DateTime::from_timestamp(exp, 0)) {
            None => return Decision::Deny(DenyReason::Expired),
            Some(None) => return Decision::Deny(UNDECODABLE),
            Some(Some(exp)) if exp <= now => return Decision::Deny(DenyReason::Expired),
            Some(Some(exp)) => exp,
        };

        match claims.nbf.map(|nbf| DateTime::from_timestamp(nbf, 0)) {
            Some(None) => return Decision::Deny(UNDECODABLE),
            Some(Some(nbf)) if nbf > now => return Decision::Deny(DenyReason::NotYetValid),
            _ => {}
        }

        let subject = match claims.sub {
            Some(sub) if !sub.is_empty() => sub,
            _ => return Decision::Deny(DenyReason::MissingSubject),
        };

        let role = match claims.extra.get(&self.role_claim) {
            Some(Value::String(role)) if *role == self.required_role => role.clone(),
            _ => return Decision::Deny(DenyReason::RoleMismatch),
        };

        Decision::Allow(Principal {
            subject,
            role,
            expires_at,
        })
    }
}

/// One-shot form of [`TokenAuthorizer::authorize`] using the default role claim.
pub fn authorize(
    token: Option<&str>,
    secret: &SigningSecret,
    now: DateTime<Utc>,
    required_role: &str,
) -> Decision {
    TokenAuthorizer::new(secret, required_role).authorize(token, now)
}
