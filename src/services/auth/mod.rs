pub mod authorizer;
pub mod factory;
pub mod secret;

pub use authorizer::{Decision, DenyReason, Principal, TokenAuthorizer, authorize};
pub use factory::build_token_authorizer;
pub use secret::{SecretEncoding, SigningSecret};
