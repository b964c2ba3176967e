mod crypto;
mod extractor;
mod jwt;
mod middleware;

pub use crypto::{hash_password, verify_password};
pub use extractor::{AdminUser, AuthError, AuthUser};
pub use jwt::{SigningKeyError, TokenError, TokenService};
pub use middleware::require_auth;
