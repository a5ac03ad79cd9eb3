//! Authentication and session core

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh;

pub use error::AuthError;
pub use jwt::{clamp_ttl, Claims, TokenSigner};
pub use middleware::{
    authenticate, extract_api_key, extract_bearer, jwt_auth_middleware, AuthContext,
};
pub use password::PasswordHasher;
pub use refresh::RefreshTokenStore;
