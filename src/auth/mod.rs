pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

pub use extractors::CurrentUser;
pub use identity::{session_token, Identity, SESSION_COOKIE};
pub use middleware::AuthGate;
pub use password::{hash_password, verify_password};
pub use session::{AuthError, SessionGrant, SessionManager, SessionSettings};
pub use token::{SessionClaims, SessionKeys};
