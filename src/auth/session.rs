//! The identity provider: sign-up, sign-in, session resolution, sign-out.
//!
//! Sessions are rows in the user store; the client holds a signed token that
//! names the row. A token is honoured only while its signature verifies, its
//! row still exists, and that row has not expired.

use std::fmt;
use std::sync::Arc;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::http::header::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use super::identity::{session_token, Identity, SESSION_COOKIE};
use super::password::{hash_password, verify_password};
use super::token::SessionKeys;
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Credentials, Registration, User};
use crate::store::{SessionRecord, StoreError, UserStore};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// Domain and infrastructure failures of the identity provider.
#[derive(Debug)]
pub enum AuthError {
    /// Registration with an email that already has an account.
    EmailTaken,
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Anything else. The detail is for logs only.
    Internal(String),
}

impl AuthError {
    /// True for business-rule failures whose message may be shown to the user.
    pub fn is_domain(&self) -> bool {
        !matches!(self, AuthError::Internal(_))
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::EmailTaken => write!(f, "User already exists. Use another email."),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password."),
            AuthError::Internal(msg) => write!(f, "Authentication failure: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> AuthError {
        AuthError::Internal(error.to_string())
    }
}

impl From<AppError> for AuthError {
    fn from(error: AppError) -> AuthError {
        AuthError::Internal(error.to_string())
    }
}

/// Session and credential policy.
#[derive(Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl: Duration,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
}

impl SessionSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            secure_cookies: false,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// A freshly opened session.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionManager {
    users: Arc<dyn UserStore>,
    keys: SessionKeys,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(users: Arc<dyn UserStore>, settings: SessionSettings) -> Self {
        Self {
            users,
            keys: SessionKeys::from_secret(&settings.secret),
            settings,
        }
    }

    /// Creates an account and signs it in.
    pub async fn sign_up(&self, registration: &Registration) -> Result<SessionGrant, AuthError> {
        let email = normalize_email(&registration.email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            debug!("sign-up rejected, email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash =
            hash_blocking(registration.password.clone(), self.settings.bcrypt_cost).await?;
        let user = User::new(email, password_hash);
        match self.users.insert_user(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent sign-up for the same email.
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        info!("registered user {}", user.id);
        self.open_session(user.id).await
    }

    /// Verifies credentials and opens a new session.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, AuthError> {
        let email = normalize_email(&credentials.email);
        let user = match self.users.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!("sign-in rejected, unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_blocking(credentials.password.clone(), user.password_hash.clone()).await? {
            debug!("sign-in rejected for user {}, wrong password", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(user.id).await
    }

    async fn open_session(&self, user_id: Uuid) -> Result<SessionGrant, AuthError> {
        let now = Utc::now();
        let purged = self.users.delete_expired_sessions(user_id, now).await?;
        if purged > 0 {
            debug!("purged {} expired session(s) for user {}", purged, user_id);
        }

        let session = SessionRecord::new(user_id, now + self.settings.ttl);
        self.users.insert_session(&session).await?;
        let token = self.keys.sign(&session)?;

        debug!("opened session {} for user {}", session.id, user_id);
        Ok(SessionGrant {
            token,
            identity: Identity {
                user_id,
                session_id: session.id,
            },
            expires_at: session.expires_at,
        })
    }

    /// Resolves the caller of a request. Never fails; anything short of a
    /// live session is `None`.
    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = session_token(headers)?;
        self.resolve_token(&token).await
    }

    pub async fn resolve_token(&self, token: &str) -> Option<Identity> {
        let claims = match self.keys.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("session token rejected: {}", e);
                return None;
            }
        };

        let session = match self.users.find_session(claims.sid).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("session {} no longer exists", claims.sid);
                return None;
            }
            Err(e) => {
                warn!("session lookup failed: {}", e);
                return None;
            }
        };

        if session.user_id != claims.sub {
            debug!("session {} is not bound to its token", session.id);
            return None;
        }

        if session.is_expired(Utc::now()) {
            debug!("session {} has expired, removing it", session.id);
            if let Err(e) = self.users.delete_session(session.id).await {
                warn!("failed to remove expired session {}: {}", session.id, e);
            }
            return None;
        }

        Some(Identity {
            user_id: session.user_id,
            session_id: session.id,
        })
    }

    /// Ends the session behind `identity`. Returns whether a session was removed.
    pub async fn sign_out(&self, identity: &Identity) -> Result<bool, AuthError> {
        let removed = self.users.delete_session(identity.session_id).await?;
        debug!("closed session {} (removed: {})", identity.session_id, removed);
        Ok(removed)
    }

    pub fn session_cookie(&self, grant: &SessionGrant) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, grant.token.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.settings.secure_cookies)
            .max_age(CookieDuration::seconds(self.settings.ttl.num_seconds()))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.settings.secure_cookies)
            .finish();
        cookie.make_removal();
        cookie
    }
}

async fn hash_blocking(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(AuthError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))?
        .map_err(AuthError::from)
}
