//! Passcode gate and session tracking.
//!
//! The passcode check hashes both sides with SHA-256 and compares the digests
//! in constant time, so timing reveals neither the first mismatching byte nor
//! the secret's length.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "portal_session";

/// Check a submitted passcode against the configured secret.
pub fn verify(submitted: &str, secret: &str) -> bool {
    let submitted = Sha256::digest(submitted.as_bytes());
    let secret = Sha256::digest(secret.as_bytes());
    submitted.as_slice().ct_eq(secret.as_slice()).into()
}

/// Passcode gate with an in-memory set of authenticated sessions.
///
/// Sessions stay valid until logout or process exit. Signing in again with a
/// live session cookie keeps that session, so the set grows by one per browser
/// rather than per login.
pub struct Gatekeeper {
    secret: String,
    sessions: RwLock<HashSet<String>>,
}

impl Gatekeeper {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            sessions: RwLock::new(HashSet::new()),
        }
    }

    /// Verify a passcode and return a session token on success.
    ///
    /// `current` is the token the client already holds; it is reused when
    /// still valid instead of opening another session.
    pub async fn login(&self, submitted: &str, current: Option<&str>) -> Option<String> {
        if !verify(submitted, &self.secret) {
            info!("Rejected passcode attempt");
            return None;
        }
        let mut sessions = self.sessions.write().await;
        if let Some(token) = current.filter(|t| sessions.contains(*t)) {
            debug!("Reused dashboard session");
            return Some(token.to_string());
        }
        let token = Uuid::new_v4().to_string();
        sessions.insert(token.clone());
        info!(sessions = sessions.len(), "Opened dashboard session");
        Some(token)
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_authenticated(&self, token: &str) -> bool {
        self.sessions.read().await.contains(token)
    }

    pub async fn logout(&self, token: &str) {
        if self.sessions.write().await.remove(token) {
            debug!("Closed dashboard session");
        }
    }
}

/// Extract the session token from a `Cookie` header value.
pub fn session_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

/// `Set-Cookie` value for a new session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict")
}

/// `Set-Cookie` value that clears the session.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}
