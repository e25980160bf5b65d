//! Staff sign-in for the intake desk.
//!
//! Passwords are checked against SHA-256 digests and repeated failures lock the
//! username and the client address out for a configurable window. A successful
//! login yields a bearer token that the patient-facing routes require.

pub mod credentials;
pub mod lockout;
pub mod session;

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;
use tracing::{info, warn};

pub use credentials::{hash_password, CredentialError, CredentialStore};
pub use lockout::{LoginGuard, DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, MAX_LOCKOUT_MINUTES};
pub use session::{SessionStore, StaffSession, DEFAULT_SESSION_MINUTES, MAX_SESSION_MINUTES};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("invalid username or password, {remaining} attempts remaining")]
    InvalidCredentials { remaining: u32 },
    #[error("account locked until {until}")]
    LockedOut { until: NaiveDateTime },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("missing bearer token")]
    Missing,
    #[error("session expired or unknown")]
    Invalid,
}

/// Verifies staff credentials while enforcing the failed-attempt lockout.
#[derive(Debug)]
pub struct Authenticator {
    credentials: CredentialStore,
    guard: Mutex<LoginGuard>,
    sessions: Mutex<SessionStore>,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(CredentialStore::development(), LoginGuard::default())
    }
}

impl Authenticator {
    pub fn new(credentials: CredentialStore, guard: LoginGuard) -> Self {
        Self::with_sessions(credentials, guard, SessionStore::default())
    }

    pub fn with_sessions(
        credentials: CredentialStore,
        guard: LoginGuard,
        sessions: SessionStore,
    ) -> Self {
        Self {
            credentials,
            guard: Mutex::new(guard),
            sessions: Mutex::new(sessions),
        }
    }

    pub fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<StaffSession, LoginError> {
        let username = username.trim();
        let mut guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        guard.evict_expired(now);

        if let Some(until) = guard.locked_until(username, client_ip, now) {
            warn!(username, client_ip, %until, "login rejected during lockout");
            return Err(LoginError::LockedOut { until });
        }

        if self.credentials.verify(username, password) {
            guard.clear(username, client_ip);
            drop(guard);
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.evict_expired(now);
            let session = sessions.issue(username, now);
            info!(username, expires_at = %session.expires_at, "staff login succeeded");
            return Ok(session);
        }

        let remaining = guard.record_failure(username, client_ip, now);
        if let Some(until) = guard.locked_until(username, client_ip, now) {
            warn!(username, client_ip, %until, "too many failed logins, locking out");
            return Err(LoginError::LockedOut { until });
        }

        warn!(username, client_ip, remaining, "failed login");
        Err(LoginError::InvalidCredentials { remaining })
    }

    /// Resolve a bearer token to the staff session it was issued for.
    pub fn authorize(
        &self,
        token: &str,
        now: NaiveDateTime,
    ) -> Result<StaffSession, SessionError> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(token, now)
            .ok_or(SessionError::Invalid)
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .revoke(token)
    }

    pub fn max_attempts(&self) -> u32 {
        self.guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .max_attempts()
    }
}
