use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use super::lockout::{window, MAX_LOCKOUT_MINUTES};

pub const DEFAULT_SESSION_MINUTES: i64 = 480;
pub const MAX_SESSION_MINUTES: i64 = MAX_LOCKOUT_MINUTES;

const TOKEN_BYTES: usize = 32;

/// Bearer token handed out on a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffSession {
    pub token: String,
    pub username: String,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    username: String,
    expires_at: NaiveDateTime,
}

/// Opaque session tokens with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: HashMap<String, SessionEntry>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_MINUTES)
    }
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: window(ttl_minutes),
            sessions: HashMap::new(),
        }
    }

    pub fn issue(&mut self, username: &str, now: NaiveDateTime) -> StaffSession {
        let token = new_token();
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(NaiveDateTime::MAX);
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                username: username.to_string(),
                expires_at,
            },
        );

        StaffSession {
            token,
            username: username.to_string(),
            expires_at,
        }
    }

    /// Look up a live session. Expired tokens are dropped on sight.
    pub fn resolve(&mut self, token: &str, now: NaiveDateTime) -> Option<StaffSession> {
        let entry = self.sessions.get(token)?;
        if entry.expires_at <= now {
            self.sessions.remove(token);
            return None;
        }

        Some(StaffSession {
            token: token.to_string(),
            username: entry.username.clone(),
            expires_at: entry.expires_at,
        })
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn evict_expired(&mut self, now: NaiveDateTime) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before - self.sessions.len()
    }

    pub fn active(&self) -> usize {
        self.sessions.len()
    }
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
