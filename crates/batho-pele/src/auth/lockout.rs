use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;
/// One year. Longer windows are clamped.
pub const MAX_LOCKOUT_MINUTES: i64 = 525_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AttemptKey<'a> {
    User(&'a str),
    Client(&'a str),
}

impl AttemptKey<'_> {
    fn storage(&self) -> String {
        match self {
            AttemptKey::User(name) => format!("user:{name}"),
            AttemptKey::Client(ip) => format!("ip:{ip}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptRecord {
    count: u32,
    last_attempt: NaiveDateTime,
    locked_until: Option<NaiveDateTime>,
}

/// Tracks failed logins per username and per client address.
///
/// Callers pass the current time so the guard stays deterministic under test.
#[derive(Debug, Clone)]
pub struct LoginGuard {
    max_attempts: u32,
    lockout: Duration,
    attempts: HashMap<String, AttemptRecord>,
}

impl Default for LoginGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_MINUTES)
    }
}

impl LoginGuard {
    pub fn new(max_attempts: u32, lockout_minutes: i64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout: window(lockout_minutes),
            attempts: HashMap::new(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Latest lockout expiry covering the username or client, if any is active.
    pub fn locked_until(
        &self,
        username: &str,
        client_ip: Option<&str>,
        now: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        keys(username, client_ip)
            .filter_map(|key| self.attempts.get(&key.storage()))
            .filter_map(|record| record.locked_until)
            .filter(|until| *until > now)
            .max()
    }

    /// Record a failure and return how many attempts the username has left.
    pub fn record_failure(
        &mut self,
        username: &str,
        client_ip: Option<&str>,
        now: NaiveDateTime,
    ) -> u32 {
        let max_attempts = self.max_attempts;
        let lockout = self.lockout;
        let mut remaining = max_attempts;

        for key in keys(username, client_ip) {
            let record = self
                .attempts
                .entry(key.storage())
                .or_insert(AttemptRecord {
                    count: 0,
                    last_attempt: now,
                    locked_until: None,
                });
            record.count = record.count.saturating_add(1);
            record.last_attempt = now;
            if record.count >= max_attempts {
                record.locked_until =
                    Some(now.checked_add_signed(lockout).unwrap_or(NaiveDateTime::MAX));
            }
            if let AttemptKey::User(_) = key {
                remaining = max_attempts.saturating_sub(record.count);
            }
        }

        remaining
    }

    pub fn clear(&mut self, username: &str, client_ip: Option<&str>) {
        for key in keys(username, client_ip) {
            self.attempts.remove(&key.storage());
        }
    }

    /// Drop expired lockouts and failure counts older than the lockout window.
    pub fn evict_expired(&mut self, now: NaiveDateTime) -> usize {
        let lockout = self.lockout;
        let before = self.attempts.len();
        self.attempts.retain(|_, record| match record.locked_until {
            Some(until) => until > now,
            None => record
                .last_attempt
                .checked_add_signed(lockout)
                .map_or(true, |expiry| expiry > now),
        });
        before - self.attempts.len()
    }

    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }
}

/// Lockout window for `minutes`, clamped to `1..=MAX_LOCKOUT_MINUTES`.
pub(crate) fn window(minutes: i64) -> Duration {
    let minutes = minutes.clamp(1, MAX_LOCKOUT_MINUTES);
    Duration::try_minutes(minutes).unwrap_or_else(|| Duration::minutes(DEFAULT_LOCKOUT_MINUTES))
}

fn keys<'a>(username: &'a str, client_ip: Option<&'a str>) -> impl Iterator<Item = AttemptKey<'a>> {
    std::iter::once(AttemptKey::User(username)).chain(
        client_ip
            .filter(|ip| !ip.trim().is_empty())
            .map(AttemptKey::Client),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .and_then(|date| date.and_hms_opt(8, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn locks_after_max_attempts() {
        let mut guard = LoginGuard::new(3, 15);
        assert_eq!(guard.record_failure("clerk", None, at(0)), 2);
        assert_eq!(guard.record_failure("clerk", None, at(1)), 1);
        assert!(guard.locked_until("clerk", None, at(1)).is_none());
        assert_eq!(guard.record_failure("clerk", None, at(2)), 0);
        assert_eq!(guard.locked_until("clerk", None, at(3)), Some(at(17)));
        assert!(guard.locked_until("clerk", None, at(17)).is_none());
    }

    #[test]
    fn client_address_locks_across_usernames() {
        let mut guard = LoginGuard::new(2, 15);
        guard.record_failure("alice", Some("10.0.0.9"), at(0));
        guard.record_failure("bob", Some("10.0.0.9"), at(1));

        assert!(guard.locked_until("carol", Some("10.0.0.9"), at(2)).is_some());
        assert!(guard.locked_until("carol", Some("10.0.0.10"), at(2)).is_none());
    }

    #[test]
    fn clear_resets_username_and_client() {
        let mut guard = LoginGuard::new(2, 15);
        guard.record_failure("clerk", Some("10.0.0.9"), at(0));
        guard.clear("clerk", Some("10.0.0.9"));
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn oversized_lockout_window_is_clamped() {
        let mut guard = LoginGuard::new(1, i64::MAX);
        assert_eq!(guard.record_failure("clerk", None, at(0)), 0);
        let until = guard
            .locked_until("clerk", None, at(1))
            .expect("locked after one failure");
        assert_eq!(until, at(0) + Duration::minutes(MAX_LOCKOUT_MINUTES));

        let mut huge = LoginGuard::new(1, 1_000_000_000_000);
        huge.record_failure("admin", Some("10.0.0.9"), at(0));
        assert!(huge.locked_until("admin", None, at(59)).is_some());
        assert_eq!(huge.evict_expired(at(59)), 0);
    }

    #[test]
    fn lockout_near_the_end_of_time_saturates() {
        let mut guard = LoginGuard::new(1, MAX_LOCKOUT_MINUTES);
        let late = NaiveDateTime::MAX - Duration::minutes(5);
        guard.record_failure("clerk", None, late);
        assert_eq!(guard.locked_until("clerk", None, late), Some(NaiveDateTime::MAX));
    }

    #[test]
    fn evicts_stale_entries() {
        let mut guard = LoginGuard::new(2, 15);
        guard.record_failure("clerk", None, at(0));
        guard.record_failure("admin", None, at(10));
        guard.record_failure("admin", None, at(11));

        assert_eq!(guard.evict_expired(at(20)), 1, "clerk's stale failure drops");
        assert_eq!(guard.tracked(), 1);
        assert_eq!(guard.evict_expired(at(27)), 1, "admin's lockout expired");
        assert_eq!(guard.tracked(), 0);
    }
}
