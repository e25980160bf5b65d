use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::auth::{
    Authenticator, CredentialError, CredentialStore, LoginGuard, SessionStore,
    DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, DEFAULT_SESSION_MINUTES, MAX_LOCKOUT_MINUTES,
    MAX_SESSION_MINUTES,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let verification_table = env::var("INTAKE_VERIFICATION_TABLE")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let max_attempts = match env::var("AUTH_MAX_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidMaxAttempts)?,
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };
        let lockout_minutes = match env::var("AUTH_LOCKOUT_MINUTES") {
            Ok(raw) => parse_minutes(&raw, MAX_LOCKOUT_MINUTES)
                .ok_or(ConfigError::InvalidLockoutMinutes)?,
            Err(_) => DEFAULT_LOCKOUT_MINUTES,
        };
        let session_minutes = match env::var("AUTH_SESSION_MINUTES") {
            Ok(raw) => parse_minutes(&raw, MAX_SESSION_MINUTES)
                .ok_or(ConfigError::InvalidSessionMinutes)?,
            Err(_) => DEFAULT_SESSION_MINUTES,
        };
        let trust_forwarded_for = match env::var("AUTH_TRUST_FORWARDED_FOR") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidTrustForwardedFor(raw))?,
            Err(_) => false,
        };
        let credentials = match env::var("AUTH_STAFF_CREDENTIALS") {
            Ok(raw) if !raw.trim().is_empty() => CredentialStore::parse(&raw)
                .map_err(|source| ConfigError::InvalidCredentials { source })?,
            _ => CredentialStore::development(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            intake: IntakeConfig { verification_table },
            auth: AuthConfig {
                max_attempts,
                lockout_minutes,
                session_minutes,
                trust_forwarded_for,
                credentials,
            },
        })
    }
}

fn parse_minutes(raw: &str, max: i64) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (1..=max).contains(minutes))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Where identity lookups are served from. `None` uses the built-in sample table.
#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    pub verification_table: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub max_attempts: u32,
    pub lockout_minutes: i64,
    pub session_minutes: i64,
    /// Take the client address from `X-Forwarded-For`. Only safe behind a proxy that sets it.
    pub trust_forwarded_for: bool,
    pub credentials: CredentialStore,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_minutes: DEFAULT_LOCKOUT_MINUTES,
            session_minutes: DEFAULT_SESSION_MINUTES,
            trust_forwarded_for: false,
            credentials: CredentialStore::development(),
        }
    }
}

impl AuthConfig {
    pub fn login_guard(&self) -> LoginGuard {
        LoginGuard::new(self.max_attempts, self.lockout_minutes)
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::with_sessions(
            self.credentials.clone(),
            self.login_guard(),
            SessionStore::new(self.session_minutes),
        )
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidMaxAttempts,
    InvalidLockoutMinutes,
    InvalidSessionMinutes,
    InvalidTrustForwardedFor(String),
    InvalidCredentials { source: CredentialError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be `compact` or `json`, got '{value}'")
            }
            ConfigError::InvalidMaxAttempts => {
                write!(f, "AUTH_MAX_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidLockoutMinutes => write!(
                f,
                "AUTH_LOCKOUT_MINUTES must be an integer between 1 and {MAX_LOCKOUT_MINUTES}"
            ),
            ConfigError::InvalidSessionMinutes => write!(
                f,
                "AUTH_SESSION_MINUTES must be an integer between 1 and {MAX_SESSION_MINUTES}"
            ),
            ConfigError::InvalidTrustForwardedFor(value) => {
                write!(f, "AUTH_TRUST_FORWARDED_FOR must be true or false, got '{value}'")
            }
            ConfigError::InvalidCredentials { source } => {
                write!(f, "AUTH_STAFF_CREDENTIALS is invalid: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidCredentials { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidMaxAttempts
            | ConfigError::InvalidLockoutMinutes
            | ConfigError::InvalidSessionMinutes
            | ConfigError::InvalidTrustForwardedFor(_) => None,
        }
    }
}
