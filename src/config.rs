use chrono::Duration;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings consumed by the session core
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_login: String,
    pub admin_password: String,
    pub hs256_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Upper bound on a single revocation store round-trip
    pub store_timeout: std::time::Duration,
    /// Revoke the presented refresh token whenever it is exchanged
    pub rotate_refresh_tokens: bool,
}

impl AuthConfig {
    /// Config with the usual token lifetimes (15 minutes / 7 days)
    pub fn new(
        admin_login: impl Into<String>,
        admin_password: impl Into<String>,
        hs256_secret: impl Into<String>,
    ) -> Self {
        Self {
            admin_login: admin_login.into(),
            admin_password: admin_password.into(),
            hs256_secret: hs256_secret.into(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            store_timeout: std::time::Duration::from_secs(3),
            rotate_refresh_tokens: true,
        }
    }
}

/// Attributes of the refresh token cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            path: "/admin/auth".to_string(),
            domain: None,
            secure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// Revocations are kept in memory when unset
    pub redis_url: Option<String>,
    pub revocation_sweep_interval: std::time::Duration,
    pub auth: AuthConfig,
    pub cookie: CookieConfig,
}

impl Config {
    /// Builds the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let auth = AuthConfig {
            admin_login: required("ADMIN_LOGIN")?,
            admin_password: required("ADMIN_PASS")?,
            hs256_secret: required("HS256_SECRET")?,
            access_token_ttl: ttl_or(&lookup, "ACCESS_TOKEN_EXP", 15, Duration::try_minutes)?,
            refresh_token_ttl: ttl_or(&lookup, "REFRESH_TOKEN_EXP", 7, Duration::try_days)?,
            store_timeout: std::time::Duration::from_secs(parse_or(
                &lookup,
                "REVOCATION_STORE_TIMEOUT_SECS",
                3u64,
            )?),
            rotate_refresh_tokens: parse_or(&lookup, "ROTATE_REFRESH_TOKENS", true)?,
        };

        let cookie = CookieConfig {
            domain: lookup("REFRESH_COOKIE_DOMAIN").filter(|v| !v.is_empty()),
            secure: parse_or(&lookup, "REFRESH_COOKIE_SECURE", false)?,
            ..CookieConfig::default()
        };

        Ok(Self {
            server_addr: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            redis_url: lookup("REDIS_URL").filter(|v| !v.is_empty()),
            revocation_sweep_interval: std::time::Duration::from_secs(parse_or(
                &lookup,
                "REVOCATION_SWEEP_SECS",
                60u64,
            )?),
            auth,
            cookie,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Longest accepted token lifetime; keeps `now + ttl` far inside chrono's range
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Parses a positive token lifetime expressed in the unit `to_duration` builds
fn ttl_or<F>(
    lookup: &F,
    key: &'static str,
    default: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount = parse_or(lookup, key, default)?;
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    };

    if amount <= 0 {
        return Err(invalid("must be positive"));
    }

    let ttl = to_duration(amount).ok_or_else(|| invalid("out of range"))?;
    if ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
        return Err(invalid("must not exceed ten years"));
    }
    Ok(ttl)
}

/// Loads the config from the process environment, reading `.env` first if present
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
}
