use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub schedule_cache_ttl_secs: u64,

    // Dashboard stream
    pub dashboard_push_interval_secs: u64,
    pub dashboard_wait_timeout_secs: u64,
    pub dashboard_poll_interval_secs: u64,

    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            db_max_connections: or_default("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: or_default("RUN_MIGRATIONS", true)?,
            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,
            schedule_cache_ttl_secs: or_default("SCHEDULE_CACHE_TTL_SECS", 60)?,
            dashboard_push_interval_secs: or_default("DASHBOARD_PUSH_INTERVAL_SECS", 3)?,
            dashboard_wait_timeout_secs: or_default("DASHBOARD_WAIT_TIMEOUT_SECS", 30)?,
            dashboard_poll_interval_secs: or_default("DASHBOARD_POLL_INTERVAL_SECS", 5)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }

    pub fn schedule_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.schedule_cache_ttl_secs)
    }

    pub fn dashboard_push_interval(&self) -> Duration {
        // a zero period would make the interval timer panic
        Duration::from_secs(self.dashboard_push_interval_secs.max(1))
    }

    pub fn dashboard_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.dashboard_wait_timeout_secs)
    }

    pub fn dashboard_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_poll_interval_secs.max(1))
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: "mysql://localhost/timekeeper_test".into(),
            jwt_secret: jwt_secret.into(),
            server_addr: "127.0.0.1:0".into(),
            api_prefix: "/api".into(),
            db_max_connections: 1,
            run_migrations: false,
            rate_protected_per_min: 1000,
            schedule_cache_ttl_secs: 60,
            dashboard_push_interval_secs: 1,
            dashboard_wait_timeout_secs: 0,
            dashboard_poll_interval_secs: 1,
            log_dir: "logs".into(),
        }
    }
}
