// Configuration for:
// - Database connection string
// - Server listening address/port
// - Guest session tokens and the admin API key
// - Cache settings (TTLs, sweep interval)
// - Comment quota and CORS origins

use crate::cache::{DEFAULT_SWEEP_INTERVAL, GUEST_CACHE_TTL};
use crate::service::COMMENT_CACHE_TTL;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "test-secret";
pub const DEFAULT_ADMIN_API_KEY: &str = "admin-api-key";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    pub admin_api_key: String,
    pub guest_cache_ttl: Duration,
    pub comment_cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub max_comments_per_guest: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/guests.db".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
            admin_api_key: DEFAULT_ADMIN_API_KEY.to_string(),
            guest_cache_ttl: GUEST_CACHE_TTL,
            comment_cache_ttl: COMMENT_CACHE_TTL,
            cache_sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_comments_per_guest: 2,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost".to_string(),
                "http://127.0.0.1".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_var("SERVER_PORT", defaults.server_port);
        let jwt_secret = env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret);
        let jwt_expiry = secs_var("JWT_EXPIRY_SECS", defaults.jwt_expiry);
        let admin_api_key = env::var("ADMIN_API_KEY").unwrap_or(defaults.admin_api_key);
        let guest_cache_ttl = secs_var("GUEST_CACHE_TTL_SECS", defaults.guest_cache_ttl);
        let comment_cache_ttl = secs_var("COMMENT_CACHE_TTL_SECS", defaults.comment_cache_ttl);
        let cache_sweep_interval = nonzero_secs_var("CACHE_SWEEP_INTERVAL_SECS", defaults.cache_sweep_interval);
        let max_comments_per_guest = parse_var("MAX_COMMENTS_PER_GUEST", defaults.max_comments_per_guest);
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| split_origins(&origins))
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            database_url,
            server_host,
            server_port,
            jwt_secret,
            jwt_expiry,
            admin_api_key,
            guest_cache_ttl,
            comment_cache_ttl,
            cache_sweep_interval,
            max_comments_per_guest,
            cors_allowed_origins,
        }
    }

    pub fn uses_default_secrets(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET || self.admin_api_key == DEFAULT_ADMIN_API_KEY
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn secs_var(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

/// Like [`secs_var`], but zero also falls back to the default
fn nonzero_secs_var(name: &str, default: Duration) -> Duration {
    Some(secs_var(name, default))
        .filter(|duration| !duration.is_zero())
        .unwrap_or(default)
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
