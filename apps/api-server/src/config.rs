//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use folio_core::domain::DEFAULT_AUTHOR;
use folio_infra::{DatabaseConfig, MailRelayConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `development` exposes internal error detail in responses.
    pub environment: String,
    pub database: Option<DatabaseConfig>,
    /// `None` disables every admin route.
    pub admin_password: Option<String>,
    pub post_author: String,
    pub mail: Option<MailRelayConfig>,
    pub contact_rate_limit: RateLimitConfig,
    pub auth_rate_limit: RateLimitConfig,
    /// Take the client address from `Forwarded`/`X-Forwarded-For`.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_proxy: bool,
    /// Browser origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

/// Origins of a locally running frontend.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    var(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn flag(key: &str) -> bool {
    var(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// `DEV_ORIGINS` plus every comma-separated entry of `FRONTEND_URL`.
/// Entries that are not http(s) origins are dropped with a warning.
fn allowed_origins(frontend: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
    for raw in frontend.unwrap_or_default().split(',') {
        let origin = raw.trim().trim_end_matches('/');
        if origin.is_empty() {
            continue;
        }
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            tracing::warn!(origin, "Ignoring FRONTEND_URL entry that is not an http(s) origin");
            continue;
        }
        if !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_string());
        }
    }
    origins
}

fn rate_limit(prefix: &str, default: RateLimitConfig) -> RateLimitConfig {
    RateLimitConfig::new(
        parsed(&format!("{prefix}_RATE_LIMIT_MAX"), default.max_requests),
        Duration::from_secs(parsed(
            &format!("{prefix}_RATE_LIMIT_WINDOW_SECS"),
            default.window.as_secs(),
        )),
    )
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
        });

        let mail = var("MAIL_RELAY_URL").and_then(|url| {
            let from = var("MAIL_FROM")?;
            Some(MailRelayConfig {
                url,
                token: var("MAIL_RELAY_TOKEN"),
                to: var("MAIL_TO").unwrap_or_else(|| from.clone()),
                from,
            })
        });

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            environment: var("APP_ENV").unwrap_or_else(|| "production".to_string()),
            database,
            admin_password: var("ADMIN_PASSWORD"),
            post_author: var("POST_AUTHOR").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            mail,
            contact_rate_limit: rate_limit("CONTACT", RateLimitConfig::contact_form()),
            auth_rate_limit: rate_limit("AUTH", RateLimitConfig::admin_auth()),
            trust_proxy: flag("TRUST_PROXY"),
            allowed_origins: allowed_origins(var("FRONTEND_URL").as_deref()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
