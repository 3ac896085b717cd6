use std::path::PathBuf;

use mutuelle_core::cotisation::WindowRule;

use crate::auth::jwt::JwtConfig;

/// Default CORS origins (the back-office frontend dev server).
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root for generated membership cards (`{media_root}/cartes`).
    pub media_root: PathBuf,
    /// Directory for generated claim receipts.
    pub receipts_dir: PathBuf,
    /// How the initial cotisation's `date_fin` is derived at member creation.
    pub window_rule: WindowRule,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                       |
    /// |--------------------------|-----------------------------------------------|
    /// | `DATABASE_URL`           | required                                      |
    /// | `HOST`                   | `0.0.0.0`                                     |
    /// | `PORT`                   | `3000`                                        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173,http://127.0.0.1:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                          |
    /// | `MEDIA_ROOT`             | `media`                                       |
    /// | `RECEIPTS_DIR`           | `recu_pdfs`                                   |
    /// | `COTISATION_WINDOW_RULE` | `calendar_month` (or `thirty_days`)           |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on a missing `DATABASE_URL` or any unparsable value.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));
        let receipts_dir =
            PathBuf::from(std::env::var("RECEIPTS_DIR").unwrap_or_else(|_| "recu_pdfs".into()));

        let window_rule = match std::env::var("COTISATION_WINDOW_RULE") {
            Ok(raw) => raw
                .trim()
                .parse()
                .unwrap_or_else(|e| panic!("COTISATION_WINDOW_RULE: {e}")),
            Err(_) => WindowRule::default(),
        };

        let jwt = JwtConfig::from_env();

        Self {
            database_url,
            host,
            port,
            cors_origins,
            request_timeout_secs,
            media_root,
            receipts_dir,
            window_rule,
            jwt,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
