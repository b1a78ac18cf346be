use std::{net::SocketAddr, str::FromStr, time::Duration};

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub database_pool_size: usize,
    pub database_acquire_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    /// How often clients are told to poll the unread-notification count
    pub notification_poll_interval: Duration,
}

const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => {
                tracing::debug!("Missing environment variable `{key}`");
                Ok(None)
            }
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

/// Parses `raw` or falls back to `default`, logging when a value was present
/// but unusable.
fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => match raw.trim().parse() {
            Ok(val) => val,
            Err(_) => {
                tracing::error!("Environment variable `{key}` has an invalid value `{raw}`, using default");
                default
            }
        },
        None => default,
    }
}

fn parse_env(raw: Option<String>) -> Env {
    match raw.as_deref() {
        Some("dev") => Env::Dev,
        Some("staging") => Env::Staging,
        Some("production") => Env::Production,
        _ => Env::Dev,
    }
}

fn parse_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let optional = |key: &str| var(key).ok().flatten();

        ServerConfig {
            env: parse_env(optional("ENVIRONMENT")),
            database_url: required_var("DATABASE_URL"),
            listen_addr: parse_or(
                "LISTEN_ADDR",
                optional("LISTEN_ADDR"),
                SocketAddr::from(([0, 0, 0, 0], 3001)),
            ),
            database_pool_size: parse_or(
                "DATABASE_POOL_SIZE",
                optional("DATABASE_POOL_SIZE"),
                DEFAULT_POOL_SIZE,
            ),
            database_acquire_timeout: Duration::from_secs(parse_or(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                optional("DATABASE_ACQUIRE_TIMEOUT_SECS"),
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )),
            cors_allowed_origins: parse_origins(optional("CORS_ALLOWED_ORIGINS")),
            notification_poll_interval: Duration::from_secs(parse_or(
                "NOTIFICATION_POLL_INTERVAL_SECS",
                optional("NOTIFICATION_POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
            )),
        }
    }

    pub fn is_dev(&self) -> bool {
        self.env == Env::Dev
    }
}
