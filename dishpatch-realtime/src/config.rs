//! Startup configuration for the relay, read from the environment once.

use crate::error::ConfigError;

/// Broker URL used when `DISHPATCH_AMQP_URL` is unset.
pub const DEFAULT_BROKER_URL: &str = "amqp://127.0.0.1:5672/%2f";
/// Queue name used when `DISHPATCH_QUEUE` is unset.
pub const DEFAULT_QUEUE: &str = "dishpatch.events";

const DEFAULT_PREFETCH: u16 = 1;

/// Environment-provided relay settings, consumed at startup only.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// AMQP connection URL.
    pub broker_url: String,
    /// Durable queue to consume.
    pub queue: String,
    /// Unacknowledged-delivery window (`basic.qos`).
    pub prefetch: u16,
}

impl RelayConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// The seam exists so tests can exercise parsing without mutating the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let broker_url = non_blank("DISHPATCH_AMQP_URL", lookup("DISHPATCH_AMQP_URL"), DEFAULT_BROKER_URL)?;
        let queue = non_blank("DISHPATCH_QUEUE", lookup("DISHPATCH_QUEUE"), DEFAULT_QUEUE)?;

        let prefetch = match lookup("DISHPATCH_PREFETCH") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidInteger {
                name: "DISHPATCH_PREFETCH",
                value: raw,
            })?,
            None => DEFAULT_PREFETCH,
        };

        Ok(Self {
            broker_url,
            queue,
            prefetch,
        })
    }
}

fn non_blank(
    name: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    match value {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Blank { name }),
        Some(value) => Ok(value),
    }
}
