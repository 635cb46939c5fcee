//! Error taxonomy for the relay core.

use thiserror::Error;

/// Fatal startup-configuration errors.
///
/// These are the only failures that halt startup; everything past
/// initialization is absorbed and logged by the consumer loop.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable that must parse as an integer did not.
    #[error("{name} must be an integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },

    /// A variable was set to an empty or whitespace-only value.
    #[error("{name} must not be blank")]
    Blank { name: &'static str },
}

/// Failures that end a consumer run.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The broker stayed unreachable past the reconnect budget.
    /// Consumption halts until the process is restarted.
    #[error("broker unavailable after {attempts} connect attempts: {last_error}")]
    BrokerUnavailable {
        attempts: u32,
        #[source]
        last_error: lapin::Error,
    },
}
