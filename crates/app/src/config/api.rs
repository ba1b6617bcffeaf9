//! Remote API Config

use std::time::Duration;

use clap::Args;

use super::ConfigError;

/// Remote shop API settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the shop API
    #[arg(long, env = "KART_API_URL")]
    pub api_url: String,

    /// Session bearer token
    #[arg(long, env = "KART_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Seconds to wait for each request
    #[arg(long, env = "KART_REQUEST_TIMEOUT_SECS", default_value_t = 15_u64)]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when the timeout is zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Duration::from_secs(self.request_timeout_secs))
    }
}
