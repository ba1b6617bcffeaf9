//! Client configuration

use std::time::Duration;

use clap::Args;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    auth::AuthToken,
    config::{api::ApiConfig, observability::LoggingConfig},
    messages::Locale,
};

pub mod api;
pub mod observability;

/// Errors raised while interpreting configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `KART_CURRENCY` is not an ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// `KART_REQUEST_TIMEOUT_SECS` is zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Kart client configuration, from CLI arguments and the environment.
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Remote shop API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// ISO 4217 code subtotals are shown in
    #[arg(long, env = "KART_CURRENCY", default_value = "VND")]
    pub currency: String,

    /// Language of user-facing messages (en, vi)
    #[arg(long, env = "KART_LOCALE", value_enum, default_value_t = Locale::Vi)]
    pub locale: Locale,
}

impl ClientConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for codes `rusty-money` does not know.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        iso::find(&self.currency.trim().to_uppercase())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when the timeout is zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        self.api.request_timeout()
    }

    /// Session token, when one was configured.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        AuthToken::from_optional(self.api.token.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ClientConfig,
    }

    fn parse(args: &[&str]) -> Result<ClientConfig, clap::Error> {
        TestCli::try_parse_from(std::iter::once("kart").chain(args.iter().copied()))
            .map(|cli| cli.config)
    }

    #[test]
    fn resolves_currency_case_insensitively() -> TestResult {
        let config = parse(&["--api-url", "http://localhost:3000", "--currency", "usd"])?;

        assert_eq!(config.currency()?, iso::USD);

        Ok(())
    }

    #[test]
    fn unknown_currency_is_an_error() -> TestResult {
        let config = parse(&["--api-url", "http://localhost:3000", "--currency", "XYZ"])?;

        assert!(matches!(
            config.currency(),
            Err(ConfigError::UnknownCurrency(code)) if code == "XYZ"
        ));

        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected() -> TestResult {
        let config = parse(&["--api-url", "http://localhost:3000", "--request-timeout-secs", "0"])?;

        assert!(matches!(config.request_timeout(), Err(ConfigError::ZeroTimeout)));

        Ok(())
    }

    #[test]
    fn blank_token_is_treated_as_absent() -> TestResult {
        let config = parse(&["--api-url", "http://localhost:3000", "--token", "  "])?;

        assert!(config.token().is_none());

        Ok(())
    }
}
