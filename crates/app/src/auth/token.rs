//! Bearer tokens for the remote shop API.

use std::{fmt, str::FromStr};

use thiserror::Error;
use zeroize::Zeroize;

/// Optional scheme prefix accepted when parsing tokens.
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthTokenError {
    #[error("auth token is missing")]
    Missing,

    #[error("auth token format is invalid")]
    InvalidFormat,
}

/// A session bearer token issued by the auth subsystem.
///
/// The raw value is redacted from `Debug` output and wiped on drop.
#[derive(Clone)]
pub struct AuthToken {
    raw: String,
}

impl AuthToken {
    /// Parse a token, accepting an optional `Bearer ` prefix.
    pub fn parse(value: &str) -> Result<Self, AuthTokenError> {
        let value = value.trim_start();
        let value = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();

        if value.is_empty() {
            return Err(AuthTokenError::Missing);
        }

        if value.chars().any(char::is_whitespace) {
            return Err(AuthTokenError::InvalidFormat);
        }

        Ok(Self {
            raw: value.to_string(),
        })
    }

    /// Parse an optional token, treating absence and blank values alike.
    #[must_use]
    pub fn from_optional(value: Option<&str>) -> Option<Self> {
        value.and_then(|value| Self::parse(value).ok())
    }

    /// The raw token, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.raw
    }
}

impl FromStr for AuthToken {
    type Err = AuthTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.raw.zeroize();
    }
}
