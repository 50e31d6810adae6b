//! API Authentication
//!
//! Holds the service token and turns it into the `Authorization` header.
//! The token is opaque and sent as-is with the `Token` scheme.

use anyhow::{Context, Result};
use reqwest::header::HeaderValue;
use std::fmt;

/// Authorization scheme expected by the terminology service
pub const TOKEN_SCHEME: &str = "Token";

/// Number of trailing characters left visible when a token is masked
const VISIBLE_SUFFIX: usize = 4;

/// Service token; never printed in full
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    /// Build the `Authorization: Token <token>` header value
    /// Security: marked sensitive so it is left out of reqwest's debug output
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("{} {}", TOKEN_SCHEME, self.0))
            .context("API token contains characters that are not allowed in an HTTP header")?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Masked form for logs, e.g. `****da6`
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= VISIBLE_SUFFIX * 2 {
            return "****".to_string();
        }
        let suffix: String = self.0.chars().skip(len - VISIBLE_SUFFIX).collect();
        format!("****{}", suffix)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&self.masked()).finish()
    }
}
