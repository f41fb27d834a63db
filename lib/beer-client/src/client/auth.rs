use std::fmt;

use headers::Authorization;
use headers::authorization::Bearer;
use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::oauth2::{OAuth2Error, OAuth2Token};

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for the OAuth2 client secret. `Debug` is redacted and `Display` masks
/// all but the edges of long values.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// The returned reference should not be stored for extended periods.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            let head = value.chars().take(4).collect::<String>();
            let tail = value.chars().rev().take(4).collect::<Vec<_>>();
            let tail = tail.into_iter().rev().collect::<String>();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Builds the `Authorization: Bearer` header for a token.
pub(crate) fn bearer_header(token: &OAuth2Token) -> Result<Authorization<Bearer>, OAuth2Error> {
    Authorization::bearer(token.access_token()).map_err(|err| {
        OAuth2Error::InvalidTokenResponse {
            reason: format!("access token is not a valid bearer credential: {err}"),
        }
    })
}
