//! OAuth2 configuration and builder.

use std::fmt;
use std::time::Duration;

use oauth2::AuthType;
use serde::Deserialize;
use url::Url;

use super::error::OAuth2Error;
use crate::client::SecureString;

/// Default threshold for token refresh (60 seconds before expiry).
pub(crate) const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub(crate) const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// How the client id and secret are sent to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientAuthMethod {
    /// `Authorization: Basic` header (`client_secret_basic`).
    #[default]
    Basic,
    /// Form fields in the request body (`client_secret_post`).
    RequestBody,
}

impl From<ClientAuthMethod> for AuthType {
    fn from(method: ClientAuthMethod) -> Self {
        match method {
            ClientAuthMethod::Basic => AuthType::BasicAuth,
            ClientAuthMethod::RequestBody => AuthType::RequestBody,
        }
    }
}

/// Client registration for the client-credentials grant.
///
/// Use [`OAuth2Config::client_credentials`] to create instances.
#[derive(Clone)]
pub struct OAuth2Config {
    pub(crate) client_id: String,
    pub(crate) client_secret: SecureString,
    pub(crate) token_url: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) auth_method: ClientAuthMethod,
    /// A cached token expiring within this window is refreshed.
    pub(crate) refresh_threshold: Duration,
    pub(crate) default_ttl: Duration,
}

impl OAuth2Config {
    /// Creates a builder for the client-credentials flow.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth2Error::InvalidTokenEndpoint`] if `token_url` is not an absolute URL.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        token_url: impl AsRef<str>,
    ) -> Result<OAuth2ConfigBuilder, OAuth2Error> {
        OAuth2ConfigBuilder::new(client_id, client_secret, token_url)
    }

    /// The registered client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The token endpoint.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// The requested scopes.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("auth_method", &self.auth_method)
            .field("refresh_threshold", &self.refresh_threshold)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Builder for [`OAuth2Config`].
#[derive(Clone)]
pub struct OAuth2ConfigBuilder {
    client_id: String,
    client_secret: SecureString,
    token_url: Url,
    scopes: Vec<String>,
    auth_method: ClientAuthMethod,
    refresh_threshold: Duration,
    default_ttl: Duration,
}

impl OAuth2ConfigBuilder {
    fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        token_url: impl AsRef<str>,
    ) -> Result<Self, OAuth2Error> {
        let token_url =
            Url::parse(token_url.as_ref()).map_err(|e| OAuth2Error::InvalidTokenEndpoint {
                url: token_url.as_ref().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url,
            scopes: Vec::new(),
            auth_method: ClientAuthMethod::default(),
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            default_ttl: DEFAULT_TOKEN_TTL,
        })
    }

    /// Adds a scope.
    #[must_use]
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Adds multiple scopes.
    #[must_use]
    pub fn add_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Sets how credentials are presented to the token endpoint.
    #[must_use]
    pub fn with_auth_method(mut self, auth_method: ClientAuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Sets the refresh threshold (how long before expiry to refresh).
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Sets the lifetime used when the token response has no `expires_in`.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Builds the OAuth2 configuration.
    ///
    /// # Errors
    ///
    /// Fails if the client id or secret is blank, or the token endpoint is not http(s).
    pub fn build(self) -> Result<OAuth2Config, OAuth2Error> {
        if self.client_id.trim().is_empty() {
            return Err(OAuth2Error::ConfigurationError {
                reason: "client id must not be empty".to_string(),
            });
        }
        if self.client_secret.as_str().is_empty() {
            return Err(OAuth2Error::ConfigurationError {
                reason: "client secret must not be empty".to_string(),
            });
        }
        if !matches!(self.token_url.scheme(), "http" | "https") {
            return Err(OAuth2Error::InvalidTokenEndpoint {
                url: self.token_url.to_string(),
                reason: format!("unsupported scheme '{}'", self.token_url.scheme()),
            });
        }

        Ok(OAuth2Config {
            client_id: self.client_id,
            client_secret: self.client_secret,
            token_url: self.token_url,
            scopes: self.scopes,
            auth_method: self.auth_method,
            refresh_threshold: self.refresh_threshold,
            default_ttl: self.default_ttl,
        })
    }
}

impl fmt::Debug for OAuth2ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2ConfigBuilder")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("auth_method", &self.auth_method)
            .finish()
    }
}
