//! OAuth2 token provider for acquiring and refreshing tokens.

use std::sync::Arc;

use oauth2::basic::BasicClient;
use oauth2::{
    ClientId, ClientSecret, ErrorResponse, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use crate::client::auth;
use super::config::OAuth2Config;
use super::error::OAuth2Error;
use super::token::{OAuth2Token, TokenCache};

/// Supplies a currently valid bearer token, hiding the client-credentials exchange.
///
/// Clones share the same cache, so a single provider can back any number of
/// clients and concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use beer_client::{OAuth2Config, TokenProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuth2Config::client_credentials(
///     "messaging-client",
///     "secret",
///     "http://localhost:9000/oauth2/token",
/// )?
/// .add_scope("message.read")
/// .build()?;
///
/// let provider = TokenProvider::new(config)?;
/// let token = provider.get_token().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenProvider {
    config: Arc<OAuth2Config>,
    http: reqwest::Client,
    cache: TokenCache,
}

impl TokenProvider {
    /// Creates a provider with an empty cache.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client for the token endpoint cannot be built.
    pub fn new(config: OAuth2Config) -> Result<Self, OAuth2Error> {
        // token requests must not follow redirects
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OAuth2Error::ConfigurationError {
                reason: format!("cannot build token endpoint client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
            cache: TokenCache::new(),
        })
    }

    /// The client registration used by this provider.
    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Gets a valid token, acquiring a new one if necessary.
    ///
    /// A cached token is returned as long as it does not expire within the
    /// refresh threshold. Otherwise a single refresh runs at a time; callers
    /// waiting on it reuse its token.
    ///
    /// # Errors
    ///
    /// Fails if the token endpoint is unreachable, rejects the client, or
    /// answers with something that is not a token.
    pub async fn get_token(&self) -> Result<OAuth2Token, OAuth2Error> {
        let threshold = self.config.refresh_threshold;
        if let Some(token) = self.cache.fresh(threshold).await {
            debug!("using cached OAuth2 token");
            return Ok(token);
        }

        let _refresh = self.cache.refresh_lock().await;
        // refreshed by the previous lock holder
        if let Some(token) = self.cache.fresh(threshold).await {
            debug!("using OAuth2 token refreshed by a concurrent call");
            return Ok(token);
        }

        let token = self.acquire_token().await?;
        self.cache.set(token.clone()).await;
        Ok(token)
    }

    /// Drops the cached token so the next call acquires a new one.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    async fn acquire_token(&self) -> Result<OAuth2Token, OAuth2Error> {
        let config = &self.config;
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.as_str().to_string()))
            .set_auth_type(config.auth_method.into())
            .set_token_uri(TokenUrl::from_url(config.token_url.clone()));

        debug!(token_url = %config.token_url, scopes = ?config.scopes, "requesting OAuth2 token...");
        let response = client
            .exchange_client_credentials()
            .add_scopes(config.scopes.iter().cloned().map(Scope::new))
            .request_async(&self.http)
            .await
            .map_err(token_request_error)?;

        let lifetime = response.expires_in().unwrap_or(config.default_ttl);
        info!(client_id = %config.client_id, ?lifetime, "...OAuth2 token acquired");

        let token = OAuth2Token::with_expiry(response.access_token().secret().clone(), lifetime);
        // unusable as a header value, so never cached
        auth::bearer_header(&token)?;
        Ok(token)
    }
}

fn token_request_error<RE, T>(error: RequestTokenError<RE, T>) -> OAuth2Error
where
    RE: std::error::Error + 'static,
    T: ErrorResponse + 'static,
{
    match error {
        RequestTokenError::ServerResponse(response) => OAuth2Error::TokenAcquisitionFailed {
            reason: response.to_string(),
        },
        RequestTokenError::Request(err) => OAuth2Error::NetworkError {
            reason: err.to_string(),
        },
        RequestTokenError::Parse(err, _body) => OAuth2Error::InvalidTokenResponse {
            reason: err.to_string(),
        },
        RequestTokenError::Other(reason) => OAuth2Error::TokenAcquisitionFailed { reason },
    }
}
