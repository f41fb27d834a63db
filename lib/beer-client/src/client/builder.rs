use std::time::Duration;

use url::Url;

use super::oauth2::{OAuth2Config, TokenProvider};
use super::{BeerClient, BeerClientError};

/// Builder for [`BeerClient`].
///
/// A root URL and a token source ([`with_token_provider`](Self::with_token_provider)
/// or [`with_oauth2`](Self::with_oauth2)) are required.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use beer_client::{BeerClient, OAuth2Config, TokenProvider};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = TokenProvider::new(
///     OAuth2Config::client_credentials(
///         "messaging-client",
///         "secret",
///         "http://localhost:9000/oauth2/token",
///     )?
///     .build()?,
/// )?;
///
/// // one provider (and its token cache) backing two clients
/// let catalog = BeerClient::builder()
///     .with_root_url("http://localhost:8080")?
///     .with_token_provider(provider.clone())
///     .with_timeout(Duration::from_secs(10))
///     .build()?;
///
/// let gateway = BeerClient::builder()
///     .with_root_url("https://gateway.example.com/catalog")?
///     .with_token_provider(provider)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BeerClientBuilder {
    client: Option<reqwest::Client>,
    root_url: Option<Url>,
    tokens: Option<TokenProvider>,
    timeout: Option<Duration>,
}

impl BeerClientBuilder {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails with [`BeerClientError::InvalidConfiguration`] if the root URL or
    /// the token source is missing, or if both a preconfigured client and a
    /// timeout are set. Fails with [`BeerClientError::Transport`] if
    /// the HTTP client cannot be created.
    pub fn build(self) -> Result<BeerClient, BeerClientError> {
        let Self {
            client,
            root_url,
            tokens,
            timeout,
        } = self;

        let root_url = root_url.ok_or_else(|| BeerClientError::InvalidConfiguration {
            reason: "a root URL is required".to_string(),
        })?;
        let tokens = tokens.ok_or_else(|| BeerClientError::InvalidConfiguration {
            reason: "a token provider is required".to_string(),
        })?;

        let http = match (client, timeout) {
            (Some(_), Some(_)) => {
                return Err(BeerClientError::InvalidConfiguration {
                    reason: "a timeout cannot be applied to a preconfigured HTTP client"
                        .to_string(),
                });
            }
            (Some(client), None) => client,
            (None, Some(timeout)) => reqwest::Client::builder().timeout(timeout).build()?,
            (None, None) => reqwest::Client::builder().build()?,
        };

        Ok(BeerClient {
            http,
            root_url,
            tokens,
        })
    }

    /// Sets the catalog root URL, e.g. `http://localhost:8080`.
    ///
    /// A path in the URL is kept as a prefix of `/api/v3/beers`.
    ///
    /// # Errors
    ///
    /// Fails if the URL is not an absolute http(s) URL.
    pub fn with_root_url(mut self, root_url: impl AsRef<str>) -> Result<Self, BeerClientError> {
        let root_url = Url::parse(root_url.as_ref())?;
        if !matches!(root_url.scheme(), "http" | "https") {
            return Err(BeerClientError::InvalidConfiguration {
                reason: format!("unsupported root URL scheme '{}'", root_url.scheme()),
            });
        }
        self.root_url = Some(root_url);
        Ok(self)
    }

    /// Uses an existing token provider, sharing its token cache.
    #[must_use]
    pub fn with_token_provider(mut self, tokens: TokenProvider) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Creates a dedicated token provider from an OAuth2 registration.
    ///
    /// # Errors
    ///
    /// Fails if the provider cannot be created.
    pub fn with_oauth2(self, config: OAuth2Config) -> Result<Self, BeerClientError> {
        let tokens = TokenProvider::new(config)?;
        Ok(self.with_token_provider(tokens))
    }

    /// Uses a preconfigured `reqwest` client for catalog requests.
    ///
    /// Configure timeouts on that client: combining it with
    /// [`with_timeout`](Self::with_timeout) fails at [`build`](Self::build).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the total timeout of each catalog request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
