//! OAuth2 client-credentials support.
//!
//! The [`TokenProvider`] obtains access tokens from the authorization server
//! with the client-credentials grant (RFC 6749 §4.4) through the `oauth2`
//! crate, caches them until shortly before expiry and serializes refreshes so
//! concurrent callers never trigger more than one token request.
//!
//! # Example
//!
//! ```rust,no_run
//! use beer_client::{BeerClient, OAuth2Config, TokenProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oauth2 = OAuth2Config::client_credentials(
//!     "messaging-client",
//!     "secret",
//!     "http://localhost:9000/oauth2/token",
//! )?
//! .add_scopes(["message.read", "message.write"])
//! .build()?;
//!
//! let client = BeerClient::builder()
//!     .with_root_url("http://localhost:8080")?
//!     .with_token_provider(TokenProvider::new(oauth2)?)
//!     .build()?;
//!
//! // Token acquired automatically on first request
//! let beer = client.get_beer("some-id").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod provider;
mod token;

pub use self::config::{ClientAuthMethod, OAuth2Config, OAuth2ConfigBuilder};
pub use self::error::OAuth2Error;
pub use self::provider::TokenProvider;
pub use self::token::OAuth2Token;
