//! # Beer Client
//!
//! Typed async client for the beer catalog REST API (`/api/v3/beers`),
//! authenticated with the OAuth2 client-credentials grant.
//!
//! - **[`BeerClient`]** - CRUD and query operations over the catalog
//! - **[`TokenProvider`]** - Access token acquisition, caching and refresh
//! - **[`BeerClientConfig`]** - Settings loaded from YAML or the environment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beer_client::{BeerClient, BeerClientConfig, BeerPatch};
//! use futures::TryStreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BeerClientConfig::from_yaml_file("beer-client.yml")?;
//! let client = BeerClient::from_config(&config)?;
//!
//! // Collections are streams
//! let cranks = client.list_beers_by_name("Crank").try_collect::<Vec<_>>().await?;
//!
//! // Mutations return the stored record
//! if let Some(id) = cranks.first().and_then(|beer| beer.id.clone()) {
//!     let patch = BeerPatch {
//!         quantity_on_hand: Some(12),
//!         ..BeerPatch::default()
//!     };
//!     let updated = client.patch_beer(&id, &patch).await?;
//!     assert_eq!(updated.quantity_on_hand, 12);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns a [`BeerClientError`]. Token failures surface as
//! [`BeerClientError::AuthenticationFailure`], HTTP statuses as
//! [`NotFound`](BeerClientError::NotFound), [`ClientRequest`](BeerClientError::ClientRequest)
//! or [`ServerError`](BeerClientError::ServerError). The client never retries.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (requests at `debug`, token acquisition
//! at `info`, failed catalog responses at `warn`) and never installs a
//! subscriber. Secrets and tokens are never logged.

mod client;
mod config;
pub mod model;

pub use self::client::oauth2;
pub use self::client::{
    BeerClient, BeerClientBuilder, BeerClientError, BeerStream, ClientAuthMethod, OAuth2Config,
    OAuth2ConfigBuilder, OAuth2Error, OAuth2Token, SecureString, TokenProvider,
};
pub use self::config::{BeerClientConfig, ConfigError, OAuth2Settings};
pub use self::model::{Beer, BeerId, BeerPatch};
