use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use headers::{ContentType, HeaderMapExt};
use http::{HeaderValue, Method, header};
use reqwest::{Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::model::{Beer, BeerId, BeerPatch};

mod auth;
pub use self::auth::SecureString;

mod builder;
pub use self::builder::BeerClientBuilder;

mod error;
pub use self::error::BeerClientError;

pub mod oauth2;
pub use self::oauth2::{
    ClientAuthMethod, OAuth2Config, OAuth2ConfigBuilder, OAuth2Error, OAuth2Token, TokenProvider,
};

mod path;
use self::path::{BEER_ID_PATH, BEER_PATH, BeerQuery, build_url, id_from_location, resolve_id};

const BODY_MAX_LENGTH: usize = 1024;

/// Stream of collection items.
///
/// Lazy: nothing is sent before the first poll. The stream ends after the
/// last item, or after a single `Err` item.
pub type BeerStream<T = Beer> = BoxStream<'static, Result<T, BeerClientError>>;

/// Client of the beer catalog API (`/api/v3/beers`).
///
/// Every call obtains a bearer token from the [`TokenProvider`] before
/// talking to the catalog. Clones share the connection pool and the token
/// cache. Use [`BeerClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use beer_client::{Beer, BeerClient, OAuth2Config};
/// use futures::TryStreamExt;
/// use rust_decimal::Decimal;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let oauth2 = OAuth2Config::client_credentials(
///     "messaging-client",
///     "secret",
///     "http://localhost:9000/oauth2/token",
/// )?
/// .add_scopes(["message.read", "message.write"])
/// .build()?;
///
/// let client = BeerClient::builder()
///     .with_root_url("http://localhost:8080")?
///     .with_oauth2(oauth2)?
///     .build()?;
///
/// let created = client
///     .create_beer(&Beer::new("Space Dust", "IPA", "123321", 44, Decimal::new(1099, 2)))
///     .await?;
///
/// let pale_ales: Vec<Beer> = client.list_beers_by_style("Pale Ale").try_collect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BeerClient {
    http: reqwest::Client,
    root_url: Url,
    tokens: TokenProvider,
}

impl BeerClient {
    /// Creates a builder.
    pub fn builder() -> BeerClientBuilder {
        BeerClientBuilder::default()
    }

    /// The catalog root URL.
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// The token provider backing this client.
    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Lists every beer of the catalog.
    pub fn list_beers(&self) -> BeerStream {
        self.list(BeerQuery::default())
    }

    /// Lists every beer, returning the raw response body.
    ///
    /// # Errors
    ///
    /// Fails on token, transport or status errors.
    pub async fn list_beers_as_text(&self) -> Result<String, BeerClientError> {
        let url = build_url(&self.root_url, BEER_PATH, &BeerQuery::default())?;
        let response = self.send(Method::GET, url, None).await?;
        let text = response.text().await?;
        Ok(text)
    }

    /// Lists every beer as untyped JSON objects.
    pub fn list_beers_as_map(&self) -> BeerStream<Map<String, Value>> {
        self.list(BeerQuery::default())
    }

    /// Lists every beer as JSON trees.
    pub fn list_beers_as_json(&self) -> BeerStream<Value> {
        self.list(BeerQuery::default())
    }

    /// Lists the beers the server matches with `name`.
    pub fn list_beers_by_name(&self, name: impl Into<String>) -> BeerStream {
        self.list(BeerQuery {
            beer_name: Some(name.into()),
            ..BeerQuery::default()
        })
    }

    /// Lists the beers the server matches with `style`.
    pub fn list_beers_by_style(&self, style: impl Into<String>) -> BeerStream {
        self.list(BeerQuery {
            beer_style: Some(style.into()),
            ..BeerQuery::default()
        })
    }

    /// Gets a beer by id.
    ///
    /// # Errors
    ///
    /// [`BeerClientError::NotFound`] if no such beer exists, [`BeerClientError::InvalidId`]
    /// for a blank id, otherwise token, transport, status or decoding errors.
    pub async fn get_beer(&self, id: impl Into<BeerId>) -> Result<Beer, BeerClientError> {
        let id = ensure_id(id)?;
        let path = resolve_id(BEER_ID_PATH, &id);
        let url = build_url(&self.root_url, &path, &BeerQuery::default())?;
        let response = self.send(Method::GET, url, None).await?;
        decode_json(&path, response).await
    }

    /// Creates a beer and returns the stored record.
    ///
    /// The server-assigned fields of `beer` are not sent. The new id is read
    /// from the `Location` header of the response, then the record is fetched.
    ///
    /// # Errors
    ///
    /// [`BeerClientError::MissingLocation`] if the response has no usable
    /// `Location`, or any error of the create or of the follow-up fetch.
    pub async fn create_beer(&self, beer: &Beer) -> Result<Beer, BeerClientError> {
        let response = self
            .send_json(Method::POST, BEER_PATH, &beer.without_server_fields())
            .await?;

        let id = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(id_from_location)
            .ok_or_else(|| BeerClientError::MissingLocation {
                path: BEER_PATH.to_string(),
            })?;
        debug!(%id, "beer created");

        self.get_beer(id).await
    }

    /// Replaces the beer `id` with `beer` and returns the stored record.
    ///
    /// `id` is authoritative; `beer.id` is sent as is and need not match.
    ///
    /// # Errors
    ///
    /// Any error of the update or of the follow-up fetch.
    pub async fn update_beer(
        &self,
        id: impl Into<BeerId>,
        beer: &Beer,
    ) -> Result<Beer, BeerClientError> {
        let id = ensure_id(id)?;
        let path = resolve_id(BEER_ID_PATH, &id);
        self.send_json(Method::PUT, &path, beer).await?;
        self.get_beer(id).await
    }

    /// Applies the `Some` fields of `patch` to the beer `id` and returns the stored record.
    ///
    /// # Errors
    ///
    /// Any error of the patch or of the follow-up fetch.
    pub async fn patch_beer(
        &self,
        id: impl Into<BeerId>,
        patch: &BeerPatch,
    ) -> Result<Beer, BeerClientError> {
        let id = ensure_id(id)?;
        let path = resolve_id(BEER_ID_PATH, &id);
        self.send_json(Method::PATCH, &path, patch).await?;
        self.get_beer(id).await
    }

    /// Deletes a beer.
    ///
    /// # Errors
    ///
    /// [`BeerClientError::NotFound`] if no such beer exists, otherwise token,
    /// transport or status errors.
    pub async fn delete_beer(&self, id: impl Into<BeerId>) -> Result<(), BeerClientError> {
        let id = ensure_id(id)?;
        let path = resolve_id(BEER_ID_PATH, &id);
        let url = build_url(&self.root_url, &path, &BeerQuery::default())?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    fn list<T>(&self, query: BeerQuery) -> BeerStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        stream::once(async move { client.fetch_all::<T>(query).await })
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, BeerClientError>)))
            .try_flatten()
            .boxed()
    }

    async fn fetch_all<T>(&self, query: BeerQuery) -> Result<Vec<T>, BeerClientError>
    where
        T: DeserializeOwned,
    {
        let url = build_url(&self.root_url, BEER_PATH, &query)?;
        let response = self.send(Method::GET, url, None).await?;
        decode_json(BEER_PATH, response).await
    }

    async fn send_json<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, BeerClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        let url = build_url(&self.root_url, path, &BeerQuery::default())?;
        self.send(method, url, Some(body)).await
    }

    /// Sends an authenticated request, turning non-success statuses into errors.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Response, BeerClientError> {
        let token = self.tokens.get_token().await?;
        let path = url.path().to_string();

        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.typed_insert(auth::bearer_header(&token)?);
        if let Some(authorization) = headers.get_mut(header::AUTHORIZATION) {
            authorization.set_sensitive(true);
        }
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            headers.typed_insert(ContentType::json());
            *request.body_mut() = Some(body.into());
        }

        debug!(method = %request.method(), url = %request.url(), "sending...");
        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!(%status, "...receiving");

        if status.is_success() {
            return Ok(response);
        }

        // Get the body only if status code is unexpected
        let body = response
            .text()
            .await
            .map(truncate_body)
            .unwrap_or_else(|e| format!("<unable to read response body: {e}>"));
        warn!(%status, %path, "catalog request failed");
        Err(BeerClientError::from_status(status, path, body))
    }
}

fn ensure_id(id: impl Into<BeerId>) -> Result<BeerId, BeerClientError> {
    let id = id.into();
    if id.is_blank() {
        return Err(BeerClientError::InvalidId);
    }
    Ok(id)
}

async fn decode_json<T>(path: &str, response: Response) -> Result<T, BeerClientError>
where
    T: DeserializeOwned,
{
    let json = response.text().await?;
    decode(path, &json)
}

fn decode<T>(path: &str, json: &str) -> Result<T, BeerClientError>
where
    T: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer).map_err(|err| BeerClientError::Decode {
        path: path.to_string(),
        location: err.path().to_string(),
        error: err.into_inner(),
        body: truncate_body(json.to_string()),
    })
}

fn truncate_body(mut text: String) -> String {
    if text.len() <= BODY_MAX_LENGTH {
        return text;
    }
    let mut end = BODY_MAX_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str("... (truncated)");
    text
}
