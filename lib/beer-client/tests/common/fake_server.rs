#![allow(clippy::expect_used, missing_docs)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use beer_client::{Beer, BeerId, BeerPatch};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub const CLIENT_ID: &str = "messaging-client";
pub const CLIENT_SECRET: &str = "secret";

/// Id answered with a 500 by the catalog.
pub const FAILING_ID: &str = "failing-beer";

/// Behavior knobs of the fake servers.
#[derive(Debug, Clone)]
pub struct FakeOptions {
    /// Delay before the token endpoint answers.
    pub token_delay: Duration,
    /// Status returned by the token endpoint instead of a token.
    pub token_rejection: Option<StatusCode>,
    /// `expires_in` of issued tokens, omitted when `None`.
    pub token_expires_in: Option<u64>,
    /// Answer creates without a `Location` header.
    pub omit_location: bool,
    /// Answer creates with a `Location` pointing at [`FAILING_ID`].
    pub failing_location: bool,
    /// Issue this access token value instead of `token-{n}`.
    pub access_token: Option<String>,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            token_delay: Duration::ZERO,
            token_rejection: None,
            token_expires_in: Some(300),
            omit_location: false,
            failing_location: false,
            access_token: None,
        }
    }
}

/// Shared state of the fake catalog and token endpoint.
#[derive(Debug, Clone)]
pub struct FakeState {
    options: FakeOptions,
    beers: Arc<Mutex<Vec<Beer>>>,
    issued_tokens: Arc<Mutex<HashSet<String>>>,
    token_requests: Arc<AtomicUsize>,
    token_auth_methods: Arc<Mutex<Vec<String>>>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

impl FakeState {
    pub fn seeded(options: FakeOptions) -> Self {
        let beers = vec![
            seed_beer("Galaxy Cat", "Pale Ale", "12356", 122, Decimal::new(1299, 2)),
            seed_beer("Crank", "Pale Ale", "12356222", 392, Decimal::new(1399, 2)),
            seed_beer("Sunshine City", "IPA", "8380495518", 144, Decimal::new(1399, 2)),
        ];

        Self {
            options,
            beers: Arc::new(Mutex::new(beers)),
            issued_tokens: Arc::default(),
            token_requests: Arc::default(),
            token_auth_methods: Arc::default(),
            last_authorization: Arc::default(),
        }
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// `"basic"` or `"body"` for each token request.
    pub fn token_auth_methods(&self) -> Vec<String> {
        self.token_auth_methods.lock().expect("lock").clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().expect("lock").clone()
    }

    pub fn beers(&self) -> Vec<Beer> {
        self.beers.lock().expect("lock").clone()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        *self.last_authorization.lock().expect("lock") = authorization.clone();

        let token = authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if self.issued_tokens.lock().expect("lock").contains(token) {
            Ok(())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }

    fn find(&self, id: &str) -> Option<Beer> {
        self.beers
            .lock()
            .expect("lock")
            .iter()
            .find(|beer| beer.id.as_ref().is_some_and(|it| it.as_str() == id))
            .cloned()
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut Beer)) -> bool {
        let mut beers = self.beers.lock().expect("lock");
        let Some(beer) = beers
            .iter_mut()
            .find(|beer| beer.id.as_ref().is_some_and(|it| it.as_str() == id))
        else {
            return false;
        };
        change(beer);
        beer.updated_at = Some(now());
        true
    }
}

fn seed_beer(name: &str, style: &str, upc: &str, quantity: u32, price: Decimal) -> Beer {
    let mut beer = Beer::new(name, style, upc, quantity, price);
    beer.id = Some(BeerId::new(uuid::Uuid::new_v4().to_string()));
    beer.created_at = Some(now());
    beer.updated_at = beer.created_at;
    beer
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn router(state: FakeState) -> Router {
    Router::new()
        .route("/oauth2/token", post(issue_token))
        .route("/api/v3/beers", get(list_beers).post(create_beer))
        .route(
            "/api/v3/beers/{id}",
            get(get_beer)
                .put(update_beer)
                .patch(patch_beer)
                .delete(delete_beer),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TokenForm {
    grant_type: String,
    scope: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

async fn issue_token(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    let count = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    debug!(count, scope = ?form.scope, "token requested");

    if !state.options.token_delay.is_zero() {
        tokio::time::sleep(state.options.token_delay).await;
    }
    if let Some(status) = state.options.token_rejection {
        return (status, Json(json!({"error": "invalid_client"}))).into_response();
    }
    if form.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response();
    }

    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));
    let in_body = form.client_id.as_deref() == Some(CLIENT_ID)
        && form.client_secret.as_deref() == Some(CLIENT_SECRET);
    let method = match (basic, in_body) {
        (true, _) => "basic",
        (false, true) => "body",
        (false, false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid_client"})),
            )
                .into_response();
        }
    };
    state
        .token_auth_methods
        .lock()
        .expect("lock")
        .push(method.to_string());

    let access_token = state
        .options
        .access_token
        .clone()
        .unwrap_or_else(|| format!("token-{count}"));
    state
        .issued_tokens
        .lock()
        .expect("lock")
        .insert(access_token.clone());

    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
    });
    if let Some(scope) = form.scope {
        body["scope"] = json!(scope);
    }
    if let Some(expires_in) = state.options.token_expires_in {
        body["expires_in"] = json!(expires_in);
    }
    Json(body).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeerFilter {
    beer_name: Option<String>,
    beer_style: Option<String>,
}

async fn list_beers(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Query(filter): Query<BeerFilter>,
) -> Result<Json<Vec<Beer>>, StatusCode> {
    state.authorize(&headers)?;

    let beers = state
        .beers()
        .into_iter()
        .filter(|beer| filter.beer_name.as_ref().is_none_or(|name| &beer.name == name))
        .filter(|beer| {
            filter
                .beer_style
                .as_ref()
                .is_none_or(|style| &beer.style == style)
        })
        .collect();
    Ok(Json(beers))
}

async fn create_beer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(beer): Json<Beer>,
) -> Result<Response, StatusCode> {
    state.authorize(&headers)?;
    if beer.id.is_some() || beer.name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let mut stored = beer;
    stored.id = Some(BeerId::new(id.clone()));
    stored.created_at = Some(now());
    stored.updated_at = stored.created_at;
    state.beers.lock().expect("lock").push(stored);

    if state.options.omit_location {
        return Ok(StatusCode::CREATED.into_response());
    }
    let location = if state.options.failing_location {
        format!("/api/v3/beers/{FAILING_ID}")
    } else {
        format!("/api/v3/beers/{id}")
    };
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

async fn get_beer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Beer>, Response> {
    state
        .authorize(&headers)
        .map_err(IntoResponse::into_response)?;
    if id == FAILING_ID {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "boom"})),
        )
            .into_response());
    }
    state
        .find(&id)
        .map(Json)
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())
}

async fn update_beer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(beer): Json<Beer>,
) -> StatusCode {
    if let Err(status) = state.authorize(&headers) {
        return status;
    }
    let updated = state.update(&id, |stored| {
        stored.name = beer.name;
        stored.style = beer.style;
        stored.upc = beer.upc;
        stored.quantity_on_hand = beer.quantity_on_hand;
        stored.price = beer.price;
    });
    if updated {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn patch_beer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<BeerPatch>,
) -> StatusCode {
    if let Err(status) = state.authorize(&headers) {
        return status;
    }
    if state.update(&id, |stored| patch.apply_to(stored)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn delete_beer(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    if let Err(status) = state.authorize(&headers) {
        return status;
    }
    let mut beers = state.beers.lock().expect("lock");
    let before = beers.len();
    beers.retain(|beer| beer.id.as_ref().is_none_or(|it| it.as_str() != id));
    if beers.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
