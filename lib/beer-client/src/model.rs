//! Catalog domain types.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-assigned beer identifier.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct BeerId(String);

impl BeerId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for BeerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&BeerId> for BeerId {
    fn from(value: &BeerId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for BeerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A beer of the catalog.
///
/// `id`, `created_at` and `updated_at` are assigned by the server: they are
/// `None` on records built for creation and omitted from request bodies.
/// The `price` is an exact decimal, sent and read as a JSON number without
/// going through binary floating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beer {
    /// Identifier, assigned on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BeerId>,

    /// Creation time (server local time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,

    /// Last update time (server local time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,

    /// Beer name.
    #[serde(rename = "beerName")]
    pub name: String,

    /// Categorical style, e.g. "IPA" or "Pale Ale".
    #[serde(rename = "beerStyle")]
    pub style: String,

    /// Product code.
    pub upc: String,

    /// Units in stock.
    pub quantity_on_hand: u32,

    /// Unit price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
}

impl Beer {
    /// Creates a record without server-assigned fields, ready for [`create_beer`](crate::BeerClient::create_beer).
    pub fn new(
        name: impl Into<String>,
        style: impl Into<String>,
        upc: impl Into<String>,
        quantity_on_hand: u32,
        price: Decimal,
    ) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            name: name.into(),
            style: style.into(),
            upc: upc.into(),
            quantity_on_hand,
            price,
        }
    }

    /// Returns a copy without the server-assigned fields.
    #[must_use]
    pub fn without_server_fields(&self) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

/// Partial update sent with [`patch_beer`](crate::BeerClient::patch_beer).
///
/// Only the `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct BeerPatch {
    #[serde(rename = "beerName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "beerStyle", default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub price: Option<Decimal>,
}

impl From<&Beer> for BeerPatch {
    fn from(beer: &Beer) -> Self {
        Self {
            name: Some(beer.name.clone()),
            style: Some(beer.style.clone()),
            upc: Some(beer.upc.clone()),
            quantity_on_hand: Some(beer.quantity_on_hand),
            price: Some(beer.price),
        }
    }
}

impl BeerPatch {
    /// Applies the `Some` fields onto `beer`.
    pub fn apply_to(&self, beer: &mut Beer) {
        if let Some(name) = &self.name {
            beer.name.clone_from(name);
        }
        if let Some(style) = &self.style {
            beer.style.clone_from(style);
        }
        if let Some(upc) = &self.upc {
            beer.upc.clone_from(upc);
        }
        if let Some(quantity) = self.quantity_on_hand {
            beer.quantity_on_hand = quantity;
        }
        if let Some(price) = self.price {
            beer.price = price;
        }
    }
}
