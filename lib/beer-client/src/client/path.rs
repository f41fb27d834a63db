use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use url::Url;

use super::BeerClientError;
use crate::model::BeerId;

/// Collection resource.
pub(crate) const BEER_PATH: &str = "/api/v3/beers";

/// Single record resource.
pub(crate) const BEER_ID_PATH: &str = "/api/v3/beers/{id}";

/// Characters escaped in a path segment (RFC 3986 `pchar` complement).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Substitutes `{id}` in a path template with the percent-encoded id.
pub(crate) fn resolve_id(template: &str, id: &BeerId) -> String {
    let encoded = utf8_percent_encode(id.as_str(), PATH_SEGMENT).to_string();
    template.replace("{id}", &encoded)
}

/// Server-side filters of the collection resource.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BeerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) beer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) beer_style: Option<String>,
}

impl BeerQuery {
    fn is_empty(&self) -> bool {
        self.beer_name.is_none() && self.beer_style.is_none()
    }
}

/// Joins `path` onto the root URL, keeping any path prefix of the root.
pub(crate) fn build_url(
    root_url: &Url,
    path: &str,
    query: &BeerQuery,
) -> Result<Url, BeerClientError> {
    let url = format!(
        "{}/{}",
        root_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = url.parse::<Url>()?;

    if !query.is_empty() {
        let query_string = serde_urlencoded::to_string(query)?;
        url.set_query(Some(&query_string));
    }

    Ok(url)
}

/// Extracts the new record id from a `Location` header value: the last
/// non-empty path segment, percent-decoded.
pub(crate) fn id_from_location(location: &str) -> Option<BeerId> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    Some(BeerId::new(decoded))
}
