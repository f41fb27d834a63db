use http::StatusCode;

use super::oauth2::OAuth2Error;

/// Errors returned by [`BeerClient`](crate::BeerClient) operations.
///
/// The HTTP status based variants let callers decide whether to retry,
/// give up, or report to an end user; the client itself never retries.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum BeerClientError {
    /// No access token could be obtained from the authorization server.
    #[display("Authentication failure: {_0}")]
    AuthenticationFailure(OAuth2Error),

    /// Connection, timeout or body transfer failure.
    #[display("Transport error: {_0}")]
    Transport(reqwest::Error),

    /// Request URL could not be built.
    #[display("Invalid URL: {_0}")]
    Url(url::ParseError),

    /// Request body could not be encoded as JSON.
    #[display("Cannot encode request body: {_0}")]
    Serialization(serde_json::Error),

    /// Query string could not be encoded.
    #[display("Cannot encode query string: {_0}")]
    QueryEncoding(serde_urlencoded::ser::Error),

    /// The client was built with missing or invalid settings.
    #[display("Invalid client configuration: {reason}")]
    #[from(skip)]
    InvalidConfiguration {
        /// What is wrong.
        reason: String,
    },

    /// An id-taking operation got an empty id.
    #[display("Beer id must not be empty")]
    #[from(skip)]
    InvalidId,

    /// The server answered 404.
    #[display("Resource not found: {path}")]
    #[from(skip)]
    NotFound {
        /// The request path.
        path: String,
        /// The (truncated) response body.
        body: String,
    },

    /// The server rejected the request with another 4xx status.
    #[display("Client request error {status} on {path}: {body}")]
    #[from(skip)]
    ClientRequest {
        /// The response status.
        status: StatusCode,
        /// The request path.
        path: String,
        /// The (truncated) response body.
        body: String,
    },

    /// The server failed with a 5xx status.
    #[display("Server error {status} on {path}: {body}")]
    #[from(skip)]
    ServerError {
        /// The response status.
        status: StatusCode,
        /// The request path.
        path: String,
        /// The (truncated) response body.
        body: String,
    },

    /// Any other non-success status (informational or an unfollowed redirect).
    #[display("Unexpected status code {status} on {path}: {body}")]
    #[from(skip)]
    UnexpectedStatus {
        /// The response status.
        status: StatusCode,
        /// The request path.
        path: String,
        /// The (truncated) response body.
        body: String,
    },

    /// The response body does not have the expected JSON shape.
    #[display("Failed to deserialize JSON at '{location}' from {path}: {error}\n{body}")]
    #[from(skip)]
    Decode {
        /// The request path.
        path: String,
        /// Where in the document decoding failed.
        location: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The (truncated) response body.
        body: String,
    },

    /// A create succeeded without a usable `Location` header.
    #[display("Missing or invalid Location header in response to {path}")]
    #[from(skip)]
    MissingLocation {
        /// The request path.
        path: String,
    },
}

impl BeerClientError {
    /// Classifies a non-success response.
    pub(crate) fn from_status(status: StatusCode, path: String, body: String) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound { path, body }
        } else if status.is_client_error() {
            Self::ClientRequest { status, path, body }
        } else if status.is_server_error() {
            Self::ServerError { status, path, body }
        } else {
            Self::UnexpectedStatus { status, path, body }
        }
    }

    /// The response status, for errors caused by one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::ClientRequest { status, .. }
            | Self::ServerError { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Returns `true` for [`BeerClientError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
