//! OAuth2 token types and caching.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard, RwLock};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An OAuth2 access token with expiration tracking.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct OAuth2Token {
    access_token: String,
    #[zeroize(skip)]
    expires_at: Option<Instant>,
}

impl OAuth2Token {
    /// Creates a token without a known expiry.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Creates a token expiring `expires_in` from now.
    ///
    /// A lifetime too large to be represented is treated as no expiry.
    pub fn with_expiry(access_token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Instant::now().checked_add(expires_in),
        }
    }

    /// Returns the bearer value.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Checks if the token is expired.
    ///
    /// Returns `false` if the token has no expiration time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }

    /// Returns `true` if the token expires within the given threshold.
    ///
    /// A threshold reaching past the representable time range always asks for a refresh.
    pub fn should_refresh(&self, threshold: Duration) -> bool {
        self.expires_at.is_some_and(|exp| {
            Instant::now()
                .checked_add(threshold)
                .is_none_or(|limit| limit >= exp)
        })
    }

    /// Returns the time until expiration, if known.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.and_then(|exp| {
            let now = Instant::now();
            if now >= exp { None } else { Some(exp - now) }
        })
    }
}

impl fmt::Debug for OAuth2Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Token")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Shared cache for the current token.
///
/// Readers only take the read lock. Refreshes are serialized through
/// [`TokenCache::refresh_lock`]: the holder must re-check the cache before
/// hitting the token endpoint, so callers queued behind an in-flight refresh
/// reuse its result.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    current: Arc<RwLock<Option<OAuth2Token>>>,
    refresh: Arc<Mutex<()>>,
}

impl TokenCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token unless it is missing or within `threshold` of expiry.
    pub(crate) async fn fresh(&self, threshold: Duration) -> Option<OAuth2Token> {
        let guard = self.current.read().await;
        guard
            .as_ref()
            .filter(|token| !token.is_expired() && !token.should_refresh(threshold))
            .cloned()
    }

    pub(crate) async fn set(&self, token: OAuth2Token) {
        let mut guard = self.current.write().await;
        *guard = Some(token);
    }

    pub(crate) async fn clear(&self) {
        let mut guard = self.current.write().await;
        *guard = None;
    }

    pub(crate) async fn refresh_lock(&self) -> MutexGuard<'_, ()> {
        self.refresh.lock().await
    }
}
