//! Access-token provisioning seam.
//!
//! The Calendar client only needs a bearer token per request. How that
//! token is minted (service-account JWT exchange, metadata server, a
//! sidecar) is an external concern, so the seam is a trait and tests inject
//! fakes through it.

use crate::error::SourceResult;
use crate::source::BoxFuture;

/// Supplies bearer tokens for Calendar API requests.
pub trait TokenSource: Send + Sync {
    /// Returns a currently valid access token.
    fn access_token(&self) -> BoxFuture<'_, SourceResult<String>>;
}

/// A token source that hands out one fixed token.
///
/// Suitable when token minting happens outside the process (and for tests).
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Creates a static token source.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenSource for StaticTokenSource {
    fn access_token(&self) -> BoxFuture<'_, SourceResult<String>> {
        let token = self.token.clone();
        Box::pin(async move { Ok(token) })
    }
}
