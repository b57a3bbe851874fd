use crate::shared::Result;
use async_trait::async_trait;

/// TokenProvider port for bearer tokens against the management endpoint
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token valid for `https://management.azure.com/`
    ///
    /// # Errors
    /// Returns an error if no credential source can produce a token
    async fn access_token(&self) -> Result<String>;
}
