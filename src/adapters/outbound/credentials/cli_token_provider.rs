use crate::ports::outbound::TokenProvider;
use crate::shared::error::AuditError;
use crate::shared::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

/// Environment variable holding a pre-issued bearer token
pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";
const RESOURCE: &str = "https://management.azure.com/";

/// CliTokenProvider adapter
///
/// Uses `AZURE_ACCESS_TOKEN` when set, otherwise asks the `az` CLI once and
/// caches the token for the rest of the run.
pub struct CliTokenProvider {
    env_token: Option<String>,
    cached: OnceCell<String>,
}

impl CliTokenProvider {
    pub fn from_env() -> Self {
        Self::with_token(std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    pub fn with_token(token: Option<String>) -> Self {
        Self {
            env_token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            cached: OnceCell::new(),
        }
    }

    async fn token_from_cli() -> Result<String> {
        debug!("requesting access token from az cli");
        let output = tokio::process::Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                RESOURCE,
                "--query",
                "accessToken",
                "-o",
                "tsv",
            ])
            .output()
            .await
            .map_err(|e| AuditError::CredentialUnavailable {
                details: format!("failed to run az: {}", e),
            })?;

        if !output.status.success() {
            return Err(AuditError::CredentialUnavailable {
                details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuditError::CredentialUnavailable {
                details: "az returned an empty token".to_string(),
            }
            .into());
        }
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for CliTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = &self.env_token {
            return Ok(token.clone());
        }
        let token = self.cached.get_or_try_init(Self::token_from_cli).await?;
        Ok(token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_token_is_used() {
        let provider = CliTokenProvider::with_token(Some("  abc  ".to_string()));
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let provider = CliTokenProvider::with_token(Some("   ".to_string()));
        assert!(provider.env_token.is_none());
    }
}
