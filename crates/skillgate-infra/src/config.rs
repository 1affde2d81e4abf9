//! Gateway configuration loader.
//!
//! Reads `config.toml` and deserializes it into [`GatewayConfig`],
//! falling back to defaults when the file is missing or malformed.
//! Secrets never live in the file: the provider API key and the webhook
//! shared secret come from the environment, wrapped in
//! [`secrecy::SecretString`].

use std::path::Path;

use secrecy::SecretString;

use skillgate_types::config::GatewayConfig;
use skillgate_types::error::GatewayError;

/// Environment variable holding the KYC provider secret key.
pub const PROVIDER_KEY_VAR: &str = "SKILLGATE_PROVIDER_API_KEY";
/// Environment variable holding the webhook signing secret.
pub const WEBHOOK_SECRET_VAR: &str = "SKILLGATE_WEBHOOK_SECRET";

/// Load gateway configuration from a TOML file.
///
/// - Missing file: returns [`GatewayConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config(path: &Path) -> GatewayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return GatewayConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", path.display());
            return GatewayConfig::default();
        }
    };

    match toml::from_str::<GatewayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", path.display());
            GatewayConfig::default()
        }
    }
}

/// Secrets loaded from the environment at startup.
pub struct Secrets {
    pub provider_api_key: SecretString,
    pub webhook_secret: SecretString,
}

impl Secrets {
    /// Read both secrets from the environment.
    ///
    /// Fails fast at startup rather than on the first provider call.
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self {
            provider_api_key: read_secret(PROVIDER_KEY_VAR)?,
            webhook_secret: read_secret(WEBHOOK_SECRET_VAR)?,
        })
    }
}

fn read_secret(var: &str) -> Result<SecretString, GatewayError> {
    std::env::var(var)
        .map(SecretString::from)
        .map_err(|_| GatewayError::Internal(format!("environment variable {var} is not set")))
}
