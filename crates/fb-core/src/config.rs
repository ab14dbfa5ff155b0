use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use fb_auth::config::endpoints;
use fb_auth::{
    EmbeddingSdk, HandshakeConfig, HandshakeOrchestrator, HttpTimeouts, LaunchContext,
    ResolutionStrategy,
};
use fb_host::HostConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Environment variable overriding `auth.client_id`
pub const CLIENT_ID_ENV: &str = "FRAME_BRIDGE_CLIENT_ID";

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub auth: AuthSection,
    pub host: HostConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub client_id: String,
    /// Origin the page is served from; the exchange path is resolved against it
    pub origin: Url,
    #[serde(default = "default_exchange_path")]
    pub exchange_path: String,
    #[serde(default)]
    pub api_base: Option<Url>,
    #[serde(default)]
    pub cdn_base: Option<Url>,
    #[serde(default)]
    pub strategy: ResolutionStrategy,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_exchange_path() -> String {
    endpoints::EXCHANGE_PATH.to_string()
}

fn default_connect_timeout() -> u64 {
    HttpTimeouts::default().connect.as_secs()
}

fn default_request_timeout() -> u64 {
    HttpTimeouts::default().request.as_secs()
}

impl AppConfig {
    #[instrument(level = "debug")]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read config file")
            .map_err(|e| {
                error!("Failed to read config file {}: {}", path.display(), e);
                ConfigError::FileReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;

        let mut config: AppConfig = toml::from_str(&content)
            .context("Failed to parse config file")
            .map_err(|e| {
                error!("Failed to parse config file {}: {}", path.display(), e);
                ConfigError::ParsingFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;

        if let Ok(client_id) = std::env::var(CLIENT_ID_ENV) {
            config.override_client_id(client_id);
        }

        info!(
            strategy = ?config.auth.strategy,
            "Loaded config from {}",
            path.display()
        );
        Ok(config)
    }

    /// `config.toml` in the platform config directory
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = ProjectDirs::from("com", "frame-bridge", "frame-bridge").ok_or_else(|| {
            error!("Failed to determine project directories");
            ConfigError::ProjectDirectoriesUnavailable
        })?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Non-empty values replace the file's client id.
    pub fn override_client_id(&mut self, client_id: String) {
        if !client_id.trim().is_empty() {
            self.auth.client_id = client_id.trim().to_string();
        }
    }

    /// Handshake for this launch.
    ///
    /// An unusable auth section never stops the launch: standalone launches
    /// don't need it, embedded ones end the handshake as failed.
    pub fn orchestrator(
        &self,
        ctx: LaunchContext,
        sdk: Arc<dyn EmbeddingSdk>,
    ) -> HandshakeOrchestrator {
        if !ctx.is_embedded() {
            return HandshakeOrchestrator::unconfigured(ctx, sdk, "standalone launch");
        }

        match self.handshake_config() {
            Ok(config) => HandshakeOrchestrator::new(ctx, config, sdk),
            Err(e) => {
                warn!("Identity handshake disabled: {}", e);
                HandshakeOrchestrator::unconfigured(ctx, sdk, e.to_string())
            }
        }
    }

    pub fn handshake_config(&self) -> Result<HandshakeConfig, ConfigError> {
        let auth = &self.auth;
        if auth.client_id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }

        let mut config = HandshakeConfig::new(auth.client_id.clone(), &auth.origin)?
            .with_strategy(auth.strategy);
        config.exchange_url = auth.origin.join(&auth.exchange_path)?;
        if let Some(api_base) = &auth.api_base {
            config = config.with_api_base(api_base.clone());
        }
        if let Some(cdn_base) = &auth.cdn_base {
            config = config.with_cdn_base(cdn_base.clone());
        }
        if let Some(scopes) = &auth.scopes {
            config.scopes = scopes.clone();
        }
        config.http_timeouts = HttpTimeouts {
            connect: Duration::from_secs(auth.connect_timeout_secs),
            request: Duration::from_secs(auth.request_timeout_secs),
        };
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine project directories")]
    ProjectDirectoriesUnavailable,

    #[error("Failed to read config file at {path}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to parse config file at {path}")]
    ParsingFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("No client id configured (set auth.client_id or {CLIENT_ID_ENV})")]
    MissingClientId,

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
[auth]
client_id = "1234"
origin = "https://1234.discordsays.com"
strategy = "sdk_mediated"
api_base = "http://127.0.0.1:9000/api"
request_timeout_secs = 5

[host]
product_name = "Meow Wars"
company_name = "SuperSocialLabs"
"#;

    async fn write_config(content: &str) -> (PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(&path, content).await.unwrap();
        (path, temp_dir)
    }

    #[tokio::test]
    async fn loads_and_builds_handshake_config() {
        let (path, _temp) = write_config(FULL).await;
        let config = AppConfig::load(&path).await.unwrap();

        assert_eq!(config.host.product_name, "Meow Wars");
        assert_eq!(config.host.build_dir, "Build");
        assert_eq!(config.auth.strategy, ResolutionStrategy::SdkMediated);

        let handshake = config.handshake_config().unwrap();
        assert_eq!(
            handshake.exchange_url.as_str(),
            "https://1234.discordsays.com/.proxy/aws/Authenticate"
        );
        assert_eq!(handshake.api_base.as_str(), "http://127.0.0.1:9000/api");
        assert_eq!(handshake.cdn_base.as_str(), "https://cdn.discordapp.com/");
        assert_eq!(handshake.http_timeouts.request, Duration::from_secs(5));
        assert_eq!(handshake.http_timeouts.connect, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::load(&temp_dir.path().join("nope.toml")).await;
        assert!(matches!(result, Err(ConfigError::FileReadFailed { .. })));
    }

    #[tokio::test]
    async fn invalid_toml_is_parse_error() {
        let (path, _temp) = write_config("[auth\nclient_id = ").await;
        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::ParsingFailed { .. })));
    }

    #[tokio::test]
    async fn missing_client_id_still_yields_a_handshake() {
        let (path, _temp) = write_config(
            r#"
[auth]
origin = "https://1234.discordsays.com"

[host]
product_name = "Meow Wars"
"#,
        )
        .await;
        let config = AppConfig::load(&path).await.unwrap();
        assert!(matches!(config.handshake_config(), Err(ConfigError::MissingClientId)));

        let sdk = Arc::new(fb_auth::StaticSdk::new("code"));
        let outcome = config
            .orchestrator(fb_auth::detect("frame_id=f"), sdk.clone())
            .run()
            .await;
        assert!(matches!(
            outcome.result,
            fb_auth::HandshakeResult::Failed(fb_auth::HandshakeError::NotConfigured(_))
        ));
        assert!(sdk.authorize_calls().is_empty());
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let mut config: AppConfig = toml::from_str(FULL).unwrap();
        config.auth.client_id.clear();
        assert!(matches!(config.handshake_config(), Err(ConfigError::MissingClientId)));

        config.override_client_id("   ".to_string());
        assert!(config.auth.client_id.is_empty());
        config.override_client_id(" 999 ".to_string());
        assert_eq!(config.handshake_config().unwrap().client_id, "999");
    }
}
