use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Embedding platform endpoints
pub mod endpoints {
    pub const API_BASE: &str = "https://discord.com/api/v10";
    pub const CDN_BASE: &str = "https://cdn.discordapp.com";
    /// Backend proxy path, resolved against the page origin
    pub const EXCHANGE_PATH: &str = "/.proxy/aws/Authenticate";
}

/// Query key whose presence marks an embedded launch
pub const FRAME_MARKER: &str = "frame_id";

/// OAuth scopes needed to read the user, their guilds and their guild member
pub const DEFAULT_SCOPES: &[&str] = &["identify", "guilds", "guilds.members.read"];

/// How the access token is turned into an identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Bearer-token REST reads of the user, their guilds and the matched member
    #[default]
    DirectToken,

    /// SDK `authenticate` for the user, then only the member lookup
    SdkMediated,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// Configuration for the handshake clients
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// OAuth application client id
    pub client_id: String,

    /// Backend proxy that trades an authorization code for an access token
    pub exchange_url: Url,

    /// Identity provider REST base (no trailing slash needed)
    pub api_base: Url,

    /// Avatar CDN base
    pub cdn_base: Url,

    /// Scopes requested from `authorize`
    pub scopes: Vec<String>,

    /// `prompt` passed to `authorize`
    pub prompt: String,

    pub strategy: ResolutionStrategy,

    pub http_timeouts: HttpTimeouts,

    /// Custom user agent (optional)
    pub user_agent: Option<String>,
}

impl HandshakeConfig {
    /// Config for a page served from `origin`, talking to the public
    /// platform endpoints.
    pub fn new(client_id: impl Into<String>, origin: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client_id: client_id.into(),
            exchange_url: origin.join(endpoints::EXCHANGE_PATH)?,
            api_base: Url::parse(endpoints::API_BASE).expect("valid API base"),
            cdn_base: Url::parse(endpoints::CDN_BASE).expect("valid CDN base"),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            prompt: "none".to_string(),
            strategy: ResolutionStrategy::default(),
            http_timeouts: HttpTimeouts::default(),
            user_agent: Some("frame-bridge".to_string()),
        })
    }

    pub fn with_strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    pub fn with_cdn_base(mut self, cdn_base: Url) -> Self {
        self.cdn_base = cdn_base;
        self
    }

    /// REST endpoint under `api_base`, tolerant of a trailing slash on the base
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), path)
    }

    pub(crate) fn cdn_url(&self, path: &str) -> String {
        format!("{}{}", self.cdn_base.as_str().trim_end_matches('/'), path)
    }
}
