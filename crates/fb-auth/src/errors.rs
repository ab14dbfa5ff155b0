use thiserror::Error;

/// Handshake failure taxonomy
///
/// Environment detection is pure and has no variant here. Every variant is
/// caught at the orchestrator boundary and folded into a `HandshakeResult`.
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// Embedded launch without a usable handshake configuration
    #[error("Handshake not configured: {0}")]
    NotConfigured(String),

    #[error("Authorization denied by the embedding platform: {0}")]
    AuthorizationDenied(#[source] SdkError),

    #[error("Token exchange failed: {0}")]
    ExchangeFailed(#[source] TransportError),

    #[error("Identity resolution failed: {0}")]
    ResolutionFailed(#[source] ResolutionError),
}

impl HandshakeError {
    /// True when the user (or host) explicitly declined, as opposed to a
    /// transport or protocol failure.
    pub fn is_user_decline(&self) -> bool {
        matches!(self, Self::AuthorizationDenied(SdkError::Denied(_)))
    }
}

/// Low-level transport and protocol errors from the backend proxy or the
/// identity provider. Only surfaced to callers wrapped in a `HandshakeError`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("JSON serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    pub(crate) fn http(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Http {
            status,
            body_snippet: body.chars().take(200).collect(),
        }
    }
}

/// Identity lookup failures: either the REST reads or the SDK's native
/// `authenticate` call.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("SDK authenticate rejected: {0}")]
    Sdk(#[from] SdkError),
}

/// Errors reported by the embedding platform's SDK RPCs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("user declined: {0}")]
    Denied(String),

    #[error("RPC rejected: {0}")]
    Rpc(String),
}

pub type Result<T> = std::result::Result<T, HandshakeError>;
