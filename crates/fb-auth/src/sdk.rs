use std::sync::{Arc, Mutex};

use crate::errors::SdkError;
use crate::models::{AuthenticatedUser, AuthorizeRequest};
use crate::token::{AccessToken, AuthorizationCode};

/// Capability SDK exposed by the embedding platform
///
/// Every call is an asynchronous RPC to the frame's parent and may reject.
#[async_trait::async_trait]
pub trait EmbeddingSdk: Send + Sync {
    /// Resolve once the parent frame has completed its handshake
    async fn ready(&self) -> Result<(), SdkError>;

    /// Ask the user to authorize the application, yielding a one-time code
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<AuthorizationCode, SdkError>;

    /// Hand an access token back to the platform for a verified user summary
    async fn authenticate(&self, token: &AccessToken) -> Result<AuthenticatedUser, SdkError>;

    /// Guild the activity was launched in, if any
    fn scope_id(&self) -> Option<&str>;
}

/// Canned SDK for local runs and tests
///
/// `authorize` hands out the configured code (or declines when none is set)
/// and `authenticate` returns the configured user.
#[derive(Debug, Clone, Default)]
pub struct StaticSdk {
    code: Option<String>,
    scope_id: Option<String>,
    user: Option<AuthenticatedUser>,
    ready_error: Option<SdkError>,
    authorize_calls: Arc<Mutex<Vec<AuthorizeRequest>>>,
}

impl StaticSdk {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// SDK whose user declines the authorization prompt
    pub fn declining() -> Self {
        Self::default()
    }

    pub fn in_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn failing_ready(mut self, error: SdkError) -> Self {
        self.ready_error = Some(error);
        self
    }

    /// Requests received by `authorize`, oldest first
    pub fn authorize_calls(&self) -> Vec<AuthorizeRequest> {
        self.authorize_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl EmbeddingSdk for StaticSdk {
    async fn ready(&self) -> Result<(), SdkError> {
        match &self.ready_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn authorize(&self, request: &AuthorizeRequest) -> Result<AuthorizationCode, SdkError> {
        if let Ok(mut calls) = self.authorize_calls.lock() {
            calls.push(request.clone());
        }
        self.code
            .as_ref()
            .map(AuthorizationCode::new)
            .ok_or_else(|| SdkError::Denied("authorization prompt dismissed".to_string()))
    }

    async fn authenticate(&self, _token: &AccessToken) -> Result<AuthenticatedUser, SdkError> {
        self.user
            .clone()
            .ok_or_else(|| SdkError::Rpc("authenticate rejected the token".to_string()))
    }

    fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }
}
