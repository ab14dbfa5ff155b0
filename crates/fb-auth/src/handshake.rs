use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::TokenExchangeClient;
use crate::config::HandshakeConfig;
use crate::detect::LaunchContext;
use crate::errors::{HandshakeError, Result};
use crate::identity::{IdentityRecord, IdentityResolver};
use crate::models::AuthorizeRequest;
use crate::sdk::EmbeddingSdk;
use crate::token::AccessToken;

/// Outcome of one handshake attempt
#[derive(Debug)]
pub enum HandshakeResult {
    Authenticated(IdentityRecord),
    /// Standalone launch, or the user declined authorization
    Unauthenticated,
    Failed(HandshakeError),
}

impl HandshakeResult {
    pub fn identity(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Authenticated(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<HandshakeError> for HandshakeResult {
    fn from(error: HandshakeError) -> Self {
        if error.is_user_decline() {
            Self::Unauthenticated
        } else {
            Self::Failed(error)
        }
    }
}

/// One state per suspension point of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Start,
    DetectingEnvironment,
    NotEmbedded,
    Idle,
    Embedded,
    AwaitingAuthorization,
    ExchangingToken,
    ResolvingIdentity,
    Done,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result plus the states visited to produce it
#[derive(Debug)]
pub struct HandshakeOutcome {
    pub result: HandshakeResult,
    pub trail: Vec<HandshakeState>,
}

/// Drives detect -> authorize -> exchange -> resolve.
///
/// Never returns an error: every failure ends in `Done` with a degraded
/// result so the runtime host can start regardless. `run` consumes the
/// orchestrator, so a handshake can't be re-entered.
pub struct HandshakeOrchestrator {
    ctx: LaunchContext,
    config: Option<HandshakeConfig>,
    sdk: Arc<dyn EmbeddingSdk>,
    state: HandshakeState,
    /// Why `config` is missing
    unconfigured: Option<String>,
    trail: Vec<HandshakeState>,
}

impl HandshakeOrchestrator {
    pub fn new(ctx: LaunchContext, config: HandshakeConfig, sdk: Arc<dyn EmbeddingSdk>) -> Self {
        Self {
            ctx,
            config: Some(config),
            sdk,
            state: HandshakeState::Start,
            unconfigured: None,
            trail: vec![HandshakeState::Start],
        }
    }

    /// Orchestrator for a deployment whose handshake config is unusable.
    ///
    /// Standalone launches are unaffected. Embedded launches end in
    /// `Failed(NotConfigured)` without calling the SDK or the network.
    pub fn unconfigured(
        ctx: LaunchContext,
        sdk: Arc<dyn EmbeddingSdk>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            config: None,
            sdk,
            state: HandshakeState::Start,
            unconfigured: Some(reason.into()),
            trail: vec![HandshakeState::Start],
        }
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!(from = %self.state, to = %next, "Handshake transition");
        self.state = next;
        self.trail.push(next);
    }

    #[instrument(skip(self), fields(embedded = self.ctx.is_embedded()))]
    pub async fn run(mut self) -> HandshakeOutcome {
        self.transition(HandshakeState::DetectingEnvironment);

        let result = if self.ctx.is_embedded() {
            self.transition(HandshakeState::Embedded);
            match self.authenticate().await {
                Ok(record) => HandshakeResult::Authenticated(record),
                Err(e) => {
                    warn!(state = %self.state, "Handshake failed, continuing without identity: {}", e);
                    HandshakeResult::from(e)
                }
            }
        } else {
            info!("Standalone launch, skipping handshake");
            self.transition(HandshakeState::NotEmbedded);
            self.transition(HandshakeState::Idle);
            return self.finish(HandshakeResult::Unauthenticated);
        };

        self.transition(HandshakeState::Done);
        self.finish(result)
    }

    fn finish(self, result: HandshakeResult) -> HandshakeOutcome {
        info!(
            authenticated = result.is_authenticated(),
            state = %self.state,
            "Handshake finished"
        );
        HandshakeOutcome {
            result,
            trail: self.trail,
        }
    }

    async fn authenticate(&mut self) -> Result<IdentityRecord> {
        let Some(config) = self.config.clone() else {
            let reason = self.unconfigured.take().unwrap_or_default();
            return Err(HandshakeError::NotConfigured(reason));
        };

        self.transition(HandshakeState::AwaitingAuthorization);
        self.sdk
            .ready()
            .await
            .map_err(HandshakeError::AuthorizationDenied)?;
        let code = self
            .sdk
            .authorize(&authorize_request(&config))
            .await
            .map_err(HandshakeError::AuthorizationDenied)?;

        self.transition(HandshakeState::ExchangingToken);
        let token: AccessToken = TokenExchangeClient::new(&config)?.exchange(code).await?;

        self.transition(HandshakeState::ResolvingIdentity);
        let resolver = IdentityResolver::new(config)?;
        resolver.resolve(&token, self.sdk.as_ref()).await
    }
}

fn authorize_request(config: &HandshakeConfig) -> AuthorizeRequest {
    AuthorizeRequest {
        client_id: config.client_id.clone(),
        response_type: "code".to_string(),
        state: String::new(),
        prompt: config.prompt.clone(),
        scope: config.scopes.clone(),
    }
}
