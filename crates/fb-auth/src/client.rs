use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::HandshakeConfig;
use crate::errors::{HandshakeError, Result, TransportError};
use crate::models::*;
use crate::token::{AccessToken, AuthorizationCode};

fn build_http(config: &HandshakeConfig) -> std::result::Result<Client, TransportError> {
    Ok(Client::builder()
        .connect_timeout(config.http_timeouts.connect)
        .timeout(config.http_timeouts.request)
        .user_agent(config.user_agent.as_deref().unwrap_or("frame-bridge"))
        .build()?)
}

/// Trades an authorization code for an access token through the backend proxy
#[derive(Debug, Clone)]
pub struct TokenExchangeClient {
    exchange_url: Url,
    http: Client,
}

impl TokenExchangeClient {
    pub fn new(config: &HandshakeConfig) -> Result<Self> {
        let http = build_http(config).map_err(HandshakeError::ExchangeFailed)?;
        Ok(Self {
            exchange_url: config.exchange_url.clone(),
            http,
        })
    }

    /// Exchange a fresh authorization code for an access token.
    ///
    /// Replay protection is the proxy's job; this only rejects an empty code.
    /// No retries.
    #[instrument(skip(self, code), fields(url = %self.exchange_url))]
    pub async fn exchange(&self, code: AuthorizationCode) -> Result<AccessToken> {
        self.try_exchange(code)
            .await
            .map_err(HandshakeError::ExchangeFailed)
    }

    async fn try_exchange(
        &self,
        code: AuthorizationCode,
    ) -> std::result::Result<AccessToken, TransportError> {
        if code.is_empty() {
            return Err(TransportError::InvalidResponse(
                "authorization code is empty".to_string(),
            ));
        }

        debug!("Exchanging authorization code for access token");
        let response = self
            .http
            .post(self.exchange_url.clone())
            .json(&ExchangeRequest { code: code.expose() })
            .send()
            .await?;
        drop(code);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Token exchange rejected by proxy");
            return Err(TransportError::http(status, &body));
        }

        let body = response.text().await?;
        let parsed: ExchangeResponse = serde_json::from_str(&body)?;
        if parsed.access_token.is_empty() {
            return Err(TransportError::InvalidResponse(
                "access_token is empty".to_string(),
            ));
        }

        debug!(
            token_type = ?parsed.token_type,
            expires_in = ?parsed.expires_in,
            scope = ?parsed.scope,
            "Received access token"
        );
        Ok(AccessToken::new(parsed.access_token))
    }
}

/// Bearer-authenticated reads against the identity provider
#[derive(Debug, Clone)]
pub struct IdentityApi {
    config: HandshakeConfig,
    http: Client,
}

impl IdentityApi {
    pub fn new(config: HandshakeConfig) -> std::result::Result<Self, TransportError> {
        let http = build_http(&config)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// `GET /users/@me`
    #[instrument(skip(self, token))]
    pub async fn current_user(
        &self,
        token: &AccessToken,
    ) -> std::result::Result<ApiUser, TransportError> {
        debug!("Fetching current user");
        self.get_json("/users/@me", token).await
    }

    /// `GET /users/@me/guilds`
    #[instrument(skip(self, token))]
    pub async fn guilds(
        &self,
        token: &AccessToken,
    ) -> std::result::Result<Vec<PartialGuild>, TransportError> {
        debug!("Fetching guild memberships");
        self.get_json("/users/@me/guilds", token).await
    }

    /// `GET /users/@me/guilds/{guild_id}/member`
    ///
    /// `Ok(None)` when the provider answers 404, i.e. the user is not a member.
    #[instrument(skip(self, token))]
    pub async fn guild_member(
        &self,
        guild_id: &str,
        token: &AccessToken,
    ) -> std::result::Result<Option<GuildMember>, TransportError> {
        debug!("Fetching guild member");
        let path = format!("/users/@me/guilds/{guild_id}/member");
        match self.get_json(&path, token).await {
            Ok(member) => Ok(Some(member)),
            Err(TransportError::Http { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
    ) -> std::result::Result<T, TransportError> {
        let response = self
            .http
            .get(self.config.api_url(path))
            .header("Authorization", token.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::http(status, &body));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
