use serde::{Deserialize, Serialize};

/// Backend proxy request body
#[derive(Debug, Serialize)]
pub struct ExchangeRequest<'a> {
    pub code: &'a str,
}

/// Backend proxy response; only `access_token` is required
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `GET /users/@me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Global avatar hash
    #[serde(default)]
    pub avatar: Option<String>,
    /// Legacy discriminator, "0" for migrated usernames
    #[serde(default)]
    pub discriminator: Option<String>,
}

/// Entry of `GET /users/@me/guilds`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PartialGuild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// `GET /users/@me/guilds/{id}/member`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GuildMember {
    #[serde(default)]
    pub nick: Option<String>,
    /// Guild-specific avatar hash
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

/// Arguments of the SDK `authorize` RPC
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub response_type: String,
    pub state: String,
    pub prompt: String,
    pub scope: Vec<String>,
}

/// Verified user summary returned by the SDK `authenticate` RPC
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user: ApiUser,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expires: Option<String>,
}
