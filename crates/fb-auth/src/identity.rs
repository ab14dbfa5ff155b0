use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::client::IdentityApi;
use crate::config::{HandshakeConfig, ResolutionStrategy};
use crate::errors::{HandshakeError, ResolutionError, Result};
use crate::models::{ApiUser, GuildMember};
use crate::sdk::EmbeddingSdk;
use crate::token::AccessToken;

/// Resolved identity handed to the runtime host.
///
/// Carries no credential. `scope_name` is left empty when the strategy has
/// no way to learn it and is then dropped from the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub user_id: String,
    pub display_name: String,
    pub scope_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope_name: String,
    pub avatar_url: String,
}

/// Where the user was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Guild {
        id: String,
        name: String,
        member: Option<GuildMember>,
    },
    /// DM, group DM or any launch without a guild the user belongs to
    Private,
}

/// First non-empty of guild nickname, global display name, username.
pub fn display_name<'a>(
    nick: Option<&'a str>,
    global_name: Option<&'a str>,
    username: &'a str,
) -> &'a str {
    [nick, global_name]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(username)
}

/// Avatar URL with guild avatar taking precedence over the global one.
///
/// Users without any avatar get the platform's default avatar.
pub fn avatar_url(config: &HandshakeConfig, user: &ApiUser, guild_avatar: Option<(&str, &str)>) -> String {
    if let Some((guild_id, hash)) = guild_avatar.filter(|(_, hash)| !hash.is_empty()) {
        return config.cdn_url(&format!(
            "/guilds/{guild_id}/users/{}/avatars/{hash}.png",
            user.id
        ));
    }

    match user.avatar.as_deref().filter(|hash| !hash.is_empty()) {
        Some(hash) => config.cdn_url(&format!("/avatars/{}/{hash}.png", user.id)),
        None => config.cdn_url(&format!("/embed/avatars/{}.png", default_avatar_index(user))),
    }
}

/// Platform ids are unsigned decimal integers
fn is_snowflake(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

fn default_avatar_index(user: &ApiUser) -> u64 {
    match user.discriminator.as_deref() {
        Some(disc) if disc != "0" => disc.parse::<u64>().unwrap_or(0) % 5,
        _ => (user.id.parse::<u64>().unwrap_or(0) >> 22) % 6,
    }
}

/// Build the record for `user` within `scope`.
pub fn build_record(config: &HandshakeConfig, user: &ApiUser, scope: &Scope) -> IdentityRecord {
    match scope {
        Scope::Guild { id, name, member } => {
            let nick = member.as_ref().and_then(|m| m.nick.as_deref());
            let guild_avatar = member
                .as_ref()
                .and_then(|m| m.avatar.as_deref())
                .map(|hash| (id.as_str(), hash));
            IdentityRecord {
                user_id: user.id.clone(),
                display_name: display_name(nick, user.global_name.as_deref(), &user.username)
                    .to_string(),
                scope_id: id.clone(),
                scope_name: name.clone(),
                avatar_url: avatar_url(config, user, guild_avatar),
            }
        }
        Scope::Private => IdentityRecord {
            user_id: user.id.clone(),
            display_name: display_name(None, user.global_name.as_deref(), &user.username)
                .to_string(),
            scope_id: format!("u{}", user.id),
            scope_name: user.username.clone(),
            avatar_url: avatar_url(config, user, None),
        },
    }
}

/// Turns an access token into an [`IdentityRecord`] using one fixed strategy.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    api: IdentityApi,
}

impl IdentityResolver {
    pub fn new(config: HandshakeConfig) -> Result<Self> {
        let api = IdentityApi::new(config)
            .map_err(|e| HandshakeError::ResolutionFailed(ResolutionError::Transport(e)))?;
        Ok(Self { api })
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.api.config().strategy
    }

    #[instrument(skip(self, token, sdk), fields(strategy = ?self.strategy()))]
    pub async fn resolve(&self, token: &AccessToken, sdk: &dyn EmbeddingSdk) -> Result<IdentityRecord> {
        let (user, scope) = match self.strategy() {
            ResolutionStrategy::DirectToken => self.direct(token, sdk.scope_id()).await,
            ResolutionStrategy::SdkMediated => self.sdk_mediated(token, sdk).await,
        }
        .map_err(HandshakeError::ResolutionFailed)?;

        let record = build_record(self.api.config(), &user, &scope);
        info!(
            user_id = %record.user_id,
            scope_id = %record.scope_id,
            private = matches!(scope, Scope::Private),
            "Resolved identity"
        );
        Ok(record)
    }

    async fn direct(
        &self,
        token: &AccessToken,
        scope_id: Option<&str>,
    ) -> std::result::Result<(ApiUser, Scope), ResolutionError> {
        let user = self.api.current_user(token).await?;

        let Some(scope_id) = scope_id else {
            debug!("Launched outside a guild, using private scope");
            return Ok((user, Scope::Private));
        };

        let guilds = self.api.guilds(token).await?;
        let Some(guild) = guilds.into_iter().find(|g| g.id == scope_id) else {
            debug!(scope_id, "Launch guild not among memberships, using private scope");
            return Ok((user, Scope::Private));
        };

        let member = self.api.guild_member(&guild.id, token).await?;
        Ok((
            user,
            Scope::Guild {
                id: guild.id,
                name: guild.name,
                member,
            },
        ))
    }

    async fn sdk_mediated(
        &self,
        token: &AccessToken,
        sdk: &dyn EmbeddingSdk,
    ) -> std::result::Result<(ApiUser, Scope), ResolutionError> {
        let authenticated = sdk.authenticate(token).await?;
        debug!(
            scopes = ?authenticated.scopes,
            expires = authenticated.expires.as_deref().unwrap_or("unknown"),
            "Authenticated through the SDK"
        );
        let user = authenticated.user;

        let Some(scope_id) = sdk.scope_id() else {
            return Ok((user, Scope::Private));
        };
        if !is_snowflake(scope_id) {
            warn!(scope_id, "Launch guild id is not a valid id, using private scope");
            return Ok((user, Scope::Private));
        }

        match self.api.guild_member(scope_id, token).await? {
            Some(member) => Ok((
                user,
                Scope::Guild {
                    id: scope_id.to_string(),
                    name: String::new(),
                    member: Some(member),
                },
            )),
            None => {
                debug!(scope_id, "Not a member of the launch guild, using private scope");
                Ok((user, Scope::Private))
            }
        }
    }
}
