use url::Url;

use crate::config::FRAME_MARKER;

/// How the page was launched, derived once from the query string
///
/// Only the presence of the marker key decides `is_embedded`. The remaining
/// fields are the launch parameters the embedding platform passes next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    is_embedded: bool,
    pub frame_id: Option<String>,
    pub instance_id: Option<String>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub platform: Option<String>,
}

impl LaunchContext {
    pub fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Prefix for same-origin fetches: embedded pages must go through the
    /// platform proxy.
    pub fn asset_prefix(&self) -> &'static str {
        if self.is_embedded { "/.proxy/" } else { "" }
    }

    pub fn from_url(url: &Url) -> Self {
        detect(url.query().unwrap_or_default())
    }
}

/// Classify a launch from its query string (leading `?` optional).
pub fn detect(query: &str) -> LaunchContext {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut ctx = LaunchContext::default();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            FRAME_MARKER => {
                ctx.is_embedded = true;
                &mut ctx.frame_id
            }
            "instance_id" => &mut ctx.instance_id,
            "guild_id" => &mut ctx.guild_id,
            "channel_id" => &mut ctx.channel_id,
            "platform" => &mut ctx.platform,
            _ => continue,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.into_owned());
        }
    }

    tracing::debug!(embedded = ctx.is_embedded, "Detected launch environment");
    ctx
}
