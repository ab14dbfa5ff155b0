use fb_auth::LaunchContext;

use crate::config::HostConfig;

/// URLs the host loader needs, routed through the platform proxy when embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAssets {
    pub loader_url: String,
    pub data_url: String,
    pub framework_url: String,
    pub code_url: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
}

impl HostAssets {
    pub fn resolve(config: &HostConfig, ctx: &LaunchContext) -> Self {
        let prefix = ctx.asset_prefix();
        let build = format!("{prefix}{}", config.build_dir.trim_matches('/'));
        let stem = format!("{build}/{}", config.product_name);

        Self {
            loader_url: format!("{stem}.loader.js"),
            data_url: format!("{stem}.data"),
            framework_url: format!("{stem}.framework.js"),
            code_url: format!("{stem}.wasm"),
            streaming_assets_url: format!(
                "{prefix}{}",
                config.streaming_assets_dir.trim_matches('/')
            ),
            company_name: config.company_name.clone(),
            product_name: config.product_name.clone(),
            product_version: config.product_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_auth::detect;

    #[test]
    fn standalone_uses_relative_paths() {
        let assets = HostAssets::resolve(&HostConfig::new("Meow Wars"), &detect(""));
        assert_eq!(assets.loader_url, "Build/Meow Wars.loader.js");
        assert_eq!(assets.data_url, "Build/Meow Wars.data");
        assert_eq!(assets.framework_url, "Build/Meow Wars.framework.js");
        assert_eq!(assets.code_url, "Build/Meow Wars.wasm");
        assert_eq!(assets.streaming_assets_url, "StreamingAssets");
    }

    #[test]
    fn embedded_routes_through_proxy() {
        let assets = HostAssets::resolve(&HostConfig::new("Meow Wars"), &detect("frame_id=1"));
        assert_eq!(assets.loader_url, "/.proxy/Build/Meow Wars.loader.js");
        assert_eq!(assets.code_url, "/.proxy/Build/Meow Wars.wasm");
        assert_eq!(assets.streaming_assets_url, "/.proxy/StreamingAssets");
    }
}
