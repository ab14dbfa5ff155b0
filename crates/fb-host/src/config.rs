use serde::{Deserialize, Serialize};

/// Build layout and metadata of the runtime host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// File stem shared by the loader, data, framework and code files
    pub product_name: String,
    /// Publisher shown by the host; only ever taken from config, empty otherwise
    #[serde(default)]
    pub company_name: String,
    #[serde(default = "default_version")]
    pub product_version: String,
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    #[serde(default = "default_streaming_assets_dir")]
    pub streaming_assets_dir: String,
}

impl HostConfig {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            company_name: String::new(),
            product_version: default_version(),
            build_dir: default_build_dir(),
            streaming_assets_dir: default_streaming_assets_dir(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_build_dir() -> String {
    "Build".to_string()
}

fn default_streaming_assets_dir() -> String {
    "StreamingAssets".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_name_has_no_built_in_default() {
        let config: HostConfig = serde_json::from_str(r#"{ "product_name": "Meow Wars" }"#).unwrap();
        assert!(config.company_name.is_empty());
        assert_eq!(config.build_dir, "Build");
        assert_eq!(config, HostConfig::new("Meow Wars"));

        let config: HostConfig = serde_json::from_str(
            r#"{ "product_name": "Meow Wars", "company_name": "SuperSocialLabs" }"#,
        )
        .unwrap();
        assert_eq!(config.company_name, "SuperSocialLabs");
    }
}
