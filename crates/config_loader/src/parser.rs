//! 清单解析模块
//!
//! 支持 TOML (主要) 和 JSON 格式。

use contracts::{ContractError, HapticManifest};

/// 清单文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// 根据格式解析清单
pub fn parse(content: &str, format: ConfigFormat) -> Result<HapticManifest, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("JSON parse error: {e}"),
            source: Some(Box::new(e)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ActuatorKind;

    #[test]
    fn test_parse_toml_inline_cues() {
        let content = r#"
[engine]
poll_interval_ms = 20

[actuator]
kind = "recording"

[[assets]]
locator = "file:///song.m4a"
duration_ms = 180000

[[assets.pages]]
number = 1
cues = [
    { at_ms = 1000, pattern = "tap_a" },
    { at_ms = 2500, pattern = "tap_b", intensity = 0.5 },
]
"#;
        let manifest = parse(content, ConfigFormat::Toml).unwrap();
        assert_eq!(manifest.engine.poll_interval_ms, 20);
        assert_eq!(manifest.actuator.kind, ActuatorKind::Recording);
        assert_eq!(manifest.assets[0].pages[0].cues.len(), 2);
        assert_eq!(manifest.assets[0].pages[0].cues[1].intensity, Some(0.5));
    }

    #[test]
    fn test_parse_json() {
        let content = r#"{
            "assets": [{
                "locator": "https://cdn.example/track.mp3",
                "pages": [{ "number": 2, "cues": [{ "at_ms": 500, "pattern": "tap_c" }] }]
            }]
        }"#;
        let manifest = parse(content, ConfigFormat::Json).unwrap();
        assert_eq!(manifest.assets[0].pages[0].number, 2);
        assert_eq!(manifest.engine.poll_interval_ms, 16);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse("invalid toml [[[", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
