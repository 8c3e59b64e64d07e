//! Binder configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Retry header lookups ignoring ASCII case when the exact name is missing.
    /// Off by default: keys are matched exactly.
    pub case_insensitive_headers: bool,
    /// Upper bound on the raw body size, measured before base64 decoding.
    pub max_payload_bytes: Option<usize>,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            case_insensitive_headers: false,
            max_payload_bytes: None,
        }
    }
}

impl BindConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builder method: toggle case-insensitive header lookups.
    pub fn with_case_insensitive_headers(self, enabled: bool) -> Self {
        Self {
            case_insensitive_headers: enabled,
            ..self
        }
    }

    /// Builder method: cap the raw body size.
    pub fn with_max_payload_bytes(self, limit: usize) -> Self {
        Self {
            max_payload_bytes: Some(limit),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = BindConfig::default();
        assert!(!config.case_insensitive_headers);
        assert_eq!(config.max_payload_bytes, None);
    }

    #[test]
    fn parse_empty_uses_defaults() {
        let config = BindConfig::from_toml_str("").unwrap();
        assert_eq!(config, BindConfig::default());
    }

    #[test]
    fn parse_full() {
        let config = BindConfig::from_toml_str(
            r#"
case_insensitive_headers = true
max_payload_bytes = 1048576
"#,
        )
        .unwrap();
        assert!(config.case_insensitive_headers);
        assert_eq!(config.max_payload_bytes, Some(1_048_576));
    }

    #[test]
    fn reject_wrong_types() {
        assert!(BindConfig::from_toml_str("max_payload_bytes = \"big\"").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = BindConfig::default()
            .with_case_insensitive_headers(true)
            .with_max_payload_bytes(512);
        let text = config.to_toml_string().unwrap();
        assert_eq!(BindConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_payload_bytes = 64").unwrap();
        let config = BindConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_payload_bytes, Some(64));
        assert!(!config.case_insensitive_headers);
    }
}
