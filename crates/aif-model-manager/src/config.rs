//! Model manager configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelManagerConfig {
    pub port: u16,
    /// Directory the blob store writes model files under.
    pub storage_dir: String,
    /// Human-readable size cap per model (`"1GB"`, `"500MB"`, ...).
    pub max_model_size: String,
}

impl Default for ModelManagerConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            storage_dir: "./data/models".to_string(),
            max_model_size: "1GB".to_string(),
        }
    }
}

impl ModelManagerConfig {
    /// Load from `path` (any format `aif_core::config` understands),
    /// overlaying `MODELMGR_`-prefixed environment variables, falling back
    /// to defaults if `path` is absent or unreadable.
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => aif_core::config::load_with_env(path, "MODELMGR").unwrap_or_else(|err| {
                tracing::warn!(error = %err, path, "falling back to default model manager config");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ModelManagerConfig::default();
        assert_eq!(cfg.port, 3002);
        assert_eq!(cfg.max_model_size, "1GB");
    }

    #[test]
    fn load_with_missing_path_falls_back_to_default() {
        let cfg = ModelManagerConfig::load(None);
        assert_eq!(cfg.port, ModelManagerConfig::default().port);
    }
}
