use std::path::PathBuf;

use crate::error::Result;
use crate::eta::config::EtaConfig;

/// Process-level settings for the binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Tuning file given on the command line; wins over `ETA_CONFIG_PATH`.
    pub config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            log_level,
            config_path: None,
        }
    }

    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if config_path.is_some() {
            self.config_path = config_path;
        }
        self
    }

    pub fn load_eta_config(&self) -> Result<EtaConfig> {
        match &self.config_path {
            Some(path) => EtaConfig::from_file(path),
            None => EtaConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_what_is_given() {
        let base = Config {
            log_level: "warn".to_string(),
            config_path: None,
        };
        let cfg = base.clone().with_overrides(None, None);
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.config_path.is_none());

        let cfg = base.with_overrides(Some("debug".into()), Some(PathBuf::from("tuning.json")));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.config_path, Some(PathBuf::from("tuning.json")));
    }

    #[test]
    fn test_missing_tuning_file_is_an_error() {
        let cfg = Config {
            log_level: "info".to_string(),
            config_path: Some(PathBuf::from("/nonexistent/eta-tuning.json")),
        };
        assert!(cfg.load_eta_config().is_err());
    }
}
