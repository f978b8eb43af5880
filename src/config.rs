//! Application configuration.
//!
//! One explicit object built from CLI arguments and the environment;
//! everything downstream receives it at construction.

use std::path::PathBuf;

use serde::Deserialize;

use mail_composer::BackendConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Webmail entry URL.
    #[serde(default = "default_mail_url")]
    pub mail_url: String,

    /// Directory for checkpoint artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Run the browser without a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser window size.
    #[serde(default = "default_window")]
    pub window: (u32, u32),

    /// Generative backend; absent means fallback-only content.
    #[serde(default)]
    pub backend: Option<BackendConfig>,
}

fn default_mail_url() -> String {
    "https://mail.google.com".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_headless() -> bool {
    true
}

fn default_window() -> (u32, u32) {
    (1920, 1080)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mail_url: default_mail_url(),
            artifact_dir: default_artifact_dir(),
            headless: default_headless(),
            window: default_window(),
            backend: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&PathBuf>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_sparse_files() {
        let config: AppConfig = serde_json::from_str(r#"{"headless": false}"#).unwrap();
        assert!(!config.headless);
        assert_eq!(config.mail_url, "https://mail.google.com");
        assert!(config.backend.is_none());
    }

    #[test]
    fn backend_section_parses() {
        let config: AppConfig = serde_json::from_str(
            r#"{"backend": {"base_url": "https://api.cohere.com", "api_key": "k", "model": "command"}}"#,
        )
        .unwrap();
        let backend = config.backend.unwrap();
        assert_eq!(backend.model, "command");
        assert_eq!(backend.timeout_secs, 30);
    }
}
