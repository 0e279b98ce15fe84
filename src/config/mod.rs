use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::paging::{PagingError, PagingResult, CHECK_DUPLICATE_RANGE};

/// Tunables for the paginated list controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Items on each side of a seam checked for duplicates
    pub duplicate_check_range: usize,

    /// Distance the view is nudged after an append that keeps position
    pub next_page_scroll_step: i32,

    /// Message shown when a load produced no items at all
    pub empty_message: String,

    /// Per-fetch timeout in milliseconds; none means the source decides
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            duplicate_check_range: CHECK_DUPLICATE_RANGE,
            next_page_scroll_step: 48,
            empty_message: "No hint".to_string(),
            fetch_timeout_ms: None,
        }
    }
}

impl PagerConfig {
    /// Defaults, then environment, then the optional JSON file
    pub async fn init(path: Option<&Path>) -> PagingResult<Self> {
        debug!("Initializing pager configuration");

        let mut config = Self::default();
        config.load_from_env();

        if let Some(path) = path {
            let file_config = Self::load_from_file(path).await?;
            config.merge_with(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `PAGEWISE_*` environment variables
    pub fn load_from_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(range) = lookup("PAGEWISE_DUPLICATE_CHECK_RANGE").and_then(|v| v.parse().ok()) {
            self.duplicate_check_range = range;
        }

        if let Some(step) = lookup("PAGEWISE_SCROLL_STEP").and_then(|v| v.parse().ok()) {
            self.next_page_scroll_step = step;
        }

        if let Some(message) = lookup("PAGEWISE_EMPTY_MESSAGE") {
            self.empty_message = message;
        }

        if let Some(timeout) = lookup("PAGEWISE_FETCH_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.fetch_timeout_ms = Some(timeout);
        }
    }

    /// Load configuration from a JSON file
    pub async fn load_from_file(path: &Path) -> PagingResult<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another configuration into this one; non-default values win
    pub fn merge_with(&mut self, other: Self) {
        let defaults = Self::default();
        if other.duplicate_check_range != defaults.duplicate_check_range {
            self.duplicate_check_range = other.duplicate_check_range;
        }
        if other.next_page_scroll_step != defaults.next_page_scroll_step {
            self.next_page_scroll_step = other.next_page_scroll_step;
        }
        if other.empty_message != defaults.empty_message {
            self.empty_message = other.empty_message;
        }
        if other.fetch_timeout_ms.is_some() {
            self.fetch_timeout_ms = other.fetch_timeout_ms;
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> PagingResult<()> {
        if self.duplicate_check_range == 0 {
            return Err(PagingError::Config(
                "duplicate_check_range must be greater than 0".to_string(),
            ));
        }

        if self.fetch_timeout_ms == Some(0) {
            return Err(PagingError::Config(
                "fetch_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PagerConfig::default();
        assert_eq!(config.duplicate_check_range, 50);
        assert_eq!(config.empty_message, "No hint");
        assert!(config.fetch_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("PAGEWISE_DUPLICATE_CHECK_RANGE", "8"),
            ("PAGEWISE_SCROLL_STEP", "96"),
            ("PAGEWISE_EMPTY_MESSAGE", "Nothing here"),
            ("PAGEWISE_FETCH_TIMEOUT_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = PagerConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.duplicate_check_range, 8);
        assert_eq!(config.next_page_scroll_step, 96);
        assert_eq!(config.empty_message, "Nothing here");
        assert_eq!(config.fetch_timeout_ms, None);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = PagerConfig::default();
        config.duplicate_check_range = 0;
        assert!(config.validate().is_err());

        let mut config = PagerConfig::default();
        config.fetch_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_and_merge_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("pagewise.json");
        tokio::fs::write(&path, r#"{ "empty_message": "No galleries", "fetch_timeout_ms": 2500 }"#)
            .await
            .unwrap();

        let file_config = PagerConfig::load_from_file(&path).await.unwrap();
        assert_eq!(file_config.duplicate_check_range, 50);

        let mut config = PagerConfig::default();
        config.next_page_scroll_step = 10;
        config.merge_with(file_config);
        assert_eq!(config.empty_message, "No galleries");
        assert_eq!(config.next_page_scroll_step, 10);
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(2500)));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let result = PagerConfig::load_from_file(&temp_dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(PagingError::Io(_))));
    }
}
