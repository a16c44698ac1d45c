use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::catalog::OrderingPolicy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Published CSV feed the question bank is fetched from.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Default question count for topic quizzes (the picker offers this,
    /// 25, and "all").
    #[serde(default = "default_topic_length")]
    pub topic_length: usize,
    /// Subjects excluded from randomized mixed play. Empty by default.
    #[serde(default)]
    pub mixed_excluded_subjects: Vec<String>,
    /// Preferred display order for subjects and per-subject topics.
    #[serde(default)]
    pub ordering: OrderingPolicy,
}

fn default_feed_url() -> String {
    "https://docs.google.com/spreadsheets/d/e/2PACX-1vQWdBcdp3GM1m97dy0yt3zRFEU_Hw-bjdlp8Mc1ZX2B43j0liArk1gveWZUn0TOK59Ffh4OyXoY5NCY/pub?output=csv".to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_topic_length() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            theme: default_theme(),
            topic_length: default_topic_length(),
            mixed_excluded_subjects: Vec::new(),
            ordering: OrderingPolicy::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizcram")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file could leave out of range.
    pub fn validate(&mut self) {
        self.topic_length = self.topic_length.clamp(1, 100);
        if self.feed_url.trim().is_empty() {
            self.feed_url = default_feed_url();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_deserializes_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.topic_length, 10);
        assert!(config.mixed_excluded_subjects.is_empty());
        assert!(config.ordering.subjects.is_empty());
        assert!(!config.feed_url.is_empty());
    }

    #[test]
    fn partial_file_keeps_given_fields() {
        let toml_str = r#"
theme = "paper"
mixed_excluded_subjects = ["English"]

[ordering]
subjects = ["Math", "History"]

[ordering.topics]
Math = ["Algebra"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "paper");
        assert_eq!(config.mixed_excluded_subjects, ["English"]);
        assert_eq!(config.ordering.subjects, ["Math", "History"]);
        assert_eq!(config.ordering.topics["Math"], ["Algebra"]);
        assert_eq!(config.topic_length, 10);
    }

    #[test]
    fn validate_clamps_out_of_range_values() {
        let mut config = Config::default();
        config.topic_length = 0;
        config.feed_url = "   ".to_string();
        config.validate();
        assert_eq!(config.topic_length, 1);
        assert!(!config.feed_url.trim().is_empty());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.mixed_excluded_subjects = vec!["English".to_string()];
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            config.mixed_excluded_subjects,
            deserialized.mixed_excluded_subjects
        );
        assert_eq!(config.feed_url, deserialized.feed_url);
    }
}
