//! Binding configuration
//!
//! `BindingConfig` controls the conventions the engine applies when turning
//! documents into a table: which fields are structural (hidden), which are
//! read-only on existing rows, and how declarations and categories are named
//! in the store. Every field has a serde default so partial JSON files load.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fields always hidden regardless of schema.
const DEFAULT_HIDDEN_FIELDS: &[&str] = &[
    "is", "title", "content", "alias", "icon", "page", "banner", "name", "label", "id",
];

/// Fields never editable on rows backed by a document.
const DEFAULT_READ_ONLY_FIELDS: &[&str] = &["blockTitle", "block", "page", "is", "content"];

/// Widest title column the grid will accept.
const MAX_TITLE_COLUMN_WIDTH: u32 = 2000;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingConfig {
    /// Structural fields hidden from the grid
    #[serde(default = "default_hidden_fields")]
    pub hidden_fields: Vec<String>,

    /// Fields read-only on bound rows
    #[serde(default = "default_read_only_fields")]
    pub read_only_fields: Vec<String>,

    /// Prefix marking field declarations on the configuration record
    #[serde(default = "default_field_prefix")]
    pub field_prefix: String,

    /// Property holding a document's category tags
    #[serde(default = "default_category_property")]
    pub category_property: String,

    /// Header shown above the title column
    #[serde(default = "default_title_header")]
    pub title_header: String,

    /// Fixed width of the title column
    #[serde(default = "default_title_width")]
    pub title_width: u32,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            hidden_fields: default_hidden_fields(),
            read_only_fields: default_read_only_fields(),
            field_prefix: default_field_prefix(),
            category_property: default_category_property(),
            title_header: default_title_header(),
            title_width: default_title_width(),
        }
    }
}

fn default_hidden_fields() -> Vec<String> {
    DEFAULT_HIDDEN_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_read_only_fields() -> Vec<String> {
    DEFAULT_READ_ONLY_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_field_prefix() -> String {
    "field.".to_string()
}

fn default_category_property() -> String {
    "is".to_string()
}

fn default_title_header() -> String {
    "Block".to_string()
}

fn default_title_width() -> u32 {
    300
}

impl BindingConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; a malformed or invalid one is an
    /// error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.field_prefix.is_empty() {
            return Err("field_prefix cannot be empty".to_string());
        }

        if self.category_property.trim().is_empty() {
            return Err("category_property cannot be empty".to_string());
        }

        if self.title_width == 0 {
            return Err("title_width must be greater than 0".to_string());
        }

        if self.title_width > MAX_TITLE_COLUMN_WIDTH {
            return Err(format!(
                "title_width cannot exceed {}",
                MAX_TITLE_COLUMN_WIDTH
            ));
        }

        Ok(())
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.hidden_fields.iter().any(|f| f == field)
    }

    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only_fields.iter().any(|f| f == field)
    }

    /// Field name a configuration property declares, if it is a declaration.
    pub fn declared_field<'a>(&self, property: &'a str) -> Option<&'a str> {
        property
            .strip_prefix(self.field_prefix.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BindingConfig::default();
        assert!(config.is_hidden("is"));
        assert!(config.is_hidden("id"));
        assert!(!config.is_hidden("blockTitle"));
        assert!(config.is_read_only("content"));
        assert!(!config.is_read_only("status"));
        assert_eq!(config.title_width, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BindingConfig::default();

        config.field_prefix = String::new();
        assert!(config.validate().is_err());

        config = BindingConfig::default();
        config.title_width = 0;
        assert!(config.validate().is_err());

        config.title_width = MAX_TITLE_COLUMN_WIDTH + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_declared_field() {
        let config = BindingConfig::default();
        assert_eq!(config.declared_field("field.status"), Some("status"));
        assert_eq!(config.declared_field("field."), None);
        assert_eq!(config.declared_field("status"), None);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "titleHeader": "Entry", "titleWidth": 240 }}"#).unwrap();

        let config = BindingConfig::load(file.path()).unwrap();
        assert_eq!(config.title_header, "Entry");
        assert_eq!(config.title_width, 240);
        assert_eq!(config.field_prefix, "field.");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = BindingConfig::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, BindingConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "titleWidth": 0 }}"#).unwrap();
        assert!(BindingConfig::load(file.path()).is_err());
    }
}
