//! Configuration record supplied by the front end (CLI, GUI, …).
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "title": "Sales by region", "axis_visible": true, "colors": { "A": "#1f77b4" } }
//! ```

use crate::error::{ConfigError, MekkoError};
use crate::font::FontPreference;
use crate::style::{CategoryColorMap, StyleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DPI: u32 = 300;
/// Upper bound for `dpi`; larger values are clamped when rendering.
pub const MAX_DPI: u32 = 2400;
pub const DEFAULT_FILENAME: &str = "mekko.png";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// `"auto"`, `"default"`, or a font family name.
    pub font: String,
    pub axis_visible: bool,
    pub legend_title: String,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub output_directory: PathBuf,
    pub output_filename: String,
    pub dpi: u32,
    /// Category → hex color overrides.
    pub colors: BTreeMap<String, String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font: "auto".into(),
            axis_visible: false,
            legend_title: String::new(),
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            output_directory: PathBuf::from("."),
            output_filename: DEFAULT_FILENAME.into(),
            dpi: DEFAULT_DPI,
            colors: BTreeMap::new(),
        }
    }
}

impl ChartConfig {
    /// Load from a JSON file; missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_directory.join(&self.output_filename)
    }

    pub fn font_preference(&self) -> FontPreference {
        match self.font.parse() {
            Ok(p) => p,
            Err(never) => match never {},
        }
    }

    /// Parsed `colors` table.
    pub fn color_overrides(&self) -> Result<CategoryColorMap, StyleError> {
        CategoryColorMap::from_hex_table(&self.colors)
    }

    /// Default palette for `categories` with this config's overrides applied.
    pub fn color_map_for(&self, categories: &[String]) -> Result<CategoryColorMap, MekkoError> {
        let mut map = CategoryColorMap::default_for(categories.iter().cloned());
        map.merge(&self.color_overrides()?);
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgb8;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ChartConfig =
            serde_json::from_str(r#"{"title":"T","axis_visible":true}"#).unwrap();
        assert_eq!(cfg.title, "T");
        assert!(cfg.axis_visible);
        assert_eq!(cfg.dpi, DEFAULT_DPI);
        assert_eq!(cfg.font_preference(), FontPreference::Auto);
        assert_eq!(cfg.output_path(), Path::new(".").join("mekko.png"));
    }

    #[test]
    fn overrides_merge_onto_default_palette() {
        let mut cfg = ChartConfig::default();
        cfg.colors.insert("B".into(), "#010203".into());
        let map = cfg.color_map_for(&["A".into(), "B".into()]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("B"), Some(Rgb8::new(1, 2, 3)));
    }

    #[test]
    fn config_file_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ChartConfig::from_json_file(&missing),
            Err(ConfigError::Io { path, .. }) if path == missing
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"dpi\": \"high\" }").unwrap();
        let err = ChartConfig::from_json_file(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));

        let ok = dir.path().join("ok.json");
        fs::write(&ok, r#"{"dpi": 150}"#).unwrap();
        assert_eq!(ChartConfig::from_json_file(&ok).unwrap().dpi, 150);
    }

    #[test]
    fn bad_override_is_error() {
        let mut cfg = ChartConfig::default();
        cfg.colors.insert("B".into(), "not-a-color".into());
        assert!(matches!(
            cfg.color_map_for(&["B".into()]),
            Err(MekkoError::Style(StyleError::InvalidColor(_)))
        ));
    }
}
