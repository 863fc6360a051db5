//! Project configuration loading.

use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use sugarfree_transformer::TransformOptions;
use thiserror::Error;

/// File name looked up in the source directory and its parents.
pub const CONFIG_FILE: &str = "sugarfree.json";

/// Errors reading an explicitly requested config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// The file is not valid JSON or has unexpected fields.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Contents of a `sugarfree.json` file.
///
/// Transform options sit at the top level next to the CLI-only settings:
///
/// ```json
/// { "transforms": ["typescript", "imports"], "outExtension": "cjs" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Options passed to every transform call.
    #[serde(flatten)]
    pub options: TransformOptions,

    /// Extension of written files.
    pub out_extension: Option<String>,

    /// Extra ignore globs.
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    /// Finds and loads `sugarfree.json` from `root` or the nearest parent.
    ///
    /// A file that fails to parse is reported and replaced by defaults.
    pub fn discover(root: &Utf8Path) -> Self {
        let Some(path) = root
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
        else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!(%path, "loaded project config");
                config
            }
            Err(e) => {
                tracing::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Loads a config file, failing if it is missing or malformed.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use sugarfree_transformer::Transform;

    #[test]
    fn test_parse_full_config() {
        let config = ProjectConfig::parse(
            r#"{
                "transforms": ["flow", "jsx", "imports"],
                "jsxPragma": "h",
                "outExtension": "cjs",
                "ignore": ["**/__fixtures__/**"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.options.transforms,
            vec![Transform::Flow, Transform::Jsx, Transform::Imports]
        );
        assert_eq!(config.options.jsx_pragma, "h");
        assert_eq!(config.options.jsx_fragment_pragma, "React.Fragment");
        assert_eq!(config.out_extension.as_deref(), Some("cjs"));
        assert_eq!(config.ignore, vec!["**/__fixtures__/**"]);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(ProjectConfig::parse("{}").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_unknown_transform_fails() {
        assert!(ProjectConfig::parse(r#"{"transforms": ["coffee"]}"#).is_err());
    }

    #[test]
    fn test_discover_walks_up_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let nested = root.join("src/app");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(ProjectConfig::discover(&nested), ProjectConfig::default());

        fs::write(root.join(CONFIG_FILE), r#"{"transforms": ["jest"]}"#).unwrap();
        assert_eq!(
            ProjectConfig::discover(&nested).options.transforms,
            vec![Transform::Jest]
        );

        fs::write(root.join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(ProjectConfig::discover(&nested), ProjectConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = ProjectConfig::load(Utf8Path::new("/nonexistent/sugarfree.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
