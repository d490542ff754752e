use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{AutowireError, Result};

/// How the "latest" version directory of a package is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSelection {
    /// Last name in byte-wise sort order; `1.9` beats `1.10`.
    #[default]
    Lexicographic,
    /// Dot-separated segments compared numerically where both sides parse; `1.10` beats `1.9`.
    Numeric,
}

/// What a pass does when a candidate cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

/// Tokens the scanner looks for in handler source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyntaxConfig {
    pub receiver: String,
    pub accessor: String,
    pub method_keyword: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            receiver: constants::RECEIVER.to_string(),
            accessor: constants::ACCESSOR.to_string(),
            method_keyword: constants::METHOD_KEYWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub application_root: PathBuf,
    pub controllers_dir: PathBuf,
    pub models_dir: PathBuf,
    pub libraries_dir: PathBuf,
    pub helpers_dir: PathBuf,
    /// Resolved against the working root, not the application root.
    pub package_root: PathBuf,
    pub descriptor_file: String,
    pub source_extension: String,
    pub require_package_descriptor: bool,
    pub version_selection: VersionSelection,
    pub on_unresolved: FailurePolicy,
    pub syntax: SyntaxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application_root: PathBuf::from(constants::APPLICATION_ROOT),
            controllers_dir: PathBuf::from(constants::CONTROLLERS_DIR),
            models_dir: PathBuf::from(constants::MODELS_DIR),
            libraries_dir: PathBuf::from(constants::LIBRARIES_DIR),
            helpers_dir: PathBuf::from(constants::HELPERS_DIR),
            package_root: PathBuf::from(constants::PACKAGE_ROOT),
            descriptor_file: constants::PACKAGE_DESCRIPTOR.to_string(),
            source_extension: constants::SOURCE_EXTENSION.to_string(),
            require_package_descriptor: true,
            version_selection: VersionSelection::default(),
            on_unresolved: FailurePolicy::default(),
            syntax: SyntaxConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutowireError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.syntax.receiver.is_empty() || self.syntax.accessor.is_empty() {
            return Err(AutowireError::Config(
                "syntax.receiver and syntax.accessor must not be empty".to_string(),
            ));
        }
        if self.syntax.method_keyword.trim().is_empty() {
            return Err(AutowireError::Config(
                "syntax.method_keyword must not be empty".to_string(),
            ));
        }
        if self.descriptor_file.is_empty() {
            return Err(AutowireError::Config(
                "descriptor_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves every configured directory against `working_root`.
    pub fn layout(&self, working_root: &Path) -> Layout {
        let app = working_root.join(&self.application_root);
        Layout {
            controllers: app.join(&self.controllers_dir),
            models: app.join(&self.models_dir),
            libraries: app.join(&self.libraries_dir),
            helpers: app.join(&self.helpers_dir),
            package_root: working_root.join(&self.package_root),
            models_dir: self.models_dir.clone(),
            libraries_dir: self.libraries_dir.clone(),
            helpers_dir: self.helpers_dir.clone(),
            descriptor_file: self.descriptor_file.clone(),
            source_extension: self.source_extension.clone(),
        }
    }
}

/// Concrete directories for one working root.
///
/// The `*_dir` fields keep the relative names so the same layout can be re-rooted inside a
/// package version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub controllers: PathBuf,
    pub models: PathBuf,
    pub libraries: PathBuf,
    pub helpers: PathBuf,
    pub package_root: PathBuf,
    pub models_dir: PathBuf,
    pub libraries_dir: PathBuf,
    pub helpers_dir: PathBuf,
    pub descriptor_file: String,
    pub source_extension: String,
}

impl Layout {
    /// Conventional path of a handler's source file.
    pub fn handler_source(&self, handler_class: &str) -> PathBuf {
        self.controllers
            .join(format!("{}.{}", handler_class, self.source_extension))
    }

    pub fn module_file(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{}.{}", stem, self.source_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.require_package_descriptor);
        assert_eq!(config.version_selection, VersionSelection::Lexicographic);
        assert_eq!(config.on_unresolved, FailurePolicy::Abort);
        assert_eq!(config.syntax.receiver, "$this");
        assert_eq!(config.package_root, PathBuf::from("sparks"));
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::from_toml_str(
            r#"
            application_root = "app"
            require_package_descriptor = false
            version_selection = "numeric"
            on_unresolved = "skip"

            [syntax]
            receiver = "ctx"
            accessor = "."
            "#,
        )
        .unwrap();

        assert_eq!(config.application_root, PathBuf::from("app"));
        assert!(!config.require_package_descriptor);
        assert_eq!(config.version_selection, VersionSelection::Numeric);
        assert_eq!(config.on_unresolved, FailurePolicy::Skip);
        assert_eq!(config.syntax.receiver, "ctx");
        assert_eq!(config.syntax.accessor, ".");
        assert_eq!(config.syntax.method_keyword, "function");
    }

    #[test]
    fn test_empty_accessor_is_rejected() {
        let result = Config::from_toml_str("[syntax]\naccessor = \"\"\n");
        assert!(matches!(result, Err(AutowireError::Config(_))));
    }

    #[test]
    fn test_layout_roots() {
        let layout = Config::default().layout(Path::new("/srv/site"));
        assert_eq!(layout.models, PathBuf::from("/srv/site/application/models"));
        assert_eq!(layout.package_root, PathBuf::from("/srv/site/sparks"));
        assert_eq!(
            layout.handler_source("users"),
            PathBuf::from("/srv/site/application/controllers/users.php")
        );
    }
}
