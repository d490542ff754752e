use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutowireError {
    #[error("Unknown reference: {name} (no model, library, helper or package provides it)")]
    UnknownReference { name: String },

    #[error("Package requested for {name} but no package directory {} exists, or it has no version to choose from", .expected.display())]
    AmbiguousPackage { name: String, expected: PathBuf },

    #[error("Package found in {} but it has no {descriptor} file; add one or disable require_package_descriptor", .version_dir.display())]
    MissingDescriptor {
        name: String,
        version_dir: PathBuf,
        descriptor: String,
    },

    #[error("Package found in {} but no model, library or helper inside it matches {name}", .version_dir.display())]
    UnclassifiablePackage { name: String, version_dir: PathBuf },

    #[error("Loader failed for {name}: {message}")]
    Loader { name: String, message: String },

    #[error("Invalid scan syntax: {0}")]
    Syntax(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutowireError {
    /// True for the four classification failures; a lenient failure policy may skip these.
    /// Everything else is an infrastructure fault and always aborts the pass.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            AutowireError::UnknownReference { .. }
                | AutowireError::AmbiguousPackage { .. }
                | AutowireError::MissingDescriptor { .. }
                | AutowireError::UnclassifiablePackage { .. }
        )
    }

    pub fn loader(name: impl Into<String>, message: impl Into<String>) -> Self {
        AutowireError::Loader {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AutowireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_are_flagged() {
        let err = AutowireError::UnknownReference {
            name: "foo".to_string(),
        };
        assert!(err.is_resolution_failure());

        let err = AutowireError::Config("bad".to_string());
        assert!(!err.is_resolution_failure());
    }

    #[test]
    fn test_messages_name_symbol_and_directory() {
        let err = AutowireError::MissingDescriptor {
            name: "widgets".to_string(),
            version_dir: PathBuf::from("sparks/widgets/1.0"),
            descriptor: "spark.info".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("sparks/widgets/1.0"));
        assert!(message.contains("spark.info"));

        let err = AutowireError::UnknownReference {
            name: "Foo".to_string(),
        };
        assert!(err.to_string().contains("Foo"));
    }
}
