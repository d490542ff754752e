use serde::{Deserialize, Serialize};
use std::fmt;

/// A collaborator name as written in handler source, e.g. `user_model` in
/// `$this->user_model->find()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateName(String);

impl CandidateName {
    pub fn new(written: impl Into<String>) -> Self {
        Self(written.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form, used for data-access module files and package directories.
    pub fn lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    /// First character upper-cased, the rest untouched; used for library and helper files.
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateName {
    fn from(written: &str) -> Self {
        Self::new(written)
    }
}

impl From<String> for CandidateName {
    fn from(written: String) -> Self {
        Self(written)
    }
}

impl AsRef<str> for CandidateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The three kinds that can live either in the application or inside a package version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalKind {
    DataAccess,
    Library,
    Helper,
}

impl LocalKind {
    /// Probe order; the first kind with a matching file wins.
    pub const PRECEDENCE: [LocalKind; 3] =
        [LocalKind::DataAccess, LocalKind::Library, LocalKind::Helper];

    /// File stem this kind is stored under for a given candidate.
    pub fn file_stem(&self, name: &CandidateName) -> String {
        match self {
            LocalKind::DataAccess => name.lowercase(),
            LocalKind::Library | LocalKind::Helper => name.capitalized(),
        }
    }
}

impl fmt::Display for LocalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocalKind::DataAccess => "model",
            LocalKind::Library => "library",
            LocalKind::Helper => "helper",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleKind {
    DataAccess,
    Library,
    Helper,
    Package { sub_kind: LocalKind, version: String },
}

impl From<LocalKind> for ModuleKind {
    fn from(kind: LocalKind) -> Self {
        match kind {
            LocalKind::DataAccess => ModuleKind::DataAccess,
            LocalKind::Library => ModuleKind::Library,
            LocalKind::Helper => ModuleKind::Helper,
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::DataAccess => f.write_str("model"),
            ModuleKind::Library => f.write_str("library"),
            ModuleKind::Helper => f.write_str("helper"),
            ModuleKind::Package { sub_kind, version } => {
                write!(f, "package {} @ {}", sub_kind, version)
            }
        }
    }
}

/// Outcome of classifying one candidate. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub name: CandidateName,
    pub kind: ModuleKind,
}

impl Classification {
    pub fn new(name: CandidateName, kind: ModuleKind) -> Self {
        Self { name, kind }
    }

    /// `"<name>/<version>"` for packages.
    pub fn package_spec(&self) -> Option<String> {
        match &self.kind {
            ModuleKind::Package { version, .. } => Some(format!("{}/{}", self.name, version)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_forms() {
        let name = CandidateName::new("user_Model");
        assert_eq!(name.lowercase(), "user_model");
        assert_eq!(name.capitalized(), "User_Model");
        assert_eq!(name.as_str(), "user_Model");
    }

    #[test]
    fn test_capitalized_keeps_tail_case() {
        assert_eq!(CandidateName::new("fancyLib").capitalized(), "FancyLib");
        assert_eq!(CandidateName::new("").capitalized(), "");
    }

    #[test]
    fn test_file_stem_per_kind() {
        let name = CandidateName::new("Mailer");
        assert_eq!(LocalKind::DataAccess.file_stem(&name), "mailer");
        assert_eq!(LocalKind::Library.file_stem(&name), "Mailer");
        assert_eq!(LocalKind::Helper.file_stem(&name), "Mailer");
    }

    #[test]
    fn test_package_spec() {
        let classification = Classification::new(
            CandidateName::new("widgets"),
            ModuleKind::Package {
                sub_kind: LocalKind::Library,
                version: "1.0".to_string(),
            },
        );
        assert_eq!(classification.package_spec().as_deref(), Some("widgets/1.0"));

        let plain = Classification::new(CandidateName::new("mailer"), ModuleKind::Library);
        assert!(plain.package_spec().is_none());
    }

    #[test]
    fn test_classification_serializes_with_kind_tag() {
        let classification = Classification::new(
            CandidateName::new("widgets"),
            ModuleKind::Package {
                sub_kind: LocalKind::Helper,
                version: "0.9".to_string(),
            },
        );
        let value = serde_json::to_value(&classification).unwrap();
        assert_eq!(value["name"], "widgets");
        assert_eq!(value["kind"]["type"], "package");
        assert_eq!(value["kind"]["sub_kind"], "helper");
        assert_eq!(value["kind"]["version"], "0.9");
    }
}
