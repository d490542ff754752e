use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{Layout, VersionSelection};
use crate::error::{AutowireError, Result};
use crate::locator::ModuleLocator;
use crate::types::{CandidateName, Classification, LocalKind, ModuleKind};

#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    pub require_package_descriptor: bool,
    pub version_selection: VersionSelection,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            require_package_descriptor: true,
            version_selection: VersionSelection::Lexicographic,
        }
    }
}

/// Decides what kind of module a candidate refers to by probing the directory layout.
///
/// Probe order is fixed: application model, library, helper, then the package tree. The
/// first hit wins and nothing after it is probed.
pub struct Classifier<'a> {
    layout: &'a Layout,
    locator: &'a dyn ModuleLocator,
    options: ClassifyOptions,
}

impl<'a> Classifier<'a> {
    pub fn new(
        layout: &'a Layout,
        locator: &'a dyn ModuleLocator,
        options: ClassifyOptions,
    ) -> Self {
        Self {
            layout,
            locator,
            options,
        }
    }

    pub fn classify(&self, name: &CandidateName) -> Result<Classification> {
        let app_dirs = [
            self.layout.models.clone(),
            self.layout.libraries.clone(),
            self.layout.helpers.clone(),
        ];
        if let Some(kind) = self.probe_local(name, &app_dirs) {
            debug!("Classified {} as {}", name, kind);
            return Ok(Classification::new(name.clone(), kind.into()));
        }

        if !self.locator.is_dir(&self.layout.package_root) {
            return Err(AutowireError::UnknownReference {
                name: name.to_string(),
            });
        }

        let (sub_kind, version) = self.classify_package(name)?;
        debug!("Classified {} as package {} @ {}", name, sub_kind, version);
        Ok(Classification::new(
            name.clone(),
            ModuleKind::Package { sub_kind, version },
        ))
    }

    fn classify_package(&self, name: &CandidateName) -> Result<(LocalKind, String)> {
        let package_dir = self.layout.package_root.join(name.lowercase());
        let ambiguous = || AutowireError::AmbiguousPackage {
            name: name.to_string(),
            expected: package_dir.clone(),
        };

        if !self.locator.is_dir(&package_dir) {
            return Err(ambiguous());
        }

        let versions = self.locator.subdirectories(&package_dir)?;
        let version =
            select_version(versions, self.options.version_selection).ok_or_else(ambiguous)?;
        let version_dir = package_dir.join(&version);
        debug!("Package {} resolved to version directory {}", name, version_dir.display());

        if self.options.require_package_descriptor
            && !self
                .locator
                .is_file(&version_dir.join(&self.layout.descriptor_file))
        {
            return Err(AutowireError::MissingDescriptor {
                name: name.to_string(),
                version_dir,
                descriptor: self.layout.descriptor_file.clone(),
            });
        }

        let package_dirs = [
            version_dir.join(&self.layout.models_dir),
            version_dir.join(&self.layout.libraries_dir),
            version_dir.join(&self.layout.helpers_dir),
        ];
        match self.probe_local(name, &package_dirs) {
            Some(sub_kind) => Ok((sub_kind, version)),
            None => Err(AutowireError::UnclassifiablePackage {
                name: name.to_string(),
                version_dir,
            }),
        }
    }

    /// `dirs` holds the model, library and helper directories, in precedence order.
    fn probe_local(&self, name: &CandidateName, dirs: &[PathBuf; 3]) -> Option<LocalKind> {
        LocalKind::PRECEDENCE
            .iter()
            .zip(dirs.iter())
            .find(|(kind, dir)| self.module_exists(dir, &kind.file_stem(name)))
            .map(|(kind, _)| *kind)
    }

    fn module_exists(&self, dir: &Path, stem: &str) -> bool {
        let path = self.layout.module_file(dir, stem);
        let found = self.locator.is_file(&path);
        debug!("Probe {} -> {}", path.display(), found);
        found
    }
}

/// Picks the "latest" version directory name. `None` when there are no versions.
pub fn select_version(versions: Vec<String>, selection: VersionSelection) -> Option<String> {
    match selection {
        VersionSelection::Lexicographic => versions.into_iter().max(),
        VersionSelection::Numeric => versions
            .into_iter()
            .max_by(|a, b| compare_numeric(a, b).then_with(|| a.cmp(b))),
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
