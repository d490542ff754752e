use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Filesystem probes the classifier and orchestrator rely on.
///
/// `DiskLocator` answers from the real filesystem; `InMemoryLocator` from a fixed listing.
pub trait ModuleLocator {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the immediate subdirectories of `dir`, in no particular order.
    fn subdirectories(&self, dir: &Path) -> Result<Vec<String>>;

    /// Contents of a source file, or `None` if it does not exist.
    fn read_source(&self, path: &Path) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskLocator;

impl ModuleLocator for DiskLocator {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Symlinked directories count. Names that are not valid UTF-8 are skipped, since
    /// they could not be joined back into a probe path.
    fn subdirectories(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let is_dir = fs::metadata(entry.path()).map_or(false, |m| m.is_dir());
            if !is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!("Skipping non UTF-8 directory {:?} in {}", raw, dir.display()),
            }
        }
        Ok(names)
    }

    /// Handler source is decoded lossily; the scan patterns are ASCII.
    fn read_source(&self, path: &Path) -> Result<Option<String>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory directory listing for tests and dry runs.
/// Adding a file or directory registers all of its ancestors as directories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocator {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl InMemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_dir(path);
        self
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent.to_path_buf());
        }
        self.files.insert(path, content.into());
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl ModuleLocator for InMemoryLocator {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn subdirectories(&self, dir: &Path) -> Result<Vec<String>> {
        Ok(self
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(dir))
            .filter_map(|d| d.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }

    fn read_source(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}
