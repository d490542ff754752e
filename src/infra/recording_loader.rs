use std::collections::HashSet;
use tracing::debug;

use crate::context::{ExecutionContext, Instance};
use crate::error::{AutowireError, Result};
use crate::ports::ModuleLoader;

/// Placeholder instance handed out by `RecordingLoader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub kind: &'static str,
    pub name: String,
}

/// Module loader that instantiates nothing real and keeps a journal of every call.
///
/// Backs the CLI's dry runs and the tests. Calls are journaled as `"<kind>:<name>"`,
/// e.g. `"library:Mailer"` or `"package:widgets/1.0"`.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    calls: Vec<String>,
    types: HashSet<String>,
    self_binding_packages: bool,
    attaching_packages: bool,
    failing: HashSet<String>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packages define their type and attach themselves to the context on load.
    pub fn with_self_binding_packages(mut self) -> Self {
        self.self_binding_packages = true;
        self
    }

    /// Packages attach an instance on load but leave their type undefined.
    pub fn with_attaching_packages(mut self) -> Self {
        self.attaching_packages = true;
        self
    }

    /// Any load of `name` fails.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn record(&mut self, kind: &'static str, name: &str) -> Result<()> {
        self.calls.push(format!("{}:{}", kind, name));
        debug!("Dry-run load {} {}", kind, name);
        if self.failing.contains(name) {
            return Err(AutowireError::loader(name, "simulated load failure"));
        }
        self.types.insert(name.to_string());
        Ok(())
    }

    fn instance(kind: &'static str, name: &str) -> Instance {
        Box::new(LoadedModule {
            kind,
            name: name.to_string(),
        })
    }
}

impl ModuleLoader for RecordingLoader {
    fn type_exists(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    fn load_base(&mut self, type_name: &str) -> Result<()> {
        self.record("base", type_name)
    }

    fn load_data_access(&mut self, name: &str) -> Result<Instance> {
        self.record("model", name)?;
        Ok(Self::instance("model", name))
    }

    fn load_library(&mut self, name: &str) -> Result<Instance> {
        self.record("library", name)?;
        Ok(Self::instance("library", name))
    }

    fn load_helper(&mut self, name: &str) -> Result<()> {
        self.record("helper", name)
    }

    fn load_package(&mut self, spec: &str, context: &mut ExecutionContext) -> Result<()> {
        self.calls.push(format!("package:{}", spec));
        let name = spec.split('/').next().unwrap_or(spec);
        if self.failing.contains(name) {
            return Err(AutowireError::loader(spec, "simulated package failure"));
        }
        if self.self_binding_packages {
            self.types.insert(name.to_string());
        }
        if self.self_binding_packages || self.attaching_packages {
            context.attach(name, Self::instance("package", name));
        }
        Ok(())
    }
}
