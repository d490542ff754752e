use crate::context::{ExecutionContext, Instance};
use crate::error::Result;

/// The framework's module loader, which actually instantiates collaborators once their
/// kind is known.
///
/// Implementations must tolerate repeated base loads; the binder checks `type_exists`
/// first but does not remember across requests.
pub trait ModuleLoader {
    /// Whether a type with this name is currently available to the loader.
    fn type_exists(&self, type_name: &str) -> bool;

    /// Makes a base type (e.g. the data-access base) available.
    fn load_base(&mut self, type_name: &str) -> Result<()>;

    /// Constructs a data-access module; `name` is already lower-cased.
    fn load_data_access(&mut self, name: &str) -> Result<Instance>;

    /// Constructs a library; `name` keeps the case it was written with.
    fn load_library(&mut self, name: &str) -> Result<Instance>;

    /// Makes a helper bundle's free functions available.
    fn load_helper(&mut self, name: &str) -> Result<()>;

    /// Best-effort install of a versioned package given as `"name/version"`.
    ///
    /// The package's own autoloading may attach to `context`; nothing guarantees the
    /// target type exists afterwards.
    fn load_package(&mut self, spec: &str, context: &mut ExecutionContext) -> Result<()>;
}
