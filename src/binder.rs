use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::DATA_ACCESS_BASE;
use crate::context::{ExecutionContext, Instance};
use crate::error::Result;
use crate::ports::ModuleLoader;
use crate::types::{Classification, LocalKind, ModuleKind};

/// What a bind (or a skipped candidate) amounted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindOutcome {
    /// An instance now sits on the context under the candidate's name.
    Attached,
    /// Helper functions were registered; nothing attached.
    HelperRegistered,
    /// The package loader provided the type itself.
    LoadedByPackage,
    /// The name was already resolved earlier in this pass; the loader was not called.
    AlreadyBound,
    /// Classification failed and the pass is running with the skip policy.
    Skipped { reason: String },
}

/// Hands classified candidates to the module loader and records the result on the context.
pub struct Binder<'a> {
    loader: &'a mut dyn ModuleLoader,
}

impl<'a> Binder<'a> {
    pub fn new(loader: &'a mut dyn ModuleLoader) -> Self {
        Self { loader }
    }

    pub fn bind(
        &mut self,
        context: &mut ExecutionContext,
        classification: &Classification,
    ) -> Result<BindOutcome> {
        let name = classification.name.as_str();
        if context.is_resolved(name) {
            debug!("{} already bound in this pass", name);
            return Ok(BindOutcome::AlreadyBound);
        }

        let outcome = match &classification.kind {
            ModuleKind::DataAccess => self.bind_local(context, name, LocalKind::DataAccess)?,
            ModuleKind::Library => self.bind_local(context, name, LocalKind::Library)?,
            ModuleKind::Helper => self.bind_local(context, name, LocalKind::Helper)?,
            ModuleKind::Package { sub_kind, version } => {
                let spec = format!("{}/{}", name, version);
                info!("Loading package {}", spec);
                self.loader.load_package(&spec, context)?;

                let attached = context.is_bound(name);
                if attached || self.loader.type_exists(name) {
                    if !attached && *sub_kind != LocalKind::Helper {
                        debug!("Package {} provided type {} without attaching it", spec, name);
                    }
                    BindOutcome::LoadedByPackage
                } else {
                    debug!("Package {} did not provide {}; loading as {}", spec, name, sub_kind);
                    self.bind_local(context, name, *sub_kind)?
                }
            }
        };

        context.mark_resolved(name);
        Ok(outcome)
    }

    fn bind_local(
        &mut self,
        context: &mut ExecutionContext,
        name: &str,
        kind: LocalKind,
    ) -> Result<BindOutcome> {
        match kind {
            LocalKind::DataAccess => {
                if !self.loader.type_exists(DATA_ACCESS_BASE) {
                    debug!("Loading data-access base {}", DATA_ACCESS_BASE);
                    self.loader.load_base(DATA_ACCESS_BASE)?;
                }
                let instance = self.loader.load_data_access(&name.to_lowercase())?;
                Ok(attach(context, name, instance, "model"))
            }
            LocalKind::Library => {
                let instance = self.loader.load_library(name)?;
                Ok(attach(context, name, instance, "library"))
            }
            LocalKind::Helper => {
                self.loader.load_helper(name)?;
                context.register_helper(name);
                info!("Registered helper {}", name);
                Ok(BindOutcome::HelperRegistered)
            }
        }
    }
}

/// The first binding under a name wins; a later instance is dropped.
fn attach(
    context: &mut ExecutionContext,
    name: &str,
    instance: Instance,
    kind: &str,
) -> BindOutcome {
    if context.attach(name, instance) {
        info!("Bound {} {}", kind, name);
        BindOutcome::Attached
    } else {
        warn!("{} was already attached; discarding the new {} instance", name, kind);
        BindOutcome::AlreadyBound
    }
}
