use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, info_span, warn};

use crate::binder::{BindOutcome, Binder};
use crate::classifier::{ClassifyOptions, Classifier};
use crate::config::{Config, FailurePolicy, Layout};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::locator::{DiskLocator, ModuleLocator};
use crate::ports::ModuleLoader;
use crate::scanner::{Candidates, Scanner};
use crate::types::{CandidateName, Classification, ModuleKind};

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: CandidateName,
    pub kind: Option<ModuleKind>,
    #[serde(flatten)]
    pub outcome: BindOutcome,
}

/// Summary of one pass over a handler.
#[derive(Debug, Clone, Serialize)]
pub struct BindReport {
    pub handler: String,
    pub method: String,
    /// False when the handler's source file does not exist and the pass did nothing.
    pub source_found: bool,
    pub entries: Vec<ReportEntry>,
}

impl BindReport {
    fn new(handler: &str, method: &str, source_found: bool) -> Self {
        Self {
            handler: handler.to_string(),
            method: method.to_string(),
            source_found,
            entries: Vec::new(),
        }
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, BindOutcome::Skipped { .. }))
    }
}

/// How one candidate classifies, without anything being loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub name: CandidateName,
    pub kind: Option<ModuleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs discovery, classification and binding for a handler just before it executes.
///
/// Holds no per-request state: every call re-reads the handler source and re-probes the
/// filesystem.
pub struct Autowirer {
    layout: Layout,
    scanner: Scanner,
    options: ClassifyOptions,
    policy: FailurePolicy,
    locator: Box<dyn ModuleLocator>,
}

impl Autowirer {
    pub fn new(
        config: &Config,
        working_root: &Path,
        locator: Box<dyn ModuleLocator>,
    ) -> Result<Self> {
        Ok(Self {
            layout: config.layout(working_root),
            scanner: Scanner::new(&config.syntax)?,
            options: ClassifyOptions {
                require_package_descriptor: config.require_package_descriptor,
                version_selection: config.version_selection,
            },
            policy: config.on_unresolved,
            locator,
        })
    }

    /// An autowirer probing the real filesystem under `working_root`.
    pub fn on_disk(config: &Config, working_root: &Path) -> Result<Self> {
        Self::new(config, working_root, Box::new(DiskLocator))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Candidates referenced by `method` of the handler, or `None` if the handler's source
    /// file does not exist.
    pub fn candidates(
        &self,
        handler_class: &str,
        method: Option<&str>,
    ) -> Result<Option<Candidates>> {
        let path = self.layout.handler_source(handler_class);
        let source = match self.locator.read_source(&path)? {
            Some(source) => source,
            None => {
                debug!("No handler source at {}", path.display());
                return Ok(None);
            }
        };
        Ok(Some(self.scanner.scan(&source, method)))
    }

    pub fn classify(&self, name: &CandidateName) -> Result<Classification> {
        Classifier::new(&self.layout, self.locator.as_ref(), self.options).classify(name)
    }

    /// Scans and classifies the handler's candidates without binding anything.
    ///
    /// Every candidate is reported, resolvable or not, whatever the failure policy; I/O
    /// faults still propagate. `None` means the handler's source file does not exist.
    pub fn resolve(
        &self,
        handler_class: &str,
        method: Option<&str>,
    ) -> Result<Option<Vec<Resolution>>> {
        let candidates = match self.candidates(handler_class, method)? {
            Some(candidates) => candidates,
            None => return Ok(None),
        };
        let classifier = Classifier::new(&self.layout, self.locator.as_ref(), self.options);

        let mut resolutions = Vec::with_capacity(candidates.len());
        for name in candidates {
            let resolution = match classifier.classify(&name) {
                Ok(classification) => Resolution {
                    name,
                    kind: Some(classification.kind),
                    error: None,
                },
                Err(e) if e.is_resolution_failure() => {
                    debug!("{} does not resolve: {}", name, e);
                    Resolution {
                        name,
                        kind: None,
                        error: Some(e.to_string()),
                    }
                }
                Err(e) => return Err(e),
            };
            resolutions.push(resolution);
        }
        Ok(Some(resolutions))
    }

    /// Binds every collaborator `method` references onto `context`.
    ///
    /// A missing handler source is not an error; the report comes back empty with
    /// `source_found` unset. Under the abort policy the first unresolvable name ends
    /// the pass with its error.
    pub fn run(
        &self,
        context: &mut ExecutionContext,
        loader: &mut dyn ModuleLoader,
        handler_class: &str,
        method: &str,
    ) -> Result<BindReport> {
        let span = info_span!("autowire", handler = %handler_class, method = %method);
        let _enter = span.enter();

        let candidates = match self.candidates(handler_class, Some(method))? {
            Some(candidates) => candidates,
            None => return Ok(BindReport::new(handler_class, method, false)),
        };

        let mut report = BindReport::new(handler_class, method, true);
        let classifier = Classifier::new(&self.layout, self.locator.as_ref(), self.options);
        let mut binder = Binder::new(loader);

        for name in candidates {
            if context.is_resolved(name.as_str()) {
                report.entries.push(ReportEntry {
                    name,
                    kind: None,
                    outcome: BindOutcome::AlreadyBound,
                });
                continue;
            }

            match classifier.classify(&name) {
                Ok(classification) => {
                    let outcome = binder.bind(context, &classification)?;
                    report.entries.push(ReportEntry {
                        name,
                        kind: Some(classification.kind),
                        outcome,
                    });
                }
                Err(e) if e.is_resolution_failure() && self.policy == FailurePolicy::Skip => {
                    warn!("Skipping {}: {}", name, e);
                    report.entries.push(ReportEntry {
                        name,
                        kind: None,
                        outcome: BindOutcome::Skipped {
                            reason: e.to_string(),
                        },
                    });
                }
                Err(e) => {
                    error!("Autowiring aborted at {}: {}", name, e);
                    return Err(e);
                }
            }
        }

        info!("Autowired {} collaborator(s)", report.entries.len());
        Ok(report)
    }
}
