//! Lazy collaborator binding for request handlers.
//!
//! Before a handler method runs, its source is scanned for chained accesses such as
//! `$this->mailer->send()`. Each referenced name is classified by probing the application
//! directories (models, libraries, helpers) and, failing that, a versioned package tree.
//! The result is handed to the framework's module loader and bound onto the request's
//! [`ExecutionContext`].
//!
//! ```no_run
//! use std::path::Path;
//! use autowire::{Autowirer, Config, ExecutionContext, RecordingLoader};
//!
//! let wirer = Autowirer::on_disk(&Config::default(), Path::new(".")).unwrap();
//! let mut context = ExecutionContext::new();
//! let mut loader = RecordingLoader::new();
//! let report = wirer.run(&mut context, &mut loader, "users", "index").unwrap();
//! println!("{} collaborator(s)", report.entries.len());
//! ```

pub mod binder;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod infra;
pub mod locator;
pub mod logging;
pub mod orchestrator;
pub mod ports;
pub mod scanner;
pub mod types;

pub use binder::{BindOutcome, Binder};
pub use classifier::{select_version, Classifier, ClassifyOptions};
pub use config::{Config, FailurePolicy, Layout, SyntaxConfig, VersionSelection};
pub use context::{ExecutionContext, Instance};
pub use error::{AutowireError, Result};
pub use infra::{LoadedModule, RecordingLoader};
pub use locator::{DiskLocator, InMemoryLocator, ModuleLocator};
pub use orchestrator::{Autowirer, BindReport, ReportEntry, Resolution};
pub use ports::ModuleLoader;
pub use scanner::{scan, Candidates, Scanner};
pub use types::{CandidateName, Classification, LocalKind, ModuleKind};
