/// Directory and file naming conventions shared by the config defaults and the classifier.

// Directories under the application root
pub const APPLICATION_ROOT: &str = "application";
pub const CONTROLLERS_DIR: &str = "controllers";
pub const MODELS_DIR: &str = "models";
pub const LIBRARIES_DIR: &str = "libraries";
pub const HELPERS_DIR: &str = "helpers";

// Versioned packages live beside the application root, one directory per package
pub const PACKAGE_ROOT: &str = "sparks";
pub const PACKAGE_DESCRIPTOR: &str = "spark.info";

pub const SOURCE_EXTENSION: &str = "php";

// Handler syntax: `$this->name->method()`
pub const RECEIVER: &str = "$this";
pub const ACCESSOR: &str = "->";
pub const METHOD_KEYWORD: &str = "function";

/// Type the loader must have available before any data-access module is constructed.
pub const DATA_ACCESS_BASE: &str = "Model";

pub const DEFAULT_LOG_DIRECTIVE: &str = "autowire=info";
pub const DEFAULT_CONFIG_FILE: &str = "autowire.toml";
