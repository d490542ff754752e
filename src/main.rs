use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use autowire::constants::DEFAULT_CONFIG_FILE;
use autowire::{
    logging, Autowirer, CandidateName, Config, ExecutionContext, RecordingLoader, Scanner,
};

#[derive(Parser)]
#[command(name = "autowire")]
#[command(about = "Discover and classify the collaborators a request handler uses")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (TOML). Defaults to autowire.toml under --root when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Working root the application and package directories are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the candidate names referenced in a source file
    Scan {
        /// Path to the handler source file
        #[arg(long)]
        controller: PathBuf,
        /// Only scan this method's body
        #[arg(long)]
        method: Option<String>,
    },
    /// Classify one or more names against the directory layout
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Check that every name a handler references resolves, without loading anything
    Check {
        /// Handler class name, resolved to <controllers>/<class>.<ext>
        #[arg(long)]
        controller: String,
        /// Only check this method's body
        #[arg(long)]
        method: Option<String>,
    },
    /// Perform a full pass with a dry-run loader and print what would be bound
    Run {
        /// Handler class name, resolved to <controllers>/<class>.<ext>
        #[arg(long)]
        controller: String,
        #[arg(long)]
        method: String,
    },
}

fn load_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path).with_context(|| format!("loading {}", path.display()));
    }
    let default_path = root.join(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        debug!("Using config {}", default_path.display());
        return Ok(Config::load(&default_path)?);
    }
    Ok(Config::default())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref());

    let config = load_config(cli.config.as_deref(), &cli.root)?;

    match cli.command {
        Commands::Scan { controller, method } => {
            let bytes =
                fs::read(&controller).with_context(|| format!("reading {}", controller.display()))?;
            let source = String::from_utf8_lossy(&bytes);
            let scanner = Scanner::new(&config.syntax)?;
            let names: Vec<CandidateName> = scanner.scan(&source, method.as_deref()).collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in &names {
                    println!("{}", name);
                }
            }
        }
        Commands::Classify { names } => {
            let wirer = Autowirer::on_disk(&config, &cli.root)?;
            let mut failed = 0usize;
            for name in names {
                let name = CandidateName::new(name);
                match wirer.classify(&name) {
                    Ok(classification) if cli.json => {
                        println!("{}", serde_json::to_string(&classification)?)
                    }
                    Ok(classification) => println!("{}\t{}", name, classification.kind),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}\terror: {}", name, e);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} name(s) could not be classified", failed);
            }
        }
        Commands::Check { controller, method } => {
            let wirer = Autowirer::on_disk(&config, &cli.root)?;
            let resolutions = match wirer.resolve(&controller, method.as_deref())? {
                Some(resolutions) => resolutions,
                None => anyhow::bail!(
                    "No handler source at {}",
                    wirer.layout().handler_source(&controller).display()
                ),
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resolutions)?);
            } else {
                for resolution in &resolutions {
                    match (&resolution.kind, &resolution.error) {
                        (Some(kind), _) => println!("{}\t{}", resolution.name, kind),
                        (None, Some(e)) => println!("{}\terror: {}", resolution.name, e),
                        (None, None) => println!("{}\t-", resolution.name),
                    }
                }
            }
            let unresolved = resolutions.iter().filter(|r| !r.is_resolved()).count();
            if unresolved > 0 {
                anyhow::bail!("{} name(s) in {} do not resolve", unresolved, controller);
            }
        }
        Commands::Run { controller, method } => {
            let wirer = Autowirer::on_disk(&config, &cli.root)?;
            let mut context = ExecutionContext::new();
            let mut loader = RecordingLoader::new();
            let report = wirer.run(&mut context, &mut loader, &controller, &method)?;
            info!("Dry run complete");

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if !report.source_found {
                println!(
                    "No handler source at {}; nothing to bind",
                    wirer.layout().handler_source(&controller).display()
                );
            } else {
                println!("Handler {}::{}", report.handler, report.method);
                for entry in &report.entries {
                    let kind = entry
                        .kind
                        .as_ref()
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("   {:<24} {:<24} {:?}", entry.name.as_str(), kind, entry.outcome);
                }
                println!("Loader calls:");
                for call in loader.calls() {
                    println!("   {}", call);
                }
            }
        }
    }

    Ok(())
}
