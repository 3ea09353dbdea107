mod cache;
mod inspect;
mod resolve;

use clap::{Parser, Subcommand};
use modroute_core::logging::{Logger, init_logging};
use modroute_core::{OsFileSystem, RegistryConfig, ResolverRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "modroute",
    version,
    about = "Resolve templates, assets and routes across module directories",
    long_about = "modroute maps logical references to files contributed by an ordered set of \
                  module directories. Lower precedence values win when several modules provide \
                  the same reference; answers are cached against the module configuration."
)]
pub struct Cli {
    /// Registry configuration file
    #[arg(long, global = true, value_name = "FILE", default_value = "modroute.json")]
    pub config: PathBuf,

    /// Trust cached answers without re-checking the filesystem
    #[arg(long, global = true)]
    pub authoritative: bool,

    /// Also log to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a template or asset name to a file
    Resolve {
        /// Resolver type, e.g. "template"
        resolver: String,
        /// Reference to resolve, e.g. "layout/page.html"
        reference: String,
    },
    /// Route a request path to a controller file
    Route {
        /// Resolver type, e.g. "router"
        resolver: String,
        /// Request path, e.g. "/blog/post/42"
        request: String,
        /// Requested extension; taken from the last segment when omitted
        #[arg(long)]
        ext: Option<String>,
        /// Print the full match as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a resolver's search path in search order
    SearchPath {
        resolver: String,
    },
    /// List every route binding of a route resolver
    Routes {
        resolver: String,
    },
    /// Manage the resolver cache
    #[command(subcommand)]
    Cache(cache::CacheCommands),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (dispatch, _guard) = init_logging("cli", cli.verbose);
    let log = Logger::new(dispatch);

    let config = load_config(&cli.config, cli.authoritative)?;

    match cli.command {
        Commands::Resolve {
            resolver,
            reference,
        } => resolve::run_resolve(&mut open_registry(&config, log)?, &resolver, &reference),
        Commands::Route {
            resolver,
            request,
            ext,
            json,
        } => resolve::run_route(
            &mut open_registry(&config, log)?,
            &resolver,
            &request,
            ext.as_deref(),
            json,
        ),
        Commands::SearchPath { resolver } => {
            inspect::search_path(&mut open_registry(&config, log)?, &resolver)
        }
        Commands::Routes { resolver } => {
            inspect::routes(&mut open_registry(&config, log)?, &resolver)
        }
        Commands::Cache(cmd) => cache::run(cmd, &config, &log),
    }
}

fn open_registry(config: &RegistryConfig, log: Logger) -> modroute_core::Result<ResolverRegistry> {
    log.in_scope(|| {
        debug!(
            resolvers = config.resolvers.len(),
            modules = config.modules.len(),
            authoritative = config.authoritative,
            "Opening registry"
        )
    });
    ResolverRegistry::from_config(config, Arc::new(OsFileSystem), log)
}

fn load_config(
    path: &Path,
    authoritative: bool,
) -> Result<RegistryConfig, Box<dyn std::error::Error>> {
    let mut config = RegistryConfig::load(path)?;
    if authoritative {
        config.authoritative = true;
    }
    Ok(config)
}
