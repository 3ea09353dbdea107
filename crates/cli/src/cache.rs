use clap::Subcommand;
use modroute_core::RegistryConfig;
use modroute_core::cache::FileCache;
use modroute_core::config::CacheConfig;
use modroute_core::logging::Logger;
use tracing::info;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show where cached answers are kept
    Info,
    /// Remove every cached answer
    Clear,
}

pub fn run(
    cmd: CacheCommands,
    config: &RegistryConfig,
    log: &Logger,
) -> Result<(), Box<dyn std::error::Error>> {
    match (&config.cache, cmd) {
        (CacheConfig::File { dir }, CacheCommands::Info) => {
            println!("Cache Directory: {}", dir.display());
            let files = std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0);
            println!("Namespaces:      {}", files);
        }
        (CacheConfig::File { dir }, CacheCommands::Clear) => {
            let cache = FileCache::new(dir.clone(), log.child("cache"))?;
            cache.clear_all()?;
            log.in_scope(|| info!(dir = %dir.display(), "Cleared file cache"));
            println!("Cleared cache at {}", dir.display());
        }
        (CacheConfig::Memory, _) => {
            println!("Cache is in-memory; nothing persists between runs.");
        }
        (CacheConfig::Disabled, _) => {
            println!("Caching is disabled.");
        }
    }
    Ok(())
}
