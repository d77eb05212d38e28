use crate::config::{ConfigLoader, StorageBackend};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged, with defaults applied)
    Show,
    /// Show configuration file and data paths
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_paths(),
    }
}

fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("# CDN host: {}", config.widget.environment.cdn_host());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());

    let config = ConfigLoader::load()?;
    match config.storage.backend {
        StorageBackend::File => println!("Data dir:       {:?}", config.storage.data_dir),
        StorageBackend::Memory => println!("Data dir:       (in memory)"),
    }
    Ok(())
}
