//! Serve command: loads configuration, assembles the host collaborators and
//! runs the HTTP server in the foreground.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use stepwise_core::{
    FileStore, Host, LogGradeSink, MemoryStore, MemoryUserDirectory, StateStore,
    StaticCourseSettings,
};
use stepwise_server::{AppState, ServerConfig, StepwiseServer};
use tracing::info;

use crate::config::{ConfigLoader, StepwiseConfig, StorageBackend};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Keep state as JSON files under this directory (overrides config)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory
    #[arg(long, conflicts_with = "data_dir")]
    pub memory: bool,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut StepwiseConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.backend = StorageBackend::File;
            config.storage.data_dir = dir.clone();
        }
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    args.apply(&mut config);

    let host = build_host(&config);
    let state = Arc::new(AppState::with_host(host, config.widget.clone()));
    let server = StepwiseServer::with_state(
        ServerConfig::new(config.server.host.clone(), config.server.port),
        state,
    );

    info!(
        "Starting stepwise server on {}:{} (environment: {}, storage: {:?})",
        config.server.host, config.server.port, config.widget.environment, config.storage.backend
    );

    server.run().await.map_err(Into::into)
}

/// Assemble host collaborators for the configured storage backend
fn build_host(config: &StepwiseConfig) -> Host {
    let store: Arc<dyn StateStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => {
            info!("Storing state under {}", config.storage.data_dir.display());
            Arc::new(FileStore::new(&config.storage.data_dir))
        }
    };
    let courses = StaticCourseSettings::new(
        config
            .courses
            .iter()
            .map(|(id, layer)| (id.clone(), layer.clone()))
            .collect(),
    );

    Host::new(
        store,
        Arc::new(LogGradeSink::new()),
        Arc::new(MemoryUserDirectory::new()),
        Arc::new(courses),
    )
}
