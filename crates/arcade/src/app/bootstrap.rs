use std::process::ExitCode;

use engine::{resolve_app_paths, EngineConfig, FsAssetSource};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use super::demo::DemoGame;

pub(crate) const WINDOW_TITLE: &str = "Pixelcade";

pub(crate) struct AppWiring {
    pub(crate) config: EngineConfig,
    pub(crate) source: FsAssetSource,
    pub(crate) game: DemoGame,
}

pub(crate) fn build_app() -> Result<AppWiring, ExitCode> {
    init_tracing();
    info!("=== Pixelcade Startup ===");

    let paths = resolve_app_paths().map_err(|err| {
        error!(error = %err, "root_resolution_failed");
        ExitCode::FAILURE
    })?;
    let config = EngineConfig::load_or_default(&paths.config_path).map_err(|err| {
        error!(error = %err, "config_load_failed");
        ExitCode::FAILURE
    })?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "paths_resolved"
    );

    Ok(AppWiring {
        config,
        source: FsAssetSource::new(paths.assets_dir),
        game: DemoGame::new(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
