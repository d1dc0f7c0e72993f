use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::{AppWiring, WINDOW_TITLE};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(WINDOW_TITLE, app.config, app.source, app.game) {
        error!(kind = ?err.kind(), error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
