pub mod types;
pub mod config;
pub mod error;
pub mod topology;
pub mod seeding;
pub mod bracket;
pub mod results;
pub mod standings;
pub mod event;
pub mod commands;

pub use bracket::{Bracket, Match, Slot, SlotSide};
pub use commands::Admin;
pub use error::{Error, Result};
pub use event::{Event, EventPhase, EventSnapshot};
pub use results::ResultSubmission;
pub use seeding::Seeding;
pub use standings::{Placement, Standing};
pub use topology::Topology;
pub use types::*;

use std::{fs, path::Path};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// ── Logging ────────────────────────────────────────────────────────────

/// Install the global subscriber. With a logs directory, output goes to a
/// daily rolling file and the returned guard must be held until shutdown.
/// Without one, output goes to stderr. A second call is a no-op.
pub fn init_tracing(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(logs_dir) = logs_dir else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .try_init();
        return None;
    };

    fs::create_dir_all(logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(logs_dir, "bracket.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .is_ok();
    if installed {
        info!("funmatch bracket logging to {}", logs_dir.display());
    }
    Some(guard)
}
