//! Log file setup. The terminal belongs to the UI, so everything goes to
//! `<data dir>/pixmorph.log`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PIXMORPH_LOG";

/// Install the global subscriber. `level` is used when `PIXMORPH_LOG` is
/// unset or invalid. Returns the log file path, or `None` when the platform
/// has no data directory.
pub fn init(level: &str) -> color_eyre::Result<Option<PathBuf>> {
    let Some(dirs) = ProjectDirs::from("", "", "pixmorph") else {
        return Ok(None);
    };
    let dir = dirs.data_dir();
    fs::create_dir_all(dir)?;
    let path = dir.join("pixmorph.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install logger: {err}"))?;

    tracing::info!("logging to {}", path.display());
    Ok(Some(path))
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
