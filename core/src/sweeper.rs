//! Retention sweep over the download directory. Downloads are throwaway
//! artifacts; anything older than the configured age is deleted on a fixed
//! tick. The task is fire-and-forget: it reports through logs only and never
//! exits on its own.

use std::time::Duration;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::SweepConfig;

pub fn spawn(download_dir: PathBuf, config: SweepConfig) -> JoinHandle<()> {
    tokio::spawn(run_sweeper(download_dir, config))
}

async fn run_sweeper(download_dir: PathBuf, config: SweepConfig) {
    let mut interval = tokio::time::interval(config.interval);
    loop {
        interval.tick().await;
        match sweep_once(&download_dir, config.max_file_age).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "removed expired downloads"),
            // never let a failed sweep end the task, the next tick retries
            Err(report) => error!("error sweeping download directory: {:?}", report),
        }
    }
}

/// One pass over the directory. The listing is a point-in-time snapshot;
/// files vanishing mid-sweep (served-and-deleted elsewhere, or a concurrent
/// sweep) are skipped, and per-file errors never fail the pass.
#[instrument(skip(max_file_age))]
pub async fn sweep_once(download_dir: &Path, max_file_age: Duration) -> Result<usize> {
    let max_file_age = chrono::Duration::from_std(max_file_age)
        .wrap_err("retention window out of range")?;
    let now = Utc::now();
    let mut entries = tokio::fs::read_dir(download_dir)
        .await
        .wrap_err_with(|| format!("error listing download directory {}", download_dir))?;
    let mut removed: usize = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!("error reading directory entry: {}", err);
                continue;
            }
        };
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), "could not stat file, skipping: {}", err);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(modified) => modified.into(),
            Err(err) => {
                warn!(path = %path.display(), "no modification time, skipping: {}", err);
                continue;
            }
        };
        if now - modified > max_file_age {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!(path = %path.display(), "removed expired download");
                    removed += 1;
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(path = %path.display(), "could not remove file: {}", err);
                }
            }
        }
    }
    Ok(removed)
}
