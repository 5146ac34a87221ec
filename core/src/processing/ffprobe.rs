use std::process::Stdio;

use async_trait::async_trait;
use camino::Utf8Path as Path;
use eyre::{bail, eyre, Context, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

// ffprobe prints numbers as strings in its json writer
#[derive(Debug, Clone, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[async_trait]
pub trait FFProbeTrait {
    async fn duration(path: &Path, ffprobe_bin_path: Option<&Path>) -> Result<f64>;
}

pub struct FFProbe {}

#[async_trait]
impl FFProbeTrait for FFProbe {
    #[instrument(err, name = "ffprobe", skip(ffprobe_bin_path))]
    async fn duration(path: &Path, ffprobe_bin_path: Option<&Path>) -> Result<f64> {
        let mut command =
            Command::new(ffprobe_bin_path.map(|p| p.as_str()).unwrap_or("ffprobe"));
        command
            .kill_on_drop(true)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(command = ?command.as_std(), "Invoking ffprobe");
        let child = command.spawn().wrap_err("Error starting ffprobe")?;
        let output = child
            .wait_with_output()
            .await
            .wrap_err("error waiting for ffprobe")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("ffprobe exited with an error:\n{}", stderr.trim_end());
        }
        parse_duration(&output.stdout)
    }
}

fn parse_duration(stdout: &[u8]) -> Result<f64> {
    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).wrap_err("error parsing ffprobe output")?;
    parsed
        .format
        .duration
        .ok_or_else(|| eyre!("ffprobe reported no duration"))?
        .parse()
        .wrap_err("error parsing duration reported by ffprobe")
}

#[cfg(any(test, feature = "mock-commands"))]
pub struct FFProbeMock {}

#[cfg(any(test, feature = "mock-commands"))]
#[async_trait]
impl FFProbeTrait for FFProbeMock {
    async fn duration(_path: &Path, _ffprobe_bin_path: Option<&Path>) -> Result<f64> {
        Ok(60.0)
    }
}
