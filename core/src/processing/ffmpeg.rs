use std::{ffi::OsString, process::Stdio};

use async_trait::async_trait;
use camino::Utf8Path as Path;
use eyre::{eyre, Context, Result};
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(thiserror::Error, Debug)]
pub enum FFmpegError {
    #[error("Error starting FFmpeg")]
    ErrorStarting,
}

#[async_trait]
pub trait FFmpegTrait {
    fn new(pre_input_flags: Vec<OsString>, flags: Vec<OsString>) -> Self;
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        ffmpeg_bin_path: Option<&Path>,
    ) -> Result<()>;
}

pub struct FFmpeg {
    pre_input_flags: Vec<OsString>,
    flags: Vec<OsString>,
}

#[async_trait]
impl FFmpegTrait for FFmpeg {
    fn new(pre_input_flags: Vec<OsString>, flags: Vec<OsString>) -> Self {
        Self {
            pre_input_flags,
            flags,
        }
    }

    #[instrument(err, name = "ffmpeg", skip(self))]
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        ffmpeg_bin_path: Option<&Path>,
    ) -> Result<()> {
        // the child is killed if this future is dropped, e.g. on client
        // disconnect
        let mut command = Command::new(ffmpeg_bin_path.map(|p| p.as_str()).unwrap_or("ffmpeg"));
        command
            .kill_on_drop(true)
            .arg("-nostdin")
            .arg("-y")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command.args(self.pre_input_flags.iter());
        command.arg("-i").arg(input);
        command.args(self.flags.iter());
        command.arg(output);
        debug!(command = ?command.as_std(), "Invoking ffmpeg");
        let child = command.spawn().wrap_err(FFmpegError::ErrorStarting)?;
        let process_output = child
            .wait_with_output()
            .await
            .wrap_err("error waiting for ffmpeg")?;
        if process_output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&process_output.stderr);
            Err(eyre!(
                "ffmpeg exited with an error:\n{}",
                stderr.trim_end()
            ))
        }
    }
}

#[cfg(any(test, feature = "mock-commands"))]
pub struct FFmpegMock {}

#[cfg(any(test, feature = "mock-commands"))]
#[async_trait]
impl FFmpegTrait for FFmpegMock {
    fn new(_pre_input_flags: Vec<OsString>, _flags: Vec<OsString>) -> Self {
        Self {}
    }

    async fn run(
        &self,
        _input: &Path,
        output: &Path,
        _ffmpeg_bin_path: Option<&Path>,
    ) -> Result<()> {
        tokio::fs::File::create(output)
            .await
            .wrap_err("error creating mock ffmpeg output")?;
        Ok(())
    }
}
