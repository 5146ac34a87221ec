use std::process::Stdio;

use async_trait::async_trait;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::util::sanitize_filename;

use super::{DownloadJob, DownloadedMedia, ExtractorTrait, MediaProbe};

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("error starting yt-dlp")]
    ErrorStarting(#[source] std::io::Error),
    #[error("error waiting for yt-dlp")]
    ErrorRunning(#[source] std::io::Error),
    /// The tool itself rejected the URL (unsupported site, removed video,
    /// geo block, network trouble). The message is client-facing.
    #[error("{0}")]
    Tool(String),
    #[error("error parsing yt-dlp output")]
    Parse(#[from] serde_json::Error),
    #[error("yt-dlp reported no output file")]
    NoOutputFile,
    #[error("error renaming downloaded file")]
    Rename(#[source] std::io::Error),
}

pub struct YtDlp {}

#[async_trait]
impl ExtractorTrait for YtDlp {
    #[instrument(err, name = "yt-dlp probe", skip(yt_dlp_bin_path))]
    async fn probe(url: &str, yt_dlp_bin_path: Option<&Path>) -> Result<MediaProbe, ExtractError> {
        let mut command = base_command(yt_dlp_bin_path);
        command.args(["-J", "--no-playlist", "--no-warnings"]).arg(url);
        debug!(command = ?command.as_std(), "Invoking yt-dlp");
        let output = run_to_completion(command).await?;
        let probe = serde_json::from_slice(&output.stdout)?;
        Ok(probe)
    }

    #[instrument(err, name = "yt-dlp download", skip(yt_dlp_bin_path))]
    async fn download(
        job: &DownloadJob<'_>,
        yt_dlp_bin_path: Option<&Path>,
    ) -> Result<DownloadedMedia, ExtractError> {
        let mut command = base_command(yt_dlp_bin_path);
        command.args(["--no-playlist", "--no-warnings"]);
        if job.is_audio_only() {
            command.args(["-f", "bestaudio/best"]);
            command.args(["-x", "--audio-format", "mp3", "--audio-quality", "192K"]);
        } else {
            command.args(["-f", job.format]);
        }
        command
            .arg("-o")
            .arg(format!("{}/%(title)s-%(format_id)s.%(ext)s", job.download_dir));
        // after_move prints run once the file is at its final location,
        // in the order the flags are given
        command.args([
            "--print",
            "after_move:filepath",
            "--print",
            "after_move:title",
            "--print",
            "after_move:duration",
            "--print",
            "after_move:thumbnail",
        ]);
        command.arg(job.url);
        debug!(command = ?command.as_std(), "Invoking yt-dlp");
        let output = run_to_completion(command).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let media = parse_download_output(&stdout)?;
        finalize_download(media, job.is_audio_only()).await
    }
}

fn base_command(yt_dlp_bin_path: Option<&Path>) -> Command {
    let mut command = Command::new(yt_dlp_bin_path.map(|p| p.as_str()).unwrap_or("yt-dlp"));
    command
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

async fn run_to_completion(mut command: Command) -> Result<std::process::Output, ExtractError> {
    let child = command.spawn().map_err(ExtractError::ErrorStarting)?;
    let output = child
        .wait_with_output()
        .await
        .map_err(ExtractError::ErrorRunning)?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(ExtractError::Tool(tool_error_message(&output.stderr)))
    }
}

/// Last meaningful stderr line, without the tool's `ERROR:` prefix.
fn tool_error_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("ERROR:").map(str::trim).unwrap_or(line))
        .unwrap_or("yt-dlp could not complete the operation")
        .to_owned()
}

/// Parse the four `after_move` lines: filepath, title, duration, thumbnail.
/// Missing fields print as `NA`.
fn parse_download_output(stdout: &str) -> Result<DownloadedMedia, ExtractError> {
    let mut lines = stdout.lines().map(str::trim);
    let file_path = match lines.next() {
        Some(path) if !path.is_empty() && path != "NA" => PathBuf::from(path),
        _ => return Err(ExtractError::NoOutputFile),
    };
    let title = lines.next().and_then(printed_field);
    let duration = lines
        .next()
        .and_then(printed_field)
        .and_then(|d| d.parse().ok());
    let thumbnail = lines.next().and_then(printed_field);
    let filename = file_path
        .file_name()
        .ok_or(ExtractError::NoOutputFile)?
        .to_owned();
    Ok(DownloadedMedia {
        filename,
        path: file_path,
        title,
        duration,
        thumbnail,
    })
}

fn printed_field(line: &str) -> Option<String> {
    match line {
        "" | "NA" => None,
        value => Some(value.to_owned()),
    }
}

/// Rename the produced file to its sanitized name. Audio-only downloads are
/// forced to a `.mp3` name to match the transcoded contents.
async fn finalize_download(
    media: DownloadedMedia,
    audio_only: bool,
) -> Result<DownloadedMedia, ExtractError> {
    let mut clean = sanitize_filename(&media.filename);
    if clean.is_empty() {
        clean = "download".to_owned();
    }
    if audio_only && !clean.ends_with(".mp3") {
        let stem = clean
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_owned())
            .unwrap_or_else(|| clean.clone());
        clean = format!("{stem}.mp3");
    }
    if clean == media.filename {
        return Ok(media);
    }
    let clean_path = match media.path.parent() {
        Some(parent) => parent.join(&clean),
        None => PathBuf::from(&clean),
    };
    tokio::fs::rename(&media.path, &clean_path)
        .await
        .map_err(ExtractError::Rename)?;
    Ok(DownloadedMedia {
        filename: clean,
        path: clean_path,
        ..media
    })
}

#[cfg(any(test, feature = "mock-commands"))]
pub struct YtDlpMock {}

#[cfg(any(test, feature = "mock-commands"))]
#[async_trait]
impl ExtractorTrait for YtDlpMock {
    async fn probe(
        _url: &str,
        _yt_dlp_bin_path: Option<&Path>,
    ) -> Result<MediaProbe, ExtractError> {
        Ok(MediaProbe {
            title: Some("mock title".to_owned()),
            duration: Some(60.0),
            thumbnail: None,
            formats: Vec::default(),
        })
    }

    async fn download(
        job: &DownloadJob<'_>,
        _yt_dlp_bin_path: Option<&Path>,
    ) -> Result<DownloadedMedia, ExtractError> {
        let filename = match job.is_audio_only() {
            true => "mock-download.mp3",
            false => "mock-download.mp4",
        };
        let path = job.download_dir.join(filename);
        tokio::fs::write(&path, b"").await.map_err(ExtractError::ErrorRunning)?;
        Ok(DownloadedMedia {
            filename: filename.to_owned(),
            path,
            title: Some("mock title".to_owned()),
            duration: Some(60.0),
            thumbnail: None,
        })
    }
}

#[cfg(test)]
mod test {
    use claims::{assert_matches, assert_ok};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn download_output_parses_all_fields() {
        let stdout = "/data/downloads/My Video-137.mp4\nMy Video\n213.5\nhttps://i.ytimg.com/vi/x/hq.jpg\n";
        let media = assert_ok!(parse_download_output(stdout));
        assert_eq!(media.filename, "My Video-137.mp4");
        assert_eq!(media.title.as_deref(), Some("My Video"));
        assert_eq!(media.duration, Some(213.5));
        assert_eq!(
            media.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/x/hq.jpg")
        );
    }

    #[test]
    fn na_fields_become_none() {
        let stdout = "/data/downloads/clip-22.mp4\nNA\nNA\nNA\n";
        let media = assert_ok!(parse_download_output(stdout));
        assert_eq!(media.title, None);
        assert_eq!(media.duration, None);
        assert_eq!(media.thumbnail, None);
    }

    #[test]
    fn missing_filepath_is_an_error() {
        assert_matches!(
            parse_download_output(""),
            Err(ExtractError::NoOutputFile)
        );
        assert_matches!(
            parse_download_output("NA\n"),
            Err(ExtractError::NoOutputFile)
        );
    }

    #[test]
    fn tool_error_message_takes_last_stderr_line() {
        let stderr = b"WARNING: something minor\nERROR: Unsupported URL: https://example.com\n";
        assert_eq!(
            tool_error_message(stderr),
            "Unsupported URL: https://example.com"
        );
        assert_eq!(
            tool_error_message(b""),
            "yt-dlp could not complete the operation"
        );
    }

    #[tokio::test]
    async fn finalize_renames_to_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Path::from_path(dir.path()).unwrap();
        let original = dir_path.join("My Video (1080p)-137.mp4");
        tokio::fs::write(&original, b"data").await.unwrap();
        let media = DownloadedMedia {
            filename: "My Video (1080p)-137.mp4".to_owned(),
            path: original.clone(),
            title: None,
            duration: None,
            thumbnail: None,
        };
        let finalized = assert_ok!(finalize_download(media, false).await);
        assert_eq!(finalized.filename, "MyVideo1080p-137.mp4");
        assert!(finalized.path.exists());
        assert!(!original.exists());
    }

    #[tokio::test]
    async fn audio_only_download_is_forced_to_mp3_name() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Path::from_path(dir.path()).unwrap();
        let original = dir_path.join("song-251.opus");
        tokio::fs::write(&original, b"data").await.unwrap();
        let media = DownloadedMedia {
            filename: "song-251.opus".to_owned(),
            path: original,
            title: None,
            duration: None,
            thumbnail: None,
        };
        let finalized = assert_ok!(finalize_download(media, true).await);
        assert_eq!(finalized.filename, "song-251.mp3");
    }
}
