//! Clip editing on downloaded artifacts: trim, split, caption burn-in and
//! container export, all expressed as ffmpeg flag vectors.
//!
//! Every operation writes to a temporary sibling first and only renames over
//! (or next to) the source once the tool reports success, so a failed run
//! never clobbers an existing file.

use std::ffi::OsString;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use eyre::{ensure, eyre, Context, Result};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::ffmpeg::FFmpegTrait;
use super::ffprobe::FFProbeTrait;

/// A time window in seconds into a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.start >= 0.0, "start must not be negative");
        ensure!(self.end > self.start, "end must be after start");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub text: String,
    pub window: ClipWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    Webm,
    Mkv,
    Mov,
    Mp3,
    M4a,
    Opus,
    Wav,
}

impl ExportFormat {
    pub fn is_audio(&self) -> bool {
        matches!(
            self,
            ExportFormat::Mp3 | ExportFormat::M4a | ExportFormat::Opus | ExportFormat::Wav
        )
    }

    pub fn ext(&self) -> String {
        self.to_string()
    }
}

/// Trim the file down to `window` in place, stream-copied.
pub async fn cut_clip<F: FFmpegTrait + Send + Sync>(
    path: &Path,
    window: &ClipWindow,
    ffmpeg_bin_path: Option<&Path>,
) -> Result<()> {
    window.validate()?;
    let (pre_input_flags, flags) = cut_flags(window);
    replace_in_place::<F>(path, pre_input_flags, flags, ffmpeg_bin_path).await
}

/// Burn a text overlay into the video for the overlay's time window.
/// Re-encodes video, copies audio, replaces the file in place.
pub async fn overlay_comment<F: FFmpegTrait + Send + Sync>(
    path: &Path,
    overlay: &Overlay,
    ffmpeg_bin_path: Option<&Path>,
) -> Result<()> {
    overlay.window.validate()?;
    ensure!(!overlay.text.trim().is_empty(), "overlay text is empty");
    replace_in_place::<F>(path, Vec::new(), overlay_flags(overlay), ffmpeg_bin_path).await
}

/// Split the file into `segments` equal-length stream-copied parts named
/// `<stem>-part<i>.<ext>`. The source file is left untouched.
pub async fn divide_clip<F: FFmpegTrait + Send + Sync, P: FFProbeTrait>(
    path: &Path,
    segments: u32,
    ffmpeg_bin_path: Option<&Path>,
    ffprobe_bin_path: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    ensure!(segments >= 2, "need at least two segments");
    let duration = P::duration(path, ffprobe_bin_path).await?;
    ensure!(duration > 0.0, "media has no duration to divide");
    let segment_len = duration / segments as f64;
    let (parent, stem, ext) = split_path(path)?;

    let mut produced: Vec<PathBuf> = Vec::new();
    for i in 0..segments {
        let out = parent.join(format!("{stem}-part{}.{ext}", i + 1));
        let pre_input_flags: Vec<OsString> = vec![
            "-ss".into(),
            (i as f64 * segment_len).to_string().into(),
        ];
        let flags: Vec<OsString> = vec![
            "-t".into(),
            segment_len.to_string().into(),
            "-c".into(),
            "copy".into(),
        ];
        let tmp = temp_sibling(&out)?;
        let result = F::new(pre_input_flags, flags)
            .run(path, &tmp, ffmpeg_bin_path)
            .await;
        match result {
            Ok(()) => {
                tokio::fs::rename(&tmp, &out)
                    .await
                    .wrap_err("error moving finished segment into place")?;
                produced.push(out);
            }
            Err(report) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                for done in &produced {
                    let _ = tokio::fs::remove_file(done).await;
                }
                return Err(report).wrap_err(format!("error producing segment {}", i + 1));
            }
        }
    }
    Ok(produced)
}

/// Convert the file into the requested container as `<stem>.<ext>`.
pub async fn export_clip<F: FFmpegTrait + Send + Sync>(
    path: &Path,
    format: ExportFormat,
    ffmpeg_bin_path: Option<&Path>,
) -> Result<PathBuf> {
    let (parent, stem, _ext) = split_path(path)?;
    let out = parent.join(format!("{stem}.{}", format.ext()));
    ensure!(out.as_path() != path, "file is already in the requested format");
    let flags: Vec<OsString> = match format.is_audio() {
        true => vec!["-vn".into()],
        false => Vec::new(),
    };
    let tmp = temp_sibling(&out)?;
    match F::new(Vec::new(), flags).run(path, &tmp, ffmpeg_bin_path).await {
        Ok(()) => {
            tokio::fs::rename(&tmp, &out)
                .await
                .wrap_err("error moving exported file into place")?;
            Ok(out)
        }
        Err(report) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(report)
        }
    }
}

fn cut_flags(window: &ClipWindow) -> (Vec<OsString>, Vec<OsString>) {
    // seek before the input, then the output duration is relative to it
    let pre_input_flags: Vec<OsString> = vec!["-ss".into(), window.start.to_string().into()];
    let flags: Vec<OsString> = vec![
        "-to".into(),
        (window.end - window.start).to_string().into(),
        "-c".into(),
        "copy".into(),
    ];
    (pre_input_flags, flags)
}

fn overlay_flags(overlay: &Overlay) -> Vec<OsString> {
    let filter = format!(
        "drawtext=text='{}':x=(w-text_w)/2:y=h-text_h-40:fontsize=24:fontcolor=white:\
         borderw=2:bordercolor=black:enable='between(t,{},{})'",
        escape_drawtext(&overlay.text),
        overlay.window.start,
        overlay.window.end
    );
    vec!["-vf".into(), filter.into(), "-c:a".into(), "copy".into()]
}

/// Inside a single-quoted filtergraph string only the quote itself needs
/// handling: close, emit an escaped quote, reopen.
fn escape_drawtext(text: &str) -> String {
    text.replace('\'', r"'\''")
}

async fn replace_in_place<F: FFmpegTrait + Send + Sync>(
    path: &Path,
    pre_input_flags: Vec<OsString>,
    flags: Vec<OsString>,
    ffmpeg_bin_path: Option<&Path>,
) -> Result<()> {
    let tmp = temp_sibling(path)?;
    match F::new(pre_input_flags, flags).run(path, &tmp, ffmpeg_bin_path).await {
        Ok(()) => {
            tokio::fs::rename(&tmp, path)
                .await
                .wrap_err("error replacing file with edited version")?;
            Ok(())
        }
        Err(report) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(report)
        }
    }
}

fn split_path(path: &Path) -> Result<(&Path, &str, &str)> {
    let parent = path
        .parent()
        .ok_or_else(|| eyre!("path has no parent directory"))?;
    let stem = path
        .file_stem()
        .ok_or_else(|| eyre!("path has no file name"))?;
    // ffmpeg picks the output muxer from the extension
    let ext = path
        .extension()
        .ok_or_else(|| eyre!("file has no extension"))?;
    Ok((parent, stem, ext))
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let (parent, stem, ext) = split_path(path)?;
    Ok(parent.join(format!("{stem}.tmp-{}.{ext}", Uuid::new_v4())))
}
