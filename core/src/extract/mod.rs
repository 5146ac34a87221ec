//! Boundary to the external extraction engine (yt-dlp). Everything the
//! engine reports stays raw (`serde_json::Value`) until the catalog
//! normalizer has had a look at it.

mod ytdlp;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use serde::Deserialize;

pub use ytdlp::ExtractError;
pub use ytdlp::YtDlp;
#[cfg(any(test, feature = "mock-commands"))]
pub use ytdlp::YtDlpMock;

/// Format selector that switches a download into audio-only mode.
pub const AUDIO_ONLY_FORMAT: &str = "bestaudio";

/// Metadata for a URL, resolved without downloading anything.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaProbe {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct DownloadJob<'a> {
    pub url: &'a str,
    /// yt-dlp format selector: a format id from the catalog, a container
    /// preference, or [`AUDIO_ONLY_FORMAT`].
    pub format: &'a str,
    pub download_dir: &'a Path,
}

impl DownloadJob<'_> {
    pub fn is_audio_only(&self) -> bool {
        self.format == AUDIO_ONLY_FORMAT
    }
}

/// A finished download: where the file ended up plus the metadata the
/// extractor reported alongside it.
#[derive(Debug, Clone)]
pub struct DownloadedMedia {
    pub filename: String,
    pub path: PathBuf,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
}

#[async_trait::async_trait]
pub trait ExtractorTrait {
    async fn probe(url: &str, yt_dlp_bin_path: Option<&Path>) -> Result<MediaProbe, ExtractError>;

    async fn download(
        job: &DownloadJob<'_>,
        yt_dlp_bin_path: Option<&Path>,
    ) -> Result<DownloadedMedia, ExtractError>;
}
