use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use vidl_core::catalog::{self, SelectedEncoding};
use vidl_core::extract::MediaProbe;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DownloadRequest {
    pub url: String,
    /// yt-dlp format selector: a format id from `/formats`, a container
    /// preference, or `bestaudio` for an mp3 extraction.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "mp4".to_owned()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DownloadResponse {
    pub filename: String,
    pub format: String,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FormatInfo {
    pub format_id: String,
    pub ext: String,
    pub resolution: Option<String>,
    pub filesize: Option<f64>,
    pub format_note: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoInfo {
    pub title: String,
    pub formats: Vec<FormatInfo>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatsQuery {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CutRequest {
    pub filename: String,
    /// seconds into the clip
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DivideRequest {
    pub filename: String,
    pub segments: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub filename: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub filename: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditResponse {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DivideResponse {
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub filename: String,
}

impl From<&SelectedEncoding> for FormatInfo {
    fn from(encoding: &SelectedEncoding) -> Self {
        let format_note = Some(catalog::format_label(encoding));
        let resolution = catalog::resolution(encoding);
        match encoding {
            SelectedEncoding::Video(v) => FormatInfo {
                format_id: v.format_id.clone(),
                ext: v.ext.clone(),
                resolution,
                filesize: Some(v.filesize),
                format_note,
                vcodec: Some(v.vcodec.clone()),
                acodec: Some(v.acodec.clone()),
            },
            SelectedEncoding::Audio(a) => FormatInfo {
                format_id: a.format_id.clone(),
                ext: a.ext.clone(),
                resolution,
                filesize: Some(a.filesize),
                format_note,
                vcodec: None,
                acodec: Some(a.acodec.clone()),
            },
        }
    }
}

impl VideoInfo {
    pub fn new(probe: &MediaProbe, selection: &[SelectedEncoding]) -> Self {
        VideoInfo {
            title: probe.title.clone().unwrap_or_default(),
            formats: selection.iter().map(FormatInfo::from).collect(),
            thumbnail: probe.thumbnail.clone(),
            duration: probe.duration,
        }
    }
}
