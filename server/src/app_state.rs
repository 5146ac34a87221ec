use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use vidl_core::config::Config;

pub struct AppState {
    pub config: Config,
    pub download_dir: Utf8PathBuf,
}

impl AppState {
    pub fn yt_dlp_bin_path(&self) -> Option<&Utf8Path> {
        self.config
            .bin_paths
            .as_ref()
            .and_then(|bp| bp.yt_dlp.as_deref())
    }

    pub fn ffmpeg_bin_path(&self) -> Option<&Utf8Path> {
        self.config
            .bin_paths
            .as_ref()
            .and_then(|bp| bp.ffmpeg.as_deref())
    }

    pub fn ffprobe_bin_path(&self) -> Option<&Utf8Path> {
        self.config
            .bin_paths
            .as_ref()
            .and_then(|bp| bp.ffprobe.as_deref())
    }
}

pub type SharedState = Arc<AppState>;
