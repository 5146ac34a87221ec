use std::time::Duration;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlDownloadDir {
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlBinPaths {
    pub yt_dlp: Option<String>,
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlSweep {
    pub max_file_age_minutes: Option<u64>,
    pub interval_minutes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    pub address: Option<String>,
    pub port: Option<u16>,
    #[serde(rename = "DownloadDir")]
    pub download_dir: Option<TomlDownloadDir>,
    #[serde(rename = "BinPaths")]
    pub bin_paths: Option<TomlBinPaths>,
    #[serde(rename = "Sweep")]
    pub sweep: Option<TomlSweep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinPaths {
    pub yt_dlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub max_file_age: Duration,
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            max_file_age: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub download_dir: PathBuf,
    pub bin_paths: Option<BinPaths>,
    pub sweep: SweepConfig,
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    parse_config(&toml_str)
}

fn parse_config(toml_str: &str) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    let download_dir = toml_config
        .download_dir
        .map(|d| PathBuf::from(d.path))
        .unwrap_or_else(|| PathBuf::from("./downloads"));
    let bin_paths = toml_config.bin_paths.map(|bin_paths| BinPaths {
        yt_dlp: bin_paths.yt_dlp.map(PathBuf::from),
        ffmpeg: bin_paths.ffmpeg.map(PathBuf::from),
        ffprobe: bin_paths.ffprobe.map(PathBuf::from),
    });
    let sweep = {
        let defaults = SweepConfig::default();
        match toml_config.sweep {
            Some(sweep) => SweepConfig {
                max_file_age: sweep
                    .max_file_age_minutes
                    .map(|m| Duration::from_secs(m * 60))
                    .unwrap_or(defaults.max_file_age),
                interval: sweep
                    .interval_minutes
                    .map(|m| Duration::from_secs(m * 60))
                    .unwrap_or(defaults.interval),
            },
            None => defaults,
        }
    };
    Ok(Config {
        address: toml_config.address,
        port: toml_config.port,
        download_dir,
        bin_paths,
        sweep,
    })
}
