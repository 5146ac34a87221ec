//! The command wrapper types the rest of the crate should use. With the
//! `mock-commands` feature the external tools are swapped for mocks that
//! produce empty artifacts, so the service can be exercised without yt-dlp
//! or ffmpeg installed.

#[cfg(not(feature = "mock-commands"))]
pub use crate::extract::YtDlp;
#[cfg(feature = "mock-commands")]
pub use crate::extract::YtDlpMock as YtDlp;

#[cfg(not(feature = "mock-commands"))]
pub use super::ffmpeg::FFmpeg;
#[cfg(feature = "mock-commands")]
pub use super::ffmpeg::FFmpegMock as FFmpeg;

#[cfg(not(feature = "mock-commands"))]
pub use super::ffprobe::FFProbe;
#[cfg(feature = "mock-commands")]
pub use super::ffprobe::FFProbeMock as FFProbe;
