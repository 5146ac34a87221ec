pub mod blocklist;
pub mod catalog;
pub mod config;
pub mod extract;
mod processing;
pub mod sweeper;
pub mod util;

pub use processing::startup_self_check;
pub use processing::{commands, edit, ffmpeg, ffprobe};
