use super::select::SelectedEncoding;

/// Human-readable description of a selected encoding, e.g.
/// `1080p - 60fps - 1.2GB` or `Audio - 160kbps - 3.4MB`.
///
/// Frame rates at or below 30 are not worth calling out and are omitted.
pub fn format_label(encoding: &SelectedEncoding) -> String {
    let mut parts: Vec<String> = Vec::new();
    match encoding {
        SelectedEncoding::Video(v) => {
            if v.height > 0 {
                parts.push(format!("{}p", v.height));
            }
            if v.fps > 30.0 {
                parts.push(format!("{}fps", v.fps as i64));
            }
            if v.abr > 0.0 {
                parts.push(format!("{}kbps", v.abr as i64));
            }
            push_size(&mut parts, v.filesize);
        }
        SelectedEncoding::Audio(a) => {
            parts.push("Audio".to_owned());
            if a.abr > 0.0 {
                parts.push(format!("{}kbps", a.abr as i64));
            }
            push_size(&mut parts, a.filesize);
        }
    }
    if parts.is_empty() {
        "unknown format".to_owned()
    } else {
        parts.join(" - ")
    }
}

/// The bare resolution string, when there is one.
pub fn resolution(encoding: &SelectedEncoding) -> Option<String> {
    match encoding {
        SelectedEncoding::Video(v) if v.height > 0 => Some(format!("{}p", v.height)),
        _ => None,
    }
}

fn push_size(parts: &mut Vec<String>, filesize: f64) {
    if filesize > 0.0 {
        let size_mb = filesize / (1024.0 * 1024.0);
        if size_mb >= 1024.0 {
            parts.push(format!("{:.1}GB", size_mb / 1024.0));
        } else {
            parts.push(format!("{:.1}MB", size_mb));
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::normalize::{AudioVariant, VideoVariant};

    fn video(height: i64, fps: f64, abr: f64, filesize: f64) -> SelectedEncoding {
        SelectedEncoding::Video(VideoVariant {
            source_index: 0,
            format_id: "137".to_owned(),
            ext: "mp4".to_owned(),
            vcodec: "avc1".to_owned(),
            acodec: "aac".to_owned(),
            height,
            fps,
            abr,
            filesize,
            score: height as f64 + fps / 30.0,
        })
    }

    #[test]
    fn high_frame_rate_gets_an_fps_suffix() {
        let label = format_label(&video(1080, 60.0, 0.0, 0.0));
        assert_eq!(label, "1080p - 60fps");
    }

    #[test]
    fn thirty_fps_is_not_called_out() {
        let label = format_label(&video(720, 30.0, 0.0, 0.0));
        assert_eq!(label, "720p");
    }

    #[test]
    fn sizes_print_in_megabytes_and_flip_to_gigabytes() {
        assert_eq!(
            format_label(&video(1080, 30.0, 0.0, 50.0 * 1024.0 * 1024.0)),
            "1080p - 50.0MB"
        );
        assert_eq!(
            format_label(&video(2160, 30.0, 0.0, 1.5 * 1024.0 * 1024.0 * 1024.0)),
            "2160p - 1.5GB"
        );
    }

    #[test]
    fn combined_video_with_audio_bitrate_lists_every_part() {
        let label = format_label(&video(1080, 60.0, 128.9, 10.0 * 1024.0 * 1024.0));
        assert_eq!(label, "1080p - 60fps - 128kbps - 10.0MB");
    }

    #[test]
    fn audio_only_label_and_missing_resolution() {
        let encoding = SelectedEncoding::Audio(AudioVariant {
            source_index: 3,
            format_id: "251".to_owned(),
            ext: "webm".to_owned(),
            acodec: "opus".to_owned(),
            abr: 160.0,
            filesize: 0.0,
        });
        assert_eq!(format_label(&encoding), "Audio - 160kbps");
        assert_eq!(resolution(&encoding), None);
    }

    #[test]
    fn resolution_string_for_video() {
        assert_eq!(resolution(&video(720, 30.0, 0.0, 0.0)), Some("720p".to_owned()));
    }
}
