use std::borrow::Cow;

pub fn guess_mime_type(file_ext: &str) -> Option<Cow<'static, str>> {
    match file_ext {
        "mp4" | "m4v" => Some(Cow::Borrowed("video/mp4")),
        "webm" => Some(Cow::Borrowed("video/webm")),
        "mkv" => Some(Cow::Borrowed("video/x-matroska")),
        "mov" => Some(Cow::Borrowed("video/quicktime")),
        "avi" => Some(Cow::Borrowed("video/x-msvideo")),
        "mp3" => Some(Cow::Borrowed("audio/mpeg")),
        "m4a" => Some(Cow::Borrowed("audio/mp4")),
        "opus" | "ogg" | "oga" => Some(Cow::Borrowed("audio/ogg")),
        "wav" => Some(Cow::Borrowed("audio/x-wav")),
        "flac" => Some(Cow::Borrowed("audio/flac")),
        "jpg" | "jpeg" => Some(Cow::Borrowed("image/jpeg")),
        "png" => Some(Cow::Borrowed("image/png")),
        "webp" => Some(Cow::Borrowed("image/webp")),
        _ => None,
    }
}

pub fn guess_mime_type_path(path: &camino::Utf8Path) -> Option<Cow<'static, str>> {
    let ext = path.extension()?.to_ascii_lowercase();
    match guess_mime_type(&ext) {
        Some(m) => Some(m),
        None => {
            tracing::warn!(
                "can't guess MIME type for filename '{}'",
                &path
                    .file_name()
                    .map(|p| p.to_string())
                    .unwrap_or(String::new())
            );
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn common_media_extensions_resolve() {
        assert_eq!(guess_mime_type("mp4").unwrap(), "video/mp4");
        assert_eq!(guess_mime_type("mp3").unwrap(), "audio/mpeg");
        assert_eq!(guess_mime_type("webm").unwrap(), "video/webm");
        assert_eq!(guess_mime_type("xyz"), None);
    }

    #[test]
    fn path_lookup_is_case_insensitive() {
        let path = camino::Utf8Path::new("/downloads/Clip.MP4");
        assert_eq!(guess_mime_type_path(path).unwrap(), "video/mp4");
    }
}
