pub trait OptionPathExt {
    fn as_opt_path(&self) -> Option<&camino::Utf8Path>;
}

impl OptionPathExt for Option<camino::Utf8PathBuf> {
    fn as_opt_path(&self) -> Option<&camino::Utf8Path> {
        self.as_ref().map(|p| p.as_path())
    }
}

/// Strip a filename down to alphanumerics, `-`, `_` and `.` so it is safe to
/// serve back in headers and URLs.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters_only() {
        assert_eq!(
            sanitize_filename("Some Video (1080p) [x264]-137.mp4"),
            "SomeVideo1080px264-137.mp4"
        );
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
    }
}
