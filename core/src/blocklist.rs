use url::Url;

/// Licensed streaming and storefront hosts we refuse to touch. Matching is a
/// substring check against the lowercased host, so subdomains and country
/// variants (www.netflix.com, netflix.com.br) are covered.
pub const BLOCKED_DOMAINS: &[&str] = &[
    "netflix.com",
    "primevideo.com",
    "amazon.com",
    "disneyplus.com",
    "hulu.com",
    "hbomax.com",
    "peacocktv.com",
    "paramountplus.com",
    "crunchyroll.com",
    "funimation.com",
    "deezer.com",
    "spotify.com",
    "tidal.com",
    "apple.com",
    "play.google.com",
];

/// True when the URL's host matches the denylist. Unparseable URLs are not
/// blocked here; they fail later at extraction with a proper error.
pub fn is_blocked_url(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    match parsed.host_str() {
        Some(host) => {
            let host = host.to_lowercase();
            BLOCKED_DOMAINS.iter().any(|blocked| host.contains(blocked))
        }
        None => false,
    }
}
