//! Poster URL helpers.

use crate::config::ImagesConfig;

/// TMDB poster size used for import candidates.
pub const TMDB_POSTER_SIZE: &str = "w185";

/// URL of `url` through the image proxy, resized to fit 800x600.
///
/// Returns `None` for blank input.
pub fn proxy_image_url(config: &ImagesConfig, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let clean = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    Some(format!(
        "{}?url={}&w=800&h=600&fit=contain&we=1",
        config.proxy_url,
        urlencoding::encode(clean)
    ))
}

/// Absolute poster URL for an external candidate.
///
/// Absolute URLs pass through; provider paths get the TMDB image base.
pub fn tmdb_poster_url(config: &ImagesConfig, poster: &str) -> Option<String> {
    let poster = poster.trim();
    if poster.is_empty() {
        return None;
    }
    if poster.starts_with("http") {
        return Some(poster.to_string());
    }
    Some(format!(
        "{}/{}/{}",
        config.tmdb_base_url.trim_end_matches('/'),
        TMDB_POSTER_SIZE,
        poster.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_strips_scheme_and_encodes() {
        let config = ImagesConfig::default();
        assert_eq!(
            proxy_image_url(&config, " https://img.example.com/a b.jpg ").as_deref(),
            Some("https://images.weserv.nl/?url=img.example.com%2Fa%20b.jpg&w=800&h=600&fit=contain&we=1")
        );
        assert!(proxy_image_url(&config, "  ").is_none());
    }

    #[test]
    fn test_tmdb_poster() {
        let config = ImagesConfig::default();
        assert_eq!(
            tmdb_poster_url(&config, "/abc.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w185/abc.jpg")
        );
        assert_eq!(
            tmdb_poster_url(&config, "https://cdn.example.com/p.png").as_deref(),
            Some("https://cdn.example.com/p.png")
        );
        assert!(tmdb_poster_url(&config, "").is_none());
    }
}
