// URL normalization

/// Host marker of the short-link form
const SHORT_LINK_HOST: &str = "youtu.be";

/// Rewrite short links to the canonical watch URL, pass everything else through.
///
/// Input is not validated; malformed URLs surface later as extraction errors.
pub fn normalize_url(url: &str) -> String {
    if url.contains(SHORT_LINK_HOST) {
        let video_id = url.rsplit('/').next().unwrap_or_default();
        return format!("https://youtube.com/watch?v={}", video_id);
    }
    url.to_string()
}
