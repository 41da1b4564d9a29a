// Extraction diagnostics - names the reason a URL could not be extracted
//
// The workflow never retries; the reason only sharpens the one error line
// the user sees.

/// Reasons why the engine could not extract a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    /// Geographic restriction
    GeoBlocked,

    /// Age or consent gate requiring login
    AgeRestricted,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// DRM-protected or paid content
    DrmProtected,

    /// No stream matches the format policy
    FormatUnavailable,

    /// URL is not recognised by any extractor
    UnsupportedUrl,

    /// HTTP 403 Forbidden
    Http403Forbidden,

    /// 429 or similar
    RateLimited,

    /// Connection or resolution failure
    NetworkTimeout,

    Unknown,
}

impl BlockingReason {
    /// Short label appended to the error line
    pub fn label(&self) -> &'static str {
        match self {
            Self::GeoBlocked => "not available in this region",
            Self::AgeRestricted => "age or consent gate",
            Self::PrivateVideo => "private video",
            Self::VideoUnavailable => "video unavailable",
            Self::DrmProtected => "DRM-protected content",
            Self::FormatUnavailable => "no format matches the selection",
            Self::UnsupportedUrl => "unsupported URL",
            Self::Http403Forbidden => "access denied",
            Self::RateLimited => "rate limited",
            Self::NetworkTimeout => "network failure",
            Self::Unknown => "unknown",
        }
    }
}

/// Analyze error message and return blocking reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("requires purchase")
        || lower.contains("this video requires payment")
    {
        return Some(BlockingReason::DrmProtected);
    }

    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        return Some(BlockingReason::UnsupportedUrl);
    }

    if lower.contains("requested format is not available")
        || lower.contains("no video formats found")
    {
        return Some(BlockingReason::FormatUnavailable);
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("inappropriate for some users")
    {
        return Some(BlockingReason::AgeRestricted);
    }

    // Checked before "unavailable": yt-dlp reports private videos as
    // "Video unavailable. This video is private"
    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked it in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
        || lower.contains("video is unavailable")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("429") || lower.contains("too many requests") {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network is unreachable")
        || lower.contains("name or service not known")
        || lower.contains("failed to resolve")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}
