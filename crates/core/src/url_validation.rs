//! Validation, normalization, and classification of user-supplied links.
//!
//! Link fields in deal rooms accept whatever users paste: full URLs,
//! `www.` prefixes, bare domains, IP addresses. [`validate_and_normalize_url`]
//! turns that into either a normalized `https://` URL or a specific error,
//! plus a non-fatal warning for hosts that other investors will not be able
//! to reach (localhost, private ranges, raw IPs).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

/// Matches inputs that already carry a scheme (`https://`, `ftp://`, ...).
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("valid regex"));

/// Matches bare domains like `example.com` or `sub.example.co.uk`,
/// optionally followed by a path, query, or fragment.
static BARE_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}([/?#].*)?$")
        .expect("valid regex")
});

/// Matches a bare dotted-quad IPv4 host.
static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("valid regex"));

/// Outcome of [`validate_and_normalize_url`].
#[derive(Debug, Clone, Serialize)]
pub struct UrlValidation {
    pub is_valid: bool,
    /// The URL to store, always carrying an explicit scheme. `None` when
    /// invalid.
    pub normalized_url: Option<String>,
    pub error: Option<String>,
    /// Non-fatal advisory, e.g. for localhost or private-range hosts.
    pub warning: Option<String>,
}

impl UrlValidation {
    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            normalized_url: None,
            error: Some(error.into()),
            warning: None,
        }
    }

    fn valid(normalized_url: String, warning: Option<String>) -> Self {
        Self {
            is_valid: true,
            normalized_url: Some(normalized_url),
            error: None,
            warning,
        }
    }
}

/// Validate a user-supplied link and normalize it to an absolute
/// `http(s)` URL.
///
/// Inputs without a scheme are prefixed with `https://` when they look
/// like a `www.` address or a bare domain; anything else is rejected with
/// format guidance. Local, loopback, private-range, and raw-IP hosts are
/// accepted but produce a warning.
pub fn validate_and_normalize_url(input: &str) -> UrlValidation {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UrlValidation::invalid("URL is required");
    }

    let candidate = if SCHEME_RE.is_match(trimmed) {
        let parsed = match Url::parse(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => {
                return UrlValidation::invalid(
                    "This doesn't look like a valid URL. Check for typos and try again",
                );
            }
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return UrlValidation::invalid("Only HTTP and HTTPS URLs are supported");
        }
        trimmed.to_string()
    } else if trimmed.starts_with("www.") || BARE_DOMAIN_RE.is_match(trimmed) {
        format!("https://{trimmed}")
    } else {
        return UrlValidation::invalid(
            "Enter a full URL like https://example.com or a domain like example.com",
        );
    };

    // Re-parse the normalized form; prefixing can still produce garbage
    // (e.g. "www." alone has no registrable host).
    let parsed = match Url::parse(&candidate) {
        Ok(parsed) => parsed,
        Err(_) => {
            return UrlValidation::invalid(
                "This doesn't look like a valid URL. Check for typos and try again",
            );
        }
    };
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return UrlValidation::invalid("URL must include a host name"),
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return UrlValidation::invalid("Only HTTP and HTTPS URLs are supported");
    }

    UrlValidation::valid(candidate, host_warning(&host))
}

/// Warning text for hosts that are unreachable or undesirable for a
/// public deal room. Returns `None` for ordinary domain hosts.
fn host_warning(host: &str) -> Option<String> {
    if host.eq_ignore_ascii_case("localhost") || is_private_or_loopback(host) {
        return Some(
            "This is a local URL that other users will not be able to access".to_string(),
        );
    }
    if IPV4_RE.is_match(host) {
        return Some(
            "This URL points to an IP address; consider using a domain name instead".to_string(),
        );
    }
    None
}

/// True for loopback (`127.*`) and RFC 1918 private-range addresses.
fn is_private_or_loopback(host: &str) -> bool {
    if !IPV4_RE.is_match(host) {
        return false;
    }
    if host.starts_with("127.") || host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    if let Some(second) = host.strip_prefix("172.").and_then(|rest| rest.split('.').next()) {
        if let Ok(octet) = second.parse::<u8>() {
            return (16..=31).contains(&octet);
        }
    }
    false
}

/// Extract the host name from a URL, or return the input unchanged when
/// it cannot be parsed. Never fails.
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Link categories recognized by [`suggest_url_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UrlType {
    Document,
    Image,
    Video,
    LinkedIn,
    Twitter,
    Facebook,
    YouTube,
}

impl UrlType {
    /// Display label shown in link pickers.
    pub fn as_str(self) -> &'static str {
        match self {
            UrlType::Document => "Document",
            UrlType::Image => "Image",
            UrlType::Video => "Video",
            UrlType::LinkedIn => "LinkedIn",
            UrlType::Twitter => "Twitter/X",
            UrlType::Facebook => "Facebook",
            UrlType::YouTube => "YouTube",
        }
    }
}

const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".csv",
];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".webm", ".mkv"];

/// Suggest a link category from the URL's extension or host.
///
/// Rules are checked in a fixed order (document extensions, image
/// extensions, video extensions, then well-known hosts); the first match
/// wins. Returns `None` for anything unrecognized.
pub fn suggest_url_type(url: &str) -> Option<UrlType> {
    let lowered = url.to_lowercase();
    // Extension checks run against the path only, so query strings do not
    // defeat them; fall back to the whole string when unparsable.
    let path = Url::parse(&lowered)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| lowered.clone());
    let host = Url::parse(&lowered)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| lowered.clone());

    if DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Some(UrlType::Document);
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Some(UrlType::Image);
    }
    if VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Some(UrlType::Video);
    }
    if host_matches(&host, "linkedin.com") {
        return Some(UrlType::LinkedIn);
    }
    if host_matches(&host, "twitter.com") || host_matches(&host, "x.com") {
        return Some(UrlType::Twitter);
    }
    if host_matches(&host, "facebook.com") {
        return Some(UrlType::Facebook);
    }
    if host_matches(&host, "youtube.com") || host_matches(&host, "youtu.be") {
        return Some(UrlType::YouTube);
    }
    None
}

/// Exact host or subdomain match. Plain substring matching would tag
/// hosts like `linux.com` or `netflix.com` as X/Twitter.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Outcome of [`check_url_accessibility`].
#[derive(Debug, Clone, Serialize)]
pub struct UrlAccessibility {
    pub accessible: bool,
    pub error: Option<String>,
}

/// Format-level accessibility check for a link.
///
/// This deliberately performs no network probe: a live reachability test
/// from the server would leak draft contents to third-party hosts and
/// block the editor on slow targets. Only the scheme and parsability are
/// checked.
pub fn check_url_accessibility(url: &str) -> UrlAccessibility {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {
            UrlAccessibility {
                accessible: true,
                error: None,
            }
        }
        Ok(_) => UrlAccessibility {
            accessible: false,
            error: Some("Only HTTP and HTTPS URLs can be checked".to_string()),
        },
        Err(_) => UrlAccessibility {
            accessible: false,
            error: Some("URL could not be parsed".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_rejected() {
        let result = validate_and_normalize_url("");
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some("URL is required"));
    }

    #[test]
    fn whitespace_only_rejected() {
        let result = validate_and_normalize_url("   ");
        assert_eq!(result.error.as_deref(), Some("URL is required"));
    }

    #[test]
    fn bare_domain_gets_https_prefix() {
        let result = validate_and_normalize_url("example.com");
        assert!(result.is_valid);
        assert_eq!(result.normalized_url.as_deref(), Some("https://example.com"));
        assert!(result.warning.is_none());
    }

    #[test]
    fn www_prefix_gets_https() {
        let result = validate_and_normalize_url("www.example.com/path");
        assert!(result.is_valid);
        assert_eq!(
            result.normalized_url.as_deref(),
            Some("https://www.example.com/path")
        );
    }

    #[test]
    fn bare_domain_with_path_accepted() {
        let result = validate_and_normalize_url("docs.example.co.uk/investors?tab=2");
        assert!(result.is_valid);
        assert_eq!(
            result.normalized_url.as_deref(),
            Some("https://docs.example.co.uk/investors?tab=2")
        );
    }

    #[test]
    fn full_https_url_kept_as_is() {
        let result = validate_and_normalize_url("https://example.com/a%20b");
        assert!(result.is_valid);
        assert_eq!(
            result.normalized_url.as_deref(),
            Some("https://example.com/a%20b")
        );
    }

    #[test]
    fn http_scheme_accepted() {
        let result = validate_and_normalize_url("http://example.com");
        assert!(result.is_valid);
    }

    #[test]
    fn ftp_scheme_rejected() {
        let result = validate_and_normalize_url("ftp://example.com");
        assert!(!result.is_valid);
        assert!(result.error.as_deref().unwrap().contains("HTTP and HTTPS"));
    }

    #[test]
    fn free_text_rejected_with_guidance() {
        let result = validate_and_normalize_url("not a url");
        assert!(!result.is_valid);
        assert!(result.error.as_deref().unwrap().contains("example.com"));
    }

    #[test]
    fn localhost_warns_but_validates() {
        let result = validate_and_normalize_url("http://localhost:3000");
        assert!(result.is_valid);
        assert!(result.warning.as_deref().unwrap().contains("local URL"));
    }

    #[test]
    fn loopback_ip_warns_as_local() {
        let result = validate_and_normalize_url("http://127.0.0.1:8080");
        assert!(result.is_valid);
        assert!(result.warning.as_deref().unwrap().contains("local URL"));
    }

    #[test]
    fn private_range_warns_as_local() {
        for host in ["http://192.168.1.5", "http://10.0.0.2", "http://172.20.0.1"] {
            let result = validate_and_normalize_url(host);
            assert!(result.is_valid, "{host} should validate");
            assert!(
                result.warning.as_deref().unwrap().contains("local URL"),
                "{host} should warn as local"
            );
        }
    }

    #[test]
    fn public_ip_warns_to_use_domain() {
        let result = validate_and_normalize_url("http://8.8.8.8");
        assert!(result.is_valid);
        assert!(result.warning.as_deref().unwrap().contains("domain name"));
    }

    #[test]
    fn high_172_octets_are_not_private() {
        let result = validate_and_normalize_url("http://172.32.0.1");
        assert!(result.is_valid);
        assert!(result.warning.as_deref().unwrap().contains("domain name"));
    }

    #[test]
    fn extract_domain_from_valid_url() {
        assert_eq!(extract_domain("https://www.example.com/path"), "www.example.com");
    }

    #[test]
    fn extract_domain_falls_back_to_input() {
        assert_eq!(extract_domain("not a url"), "not a url");
    }

    #[test]
    fn suggests_document_for_pdf() {
        assert_eq!(
            suggest_url_type("https://example.com/deck.pdf"),
            Some(UrlType::Document)
        );
    }

    #[test]
    fn suggests_image_for_png() {
        assert_eq!(
            suggest_url_type("https://example.com/logo.PNG"),
            Some(UrlType::Image)
        );
    }

    #[test]
    fn suggests_video_for_mp4() {
        assert_eq!(
            suggest_url_type("https://cdn.example.com/pitch.mp4"),
            Some(UrlType::Video)
        );
    }

    #[test]
    fn extension_beats_host() {
        // A PDF hosted on LinkedIn is still a document.
        assert_eq!(
            suggest_url_type("https://linkedin.com/files/cv.pdf"),
            Some(UrlType::Document)
        );
    }

    #[test]
    fn suggests_linkedin() {
        assert_eq!(
            suggest_url_type("https://www.linkedin.com/company/acme"),
            Some(UrlType::LinkedIn)
        );
    }

    #[test]
    fn suggests_twitter_for_x_domain() {
        assert_eq!(suggest_url_type("https://x.com/acme"), Some(UrlType::Twitter));
    }

    #[test]
    fn suggests_youtube_for_short_links() {
        assert_eq!(
            suggest_url_type("https://youtu.be/123"),
            Some(UrlType::YouTube)
        );
        assert_eq!(UrlType::YouTube.as_str(), "YouTube");
    }

    #[test]
    fn unknown_host_suggests_nothing() {
        assert_eq!(suggest_url_type("https://example.com"), None);
    }

    #[test]
    fn social_hosts_match_subdomains() {
        assert_eq!(
            suggest_url_type("https://m.youtube.com/watch?v=1"),
            Some(UrlType::YouTube)
        );
        assert_eq!(
            suggest_url_type("https://www.facebook.com/acme"),
            Some(UrlType::Facebook)
        );
    }

    #[test]
    fn lookalike_hosts_are_not_social() {
        assert_eq!(suggest_url_type("https://linux.com"), None);
        assert_eq!(suggest_url_type("https://netflix.com/browse"), None);
        assert_eq!(suggest_url_type("https://notyoutu.be"), None);
    }

    #[test]
    fn accessibility_ok_for_https() {
        let result = check_url_accessibility("https://example.com");
        assert!(result.accessible);
        assert!(result.error.is_none());
    }

    #[test]
    fn accessibility_rejects_non_http_scheme() {
        let result = check_url_accessibility("ftp://example.com");
        assert!(!result.accessible);
        assert!(result.error.as_deref().unwrap().contains("HTTP and HTTPS"));
    }

    #[test]
    fn accessibility_rejects_unparsable() {
        let result = check_url_accessibility("::::");
        assert!(!result.accessible);
        assert_eq!(result.error.as_deref(), Some("URL could not be parsed"));
    }
}
