//! Shared utility functions

use url::Url;

/// Truncate a string to a maximum length, appending "..." if truncated.
/// Handles multi-byte characters by finding a valid char boundary.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let target = max_len.saturating_sub(suffix.len());
    let mut end = target;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

/// Derive a `host/directory` grouping slug from a page URL.
///
/// The last path segment (the page itself) is dropped; a URL with no path
/// maps to `host/root`. Unparseable URLs map to `unknown`.
pub fn url_directory(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "unknown".to_string();
    };
    let host = parsed.host_str().unwrap_or("unknown");

    let path = parsed.path().trim_matches('/');
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    let directory = if parts.len() >= 2 {
        parts[..parts.len() - 1].join("/")
    } else if parts.len() == 1 {
        parts[0].to_string()
    } else {
        "root".to_string()
    };

    format!("{}/{}", host, directory)
}
