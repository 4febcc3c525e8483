//! Remote-origin resolution.
//!
//! The same client artifact is served from several deployment contexts
//! (local dev, embedded frame, direct navigation) without rebuild, so the
//! socket origin is picked from a chain of candidates rather than baked in:
//! an explicit override first, then the embedding parent's origin, then the
//! referrer's, then the page's own. A candidate is skipped when it is empty,
//! the literal `null`, not a well-formed `http(s)` origin, or binds to a
//! non-routable address (`0.0.0.0` and friends are rewritten to
//! `localhost`).

use url::Url;

/// Path of the channel endpoint on the resolved origin.
pub const SOCKET_PATH: &str = "/socket";

/// Origin candidates, in priority order.
#[derive(Debug, Clone, Default)]
pub struct OriginCandidates {
    /// Explicit server-provided override (e.g. from configuration).
    pub explicit: Option<String>,
    /// The embedding parent frame's origin, when reachable.
    pub parent: Option<String>,
    /// The referrer's origin.
    pub referrer: Option<String>,
    /// The current page's own origin.
    pub page: Option<String>,
}

impl OriginCandidates {
    /// Candidates with only the `UNO_SOCKET_ORIGIN` environment override.
    pub fn from_env() -> Self {
        Self {
            explicit: std::env::var("UNO_SOCKET_ORIGIN").ok(),
            ..Self::default()
        }
    }

    /// Candidates consisting of a single known origin.
    pub fn explicit(origin: impl Into<String>) -> Self {
        Self {
            explicit: Some(origin.into()),
            ..Self::default()
        }
    }
}

/// Pick the first usable candidate and normalize it to
/// `scheme://host[:port]`. Returns `None` when no candidate is usable.
pub fn resolve_origin(candidates: &OriginCandidates) -> Option<String> {
    [
        candidates.explicit.as_deref(),
        candidates.parent.as_deref(),
        candidates.referrer.as_deref(),
        candidates.page.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(normalize_origin)
}

/// Normalize one candidate, or reject it.
fn normalize_origin(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    let mut url = Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;
    if matches!(url.host_str(), Some("0.0.0.0" | "::" | "[::]")) {
        url.set_host(Some("localhost")).ok()?;
    }
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), url.host_str()?, port)),
        None => Some(format!("{}://{}", url.scheme(), url.host_str()?)),
    }
}

/// WebSocket URL of the channel endpoint on a resolved origin.
pub fn socket_url(origin: &str) -> String {
    let ws_origin = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        origin.to_string()
    };
    format!("{ws_origin}{SOCKET_PATH}")
}

/// HTTP URL of the warm-up endpoint on a resolved origin.
pub fn warmup_url(origin: &str, nonce: u64) -> String {
    format!("{origin}{SOCKET_PATH}?warmup={nonce}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let candidates = OriginCandidates {
            explicit: Some("https://game.example.com".to_string()),
            parent: Some("https://parent.example.com".to_string()),
            referrer: None,
            page: Some("http://localhost:3000".to_string()),
        };
        assert_eq!(
            resolve_origin(&candidates).as_deref(),
            Some("https://game.example.com")
        );
    }

    #[test]
    fn falls_through_unusable_candidates() {
        let candidates = OriginCandidates {
            explicit: Some("".to_string()),
            parent: Some("null".to_string()),
            referrer: Some("not a url".to_string()),
            page: Some("http://localhost:3000/".to_string()),
        };
        assert_eq!(
            resolve_origin(&candidates).as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        let candidates = OriginCandidates::explicit("file:///tmp/page.html");
        assert_eq!(resolve_origin(&candidates), None);
    }

    #[test]
    fn rewrites_unroutable_bind_addresses() {
        assert_eq!(
            normalize_origin("http://0.0.0.0:4000").as_deref(),
            Some("http://localhost:4000")
        );
    }

    #[test]
    fn strips_paths_and_trailing_slashes() {
        assert_eq!(
            normalize_origin("https://example.com:8443/app/page?x=1").as_deref(),
            Some("https://example.com:8443")
        );
        assert_eq!(
            normalize_origin("http://example.com///").as_deref(),
            Some("http://example.com")
        );
    }

    #[test]
    fn empty_chain_resolves_to_none() {
        assert_eq!(resolve_origin(&OriginCandidates::default()), None);
    }

    #[test]
    fn socket_url_maps_scheme_and_appends_path() {
        assert_eq!(socket_url("http://localhost:4000"), "ws://localhost:4000/socket");
        assert_eq!(socket_url("https://example.com"), "wss://example.com/socket");
    }

    #[test]
    fn warmup_url_carries_cache_buster() {
        assert_eq!(
            warmup_url("http://localhost:4000", 42),
            "http://localhost:4000/socket?warmup=42"
        );
    }
}
