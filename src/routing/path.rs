//! Route patterns and request path handling.
//!
//! # Responsibilities
//! - Parse registration patterns into typed segments
//! - Split request paths into segments for matching
//! - Clean request paths (`//`, `.`, `..`) and toggle trailing slashes
//! - Join group prefixes with route paths
//!
//! # Design Decisions
//! - A trailing slash is significant: `/a/` ends with an empty static segment
//! - Cleaning keeps the trailing slash so `/a/./` cleans to `/a/`, not `/a`

use crate::routing::error::RouterError;

/// One slash-delimited token of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Static(String),
    /// `:name`, binds one non-empty segment.
    Param(String),
    /// `*name`, binds the remainder of the path. Always last.
    Wildcard(String),
}

impl Segment {
    /// The pattern text this segment was parsed from.
    pub fn as_pattern(&self) -> String {
        match self {
            Segment::Static(s) => s.clone(),
            Segment::Param(name) => format!(":{name}"),
            Segment::Wildcard(name) => format!("*{name}"),
        }
    }
}

fn invalid(path: &str, reason: &'static str) -> RouterError {
    RouterError::InvalidPattern {
        path: path.to_string(),
        reason,
    }
}

/// Parse a full route pattern such as `/users/:id/files/*rest`.
pub fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, RouterError> {
    let Some(body) = pattern.strip_prefix('/') else {
        return Err(invalid(pattern, "path must begin with '/'"));
    };

    let pieces: Vec<&str> = body.split('/').collect();
    let last = pieces.len() - 1;
    let mut segments = Vec::with_capacity(pieces.len());
    let mut names: Vec<&str> = Vec::new();

    for (idx, piece) in pieces.iter().enumerate() {
        let segment = if let Some(name) = piece.strip_prefix(':') {
            if name.is_empty() {
                return Err(invalid(pattern, "parameter name must not be empty"));
            }
            names.push(name);
            Segment::Param(name.to_string())
        } else if let Some(name) = piece.strip_prefix('*') {
            if name.is_empty() {
                return Err(invalid(pattern, "wildcard name must not be empty"));
            }
            if idx != last {
                return Err(invalid(pattern, "wildcard must be the last segment"));
            }
            names.push(name);
            Segment::Wildcard(name.to_string())
        } else {
            // Only the final segment may be empty (trailing slash).
            if piece.is_empty() && idx != last {
                return Err(invalid(pattern, "empty path segment"));
            }
            Segment::Static(piece.to_string())
        };
        segments.push(segment);
    }

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(invalid(pattern, "duplicate parameter name"));
        }
    }

    Ok(segments)
}

/// Split a request path into the segments the trie walks.
///
/// `/` yields `[""]` and `/a/b/` yields `["a", "b", ""]`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

/// Canonical form of a request path.
///
/// Collapses repeated slashes, drops `.` segments and resolves `..`
/// against the preceding segment. A trailing slash survives cleaning.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut stack: Vec<&str> = Vec::new();
    for piece in path.split('/') {
        match piece {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len());
    for piece in &stack {
        cleaned.push('/');
        cleaned.push_str(piece);
    }

    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if cleaned.is_empty() || trailing {
        cleaned.push('/');
    }
    cleaned
}

/// The same path with its trailing slash added or removed. `None` for `/`.
pub fn toggle_trailing_slash(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.strip_suffix('/') {
        Some(stripped) => Some(stripped.to_string()),
        None => Some(format!("{path}/")),
    }
}

/// Validate a group prefix and normalize away its trailing slash.
pub fn normalize_prefix(prefix: &str) -> Result<String, RouterError> {
    if !prefix.starts_with('/') {
        return Err(invalid(prefix, "group prefix must begin with '/'"));
    }
    Ok(prefix.trim_end_matches('/').to_string())
}

/// Join an accumulated group prefix with a route path.
///
/// An empty `path` registers the prefix itself.
pub fn join_route(prefix: &str, path: &str) -> Result<String, RouterError> {
    if path.is_empty() {
        if prefix.is_empty() {
            return Err(invalid(path, "path must not be empty"));
        }
        return Ok(prefix.to_string());
    }
    if !path.starts_with('/') {
        return Err(invalid(path, "path must begin with '/'"));
    }
    Ok(format!("{prefix}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_pattern() {
        let segments = parse_pattern("/users/:id/files/*rest").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Static("users".into()),
                Segment::Param("id".into()),
                Segment::Static("files".into()),
                Segment::Wildcard("rest".into()),
            ]
        );
    }

    #[test]
    fn test_parse_trailing_slash_and_root() {
        assert_eq!(parse_pattern("/").unwrap(), vec![Segment::Static(String::new())]);
        assert_eq!(
            parse_pattern("/items/").unwrap(),
            vec![Segment::Static("items".into()), Segment::Static(String::new())]
        );
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        for bad in ["items", "/a//b", "/:", "/*", "/*rest/more", "/:id/:id", "/:name/*name"] {
            assert!(
                matches!(parse_pattern(bad), Err(RouterError::InvalidPattern { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("//a///b"), "/a/b");
        assert_eq!(clean_path("/a/./b/"), "/a/b/");
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/a/b/.."), "/a/");
        assert_eq!(clean_path("/../.."), "/");
    }

    #[test]
    fn test_toggle_trailing_slash() {
        assert_eq!(toggle_trailing_slash("/items"), Some("/items/".to_string()));
        assert_eq!(toggle_trailing_slash("/items/"), Some("/items".to_string()));
        assert_eq!(toggle_trailing_slash("/"), None);
    }

    #[test]
    fn test_join_route() {
        assert_eq!(join_route("/v1/api", "/users").unwrap(), "/v1/api/users");
        assert_eq!(join_route("/v1", "").unwrap(), "/v1");
        assert_eq!(join_route("", "/").unwrap(), "/");
        assert!(join_route("", "").is_err());
        assert!(join_route("/v1", "users").is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api/").unwrap(), "/api");
        assert_eq!(normalize_prefix("/").unwrap(), "");
        assert!(normalize_prefix("api").is_err());
    }
}
