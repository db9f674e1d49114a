// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route path patterns.
//!
//! A pattern is a sequence of literal segments, optionally ending in a single
//! `:name` parameter or a `*` wildcard. Matching is exact per segment: a
//! trailing slash produces an empty segment, which matches nothing but a
//! wildcard.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

impl Segment {
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 2,
            Segment::Param(_) => 1,
            Segment::Wildcard => 0,
        }
    }
}

/// Parameters captured from a matched path.
pub type PathParams = HashMap<String, String>;

// =============================================================================
// PathPattern
// =============================================================================

/// A parsed route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern such as `/users/:id` or `/*`.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| ConfigurationError::invalid_route(raw, "must start with '/'"))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            let last = parts.len() - 1;

            for (i, part) in parts.into_iter().enumerate() {
                let segment = if part == "*" {
                    Segment::Wildcard
                } else if let Some(name) = part.strip_prefix(':') {
                    if name.is_empty() {
                        return Err(ConfigurationError::invalid_route(raw, "parameter needs a name"));
                    }
                    Segment::Param(name.to_string())
                } else if part.is_empty() {
                    return Err(ConfigurationError::invalid_route(raw, "empty segment"));
                } else {
                    Segment::Literal(part.to_string())
                };

                if i != last && !matches!(segment, Segment::Literal(_)) {
                    return Err(ConfigurationError::invalid_route(
                        raw,
                        "parameters and wildcards must be the last segment",
                    ));
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The `/*` pattern, matching every path.
    pub fn any() -> Self {
        Self {
            raw: "/*".to_string(),
            segments: vec![Segment::Wildcard],
        }
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the pattern ends in a wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Matches a request path, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut params = PathParams::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => return Some(params),
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i).filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Returns the specificity used to rank competing matches.
    pub fn specificity(&self) -> Specificity {
        Specificity {
            ranks: self
                .segments
                .iter()
                .filter(|s| !matches!(s, Segment::Wildcard))
                .map(Segment::rank)
                .collect(),
            exact: !self.is_wildcard(),
        }
    }

    /// Returns the axum route paths that serve this pattern.
    ///
    /// A wildcard serves both its bare prefix and everything beneath it.
    pub fn axum_paths(&self) -> Vec<String> {
        let mut prefix = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    prefix.push('/');
                    prefix.push_str(lit);
                }
                Segment::Param(name) => {
                    prefix.push_str("/{");
                    prefix.push_str(name);
                    prefix.push('}');
                }
                Segment::Wildcard => {
                    let bare = if prefix.is_empty() { "/".to_string() } else { prefix.clone() };
                    return vec![bare, format!("{}/{{*rest}}", prefix)];
                }
            }
        }

        if prefix.is_empty() {
            prefix.push('/');
        }
        vec![prefix]
    }

    /// Returns `true` if this wildcard pattern covers the given axum path.
    pub(crate) fn covers_axum_path(&self, axum_path: &str) -> bool {
        if !self.is_wildcard() {
            return false;
        }
        let parts: Vec<&str> = axum_path
            .trim_start_matches('/')
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        self.segments
            .iter()
            .take_while(|s| !matches!(s, Segment::Wildcard))
            .enumerate()
            .all(|(i, s)| matches!(s, Segment::Literal(lit) if parts.get(i) == Some(&lit.as_str())))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// Specificity
// =============================================================================

/// Ordering key between patterns: literal beats parameter beats wildcard,
/// segment by segment, and an exact pattern beats a wildcard with the same
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specificity {
    ranks: Vec<u8>,
    exact: bool,
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranks
            .cmp(&other.ranks)
            .then(self.exact.cmp(&other.exact))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> PathPattern {
        PathPattern::parse(raw).unwrap()
    }

    #[test]
    fn test_literal_match() {
        let pattern = p("/users/search");
        assert!(pattern.matches("/users/search").is_some());
        assert!(pattern.matches("/users/search/").is_none());
        assert!(pattern.matches("/users").is_none());
        assert!(pattern.matches("users/search").is_none());
    }

    #[test]
    fn test_param_match() {
        let pattern = p("/users/:id");
        let params = pattern.matches("/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(pattern.matches("/users/").is_none());
        assert!(pattern.matches("/users/42/extra").is_none());
        assert!(pattern.matches("/users").is_none());
    }

    #[test]
    fn test_wildcard_match() {
        let all = p("/*");
        assert!(all.matches("/").is_some());
        assert!(all.matches("/users").is_some());
        assert!(all.matches("/users/42/anything/").is_some());

        let scoped = p("/users/*");
        assert!(scoped.matches("/users").is_some());
        assert!(scoped.matches("/users/42").is_some());
        assert!(scoped.matches("/groups").is_none());
    }

    #[test]
    fn test_any_equals_parsed_wildcard() {
        assert_eq!(PathPattern::any(), p("/*"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("users").is_err());
        assert!(PathPattern::parse("/users/:").is_err());
        assert!(PathPattern::parse("/users//x").is_err());
        assert!(PathPattern::parse("/:id/profile").is_err());
        assert!(PathPattern::parse("/*/profile").is_err());
    }

    #[test]
    fn test_specificity_order() {
        assert!(p("/users/search").specificity() > p("/users/:id").specificity());
        assert!(p("/users/:id").specificity() > p("/users/*").specificity());
        assert!(p("/users").specificity() > p("/users/*").specificity());
        assert!(p("/users/*").specificity() > p("/*").specificity());
    }

    #[test]
    fn test_axum_paths() {
        assert_eq!(p("/users/:id").axum_paths(), vec!["/users/{id}"]);
        assert_eq!(p("/users").axum_paths(), vec!["/users"]);
        assert_eq!(p("/*").axum_paths(), vec!["/", "/{*rest}"]);
        assert_eq!(p("/users/*").axum_paths(), vec!["/users", "/users/{*rest}"]);
    }

    #[test]
    fn test_covers_axum_path() {
        assert!(p("/*").covers_axum_path("/users/{id}"));
        assert!(p("/users/*").covers_axum_path("/users/search"));
        assert!(!p("/users/*").covers_axum_path("/groups"));
        assert!(!p("/users").covers_axum_path("/users"));
    }
}
