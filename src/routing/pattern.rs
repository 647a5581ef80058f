//! Path template matching.
//!
//! # Responsibilities
//! - Compile templates like `/talks/{title}/comments` into segments
//! - Match a raw request path against the whole template
//! - Percent-decode captured segments
//!
//! # Design Decisions
//! - Matching is anchored: every segment must be consumed
//! - A capture spans exactly one non-empty segment (never a `/`)
//! - Captures are matched on the raw path and decoded afterwards, so an
//!   encoded `%2F` stays inside its segment
//! - No regex to guarantee O(n) matching

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern '{pattern}' has a malformed capture segment '{segment}'")]
    MalformedCapture { pattern: String, segment: String },

    #[error("pattern '{pattern}' captures '{name}' more than once")]
    DuplicateCapture { pattern: String, name: String },
}

/// A captured segment that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path segment '{raw}' is not valid percent-encoded UTF-8")]
pub struct InvalidCapture {
    pub raw: String,
}

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(Arc<str>),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a template. Capture segments are written as `{name}`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let has_braces = raw.contains('{') || raw.contains('}');
            if !has_braces {
                segments.push(Segment::Literal(raw.to_string()));
                continue;
            }

            let name = raw
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .filter(|name| !name.is_empty() && !name.contains(['{', '}']))
                .ok_or_else(|| PatternError::MalformedCapture {
                    pattern: pattern.to_string(),
                    segment: raw.to_string(),
                })?;

            let duplicate = segments
                .iter()
                .any(|s| matches!(s, Segment::Capture(existing) if &**existing == name));
            if duplicate {
                return Err(PatternError::DuplicateCapture {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Capture(Arc::from(name)));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The template this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match the full path, returning the raw (still encoded) captures.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<Vec<(Arc<str>, &'p str)>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut captures = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    captures.push((Arc::clone(name), part));
                }
            }
        }

        // Anchored: leftover segments mean a longer path.
        if parts.next().is_some() {
            return None;
        }
        Some(captures)
    }
}

/// Decoded path captures handed to a route handler, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<(Arc<str>, String)>,
}

impl Captures {
    /// Percent-decode raw captures.
    pub fn decode(raw: Vec<(Arc<str>, &str)>) -> Result<Self, InvalidCapture> {
        let values = raw
            .into_iter()
            .map(|(name, value)| {
                percent_decode_str(value)
                    .decode_utf8()
                    .map(|decoded| (name, decoded.into_owned()))
                    .map_err(|_| InvalidCapture {
                        raw: value.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Look up a capture by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over decoded values in template order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_values(pattern: &PathPattern, path: &str) -> Option<Vec<String>> {
        pattern
            .match_path(path)
            .map(|caps| caps.into_iter().map(|(_, v)| v.to_string()).collect())
    }

    #[test]
    fn test_literal_pattern_is_anchored() {
        let pattern = PathPattern::parse("/talks").unwrap();
        assert_eq!(raw_values(&pattern, "/talks"), Some(vec![]));
        assert_eq!(raw_values(&pattern, "/talks/"), None);
        assert_eq!(raw_values(&pattern, "/talks/x"), None);
        assert_eq!(raw_values(&pattern, "/talk"), None);
        assert_eq!(raw_values(&pattern, "talks"), None);
    }

    #[test]
    fn test_single_capture() {
        let pattern = PathPattern::parse("/talks/{title}").unwrap();
        assert_eq!(raw_values(&pattern, "/talks/Rust"), Some(vec!["Rust".into()]));
        assert_eq!(raw_values(&pattern, "/talks/"), None);
        assert_eq!(raw_values(&pattern, "/talks"), None);
        assert_eq!(raw_values(&pattern, "/talks/a/b"), None);
    }

    #[test]
    fn test_capture_between_literals() {
        let pattern = PathPattern::parse("/talks/{title}/comments").unwrap();
        assert_eq!(
            raw_values(&pattern, "/talks/Unituning/comments"),
            Some(vec!["Unituning".into()])
        );
        assert_eq!(raw_values(&pattern, "/talks/Unituning"), None);
        assert_eq!(raw_values(&pattern, "/talks/Unituning/replies"), None);
    }

    #[test]
    fn test_encoded_slash_stays_in_segment() {
        let pattern = PathPattern::parse("/glossary/{wordPair}").unwrap();
        let raw = pattern.match_path("/glossary/cat%2Fgato").unwrap();
        let captures = Captures::decode(raw).unwrap();
        assert_eq!(captures.get("wordPair"), Some("cat/gato"));
    }

    #[test]
    fn test_decode_utf8_and_spaces() {
        let pattern = PathPattern::parse("/talks/{title}").unwrap();
        let raw = pattern.match_path("/talks/Caf%C3%A9%20talk").unwrap();
        let captures = Captures::decode(raw).unwrap();
        assert_eq!(captures.get("title"), Some("Café talk"));
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let pattern = PathPattern::parse("/talks/{title}").unwrap();
        let raw = pattern.match_path("/talks/%FF").unwrap();
        assert_eq!(
            Captures::decode(raw),
            Err(InvalidCapture { raw: "%FF".into() })
        );
    }

    #[test]
    fn test_pattern_errors() {
        assert!(matches!(
            PathPattern::parse("talks"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::parse("/talks/{}"),
            Err(PatternError::MalformedCapture { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/talks/x{title}"),
            Err(PatternError::MalformedCapture { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/a/{id}/b/{id}"),
            Err(PatternError::DuplicateCapture { .. })
        ));
    }
}
