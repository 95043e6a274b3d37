//! Dotted key paths into a secret document.

use std::fmt;
use std::str::FromStr;

use crate::error::AwssmError;

/// A parsed key path such as `db.password` or `hosts.0`.
///
/// Segments are separated by `.`. A backslash escapes the character that
/// follows it, so `smtp\.host` names the single key `smtp.host`. The input
/// text is kept for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a key path expression.
    ///
    /// # Examples
    /// ```
    /// use awssm::KeyPath;
    ///
    /// let path = KeyPath::parse(r"smtp\.host.port").unwrap();
    /// assert_eq!(path.segments(), ["smtp.host", "port"]);
    /// ```
    pub fn parse(input: &str) -> Result<Self, AwssmError> {
        let invalid = |reason: &str| AwssmError::InvalidKeyPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(invalid("trailing escape character")),
                },
                '.' => {
                    if current.is_empty() {
                        return Err(invalid("empty segment"));
                    }
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }

        if current.is_empty() {
            return Err(invalid("empty segment"));
        }
        segments.push(current);

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    /// The unescaped segments of the path, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path as it was written by the user.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Interpret a segment as an array index. Only plain decimal digits count.
pub(crate) fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for KeyPath {
    type Err = AwssmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_and_nested() {
        assert_eq!(KeyPath::parse("a").unwrap().segments(), ["a"]);
        assert_eq!(
            KeyPath::parse("db.primary.password").unwrap().segments(),
            ["db", "primary", "password"]
        );
    }

    #[test]
    fn test_parse_escapes() {
        let path = KeyPath::parse(r"smtp\.host").unwrap();
        assert_eq!(path.segments(), ["smtp.host"]);
        assert_eq!(path.as_str(), r"smtp\.host");

        let path = KeyPath::parse(r"a\\.b").unwrap();
        assert_eq!(path.segments(), [r"a\", "b"]);
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        for bad in ["", ".", "a.", ".a", "a..b", "a\\"] {
            let err = KeyPath::parse(bad).unwrap_err();
            assert!(
                matches!(err, AwssmError::InvalidKeyPath { .. }),
                "expected InvalidKeyPath for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("12"), Some(12));
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("+1"), None);
        assert_eq!(array_index("1a"), None);
    }
}
