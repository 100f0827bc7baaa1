//! JSON Pointer (RFC 6901) parsing and navigation.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ResolveError;

/// A parsed JSON Pointer.
///
/// Accepts both the plain form (`/definitions/foo`) and the URI fragment
/// form (`#/definitions/foo`). The empty pointer addresses the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The pointer to the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer in plain or fragment form.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidPointer` if a non-empty pointer does not
    /// start with `/`, or contains a `~` not followed by `0` or `1`.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let path = input.strip_prefix('#').unwrap_or(input);
        if path.is_empty() {
            return Ok(Self::root());
        }

        let Some(rest) = path.strip_prefix('/') else {
            return Err(ResolveError::InvalidPointer {
                pointer: input.to_string(),
                message: "must be empty or start with '/'".to_string(),
            });
        };

        let tokens = rest
            .split('/')
            .map(|raw| unescape_token(raw, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    /// Parse the fragment of a URI, which may carry percent-encoded octets.
    pub fn from_uri_fragment(fragment: &str) -> Result<Self, ResolveError> {
        let decoded = percent_decode(fragment).ok_or_else(|| ResolveError::InvalidPointer {
            pointer: fragment.to_string(),
            message: "invalid percent-encoding".to_string(),
        })?;
        Self::parse(&decoded)
    }

    /// Append a reference token (unescaped form).
    pub fn push(mut self, token: impl Into<String>) -> Self {
        self.tokens.push(token.into());
        self
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Resolve this pointer against a document.
    ///
    /// Returns `None` when any step is missing. Array steps must be
    /// canonical decimal indices (no sign, no leading zeros).
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for token in &self.tokens {
            current = match current {
                Value::Object(map) => map.get(token)?,
                Value::Array(items) => items.get(parse_index(token)?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

fn unescape_token(raw: &str, pointer: &str) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(ResolveError::InvalidPointer {
                    pointer: pointer.to_string(),
                    message: "'~' must be followed by '0' or '1'".to_string(),
                })
            }
        }
    }
    Ok(out)
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl FromStr for JsonPointer {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPointer::parse(s)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_plain_and_fragment_forms() {
        let plain = JsonPointer::parse("/definitions/foo").unwrap();
        let fragment = JsonPointer::parse("#/definitions/foo").unwrap();
        assert_eq!(plain, fragment);
        assert_eq!(plain.tokens(), ["definitions", "foo"]);
    }

    #[test]
    fn parse_empty_is_root() {
        assert!(JsonPointer::parse("").unwrap().is_root());
        assert!(JsonPointer::parse("#").unwrap().is_root());
    }

    #[test]
    fn parse_unescapes_tokens() {
        let pointer = JsonPointer::parse("/a~1b/c~0d").unwrap();
        assert_eq!(pointer.tokens(), ["a/b", "c~d"]);
        assert_eq!(pointer.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn parse_rejects_missing_slash() {
        let result = JsonPointer::parse("definitions/foo");
        assert!(matches!(result, Err(ResolveError::InvalidPointer { .. })));
    }

    #[test]
    fn parse_rejects_bad_escape() {
        let result = JsonPointer::parse("/a~2");
        assert!(matches!(result, Err(ResolveError::InvalidPointer { .. })));
    }

    #[test]
    fn from_uri_fragment_percent_decodes() {
        let pointer = JsonPointer::from_uri_fragment("/definitions/a%20b").unwrap();
        assert_eq!(pointer.tokens(), ["definitions", "a b"]);

        let result = JsonPointer::from_uri_fragment("/definitions/a%2");
        assert!(matches!(result, Err(ResolveError::InvalidPointer { .. })));
    }

    #[test]
    fn resolve_objects_and_arrays() {
        let doc = json!({
            "items": [{ "type": "string" }, { "type": "number" }],
            "": { "empty": true }
        });
        let pointer = JsonPointer::parse("/items/1/type").unwrap();
        assert_eq!(pointer.resolve(&doc), Some(&json!("number")));

        let pointer = JsonPointer::parse("/").unwrap();
        assert_eq!(pointer.resolve(&doc), Some(&json!({ "empty": true })));
    }

    #[test]
    fn resolve_rejects_non_canonical_indices() {
        let doc = json!({ "items": ["a", "b"] });
        assert!(JsonPointer::parse("/items/01").unwrap().resolve(&doc).is_none());
        assert!(JsonPointer::parse("/items/-").unwrap().resolve(&doc).is_none());
        assert!(JsonPointer::parse("/items/2").unwrap().resolve(&doc).is_none());
    }

    #[test]
    fn resolve_missing_returns_none() {
        let doc = json!({ "type": "object" });
        let pointer = JsonPointer::root().push("properties").push("id");
        assert!(pointer.resolve(&doc).is_none());
    }
}
