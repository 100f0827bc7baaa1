//! Core types shared by the resolution engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON Schema dialect a document conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialectVersion {
    #[serde(rename = "draft3")]
    Draft3,
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

/// Dialect markers as they appear in `$schema`, without the trailing `#`.
const DIALECT_MARKERS: &[(&str, DialectVersion)] = &[
    ("json-schema.org/draft-03/schema", DialectVersion::Draft3),
    ("json-schema.org/draft-04/schema", DialectVersion::Draft4),
    ("json-schema.org/draft-06/schema", DialectVersion::Draft6),
    ("json-schema.org/draft-07/schema", DialectVersion::Draft7),
    ("json-schema.org/draft/2019-09/schema", DialectVersion::Draft201909),
    ("json-schema.org/draft/2020-12/schema", DialectVersion::Draft202012),
];

impl DialectVersion {
    /// All known dialects, oldest first.
    pub const ALL: [DialectVersion; 6] = [
        DialectVersion::Draft3,
        DialectVersion::Draft4,
        DialectVersion::Draft6,
        DialectVersion::Draft7,
        DialectVersion::Draft201909,
        DialectVersion::Draft202012,
    ];

    /// Look up the dialect declared by a `$schema` value.
    ///
    /// Returns `None` for unrecognized markers; callers fall back to a default.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let marker = marker.strip_suffix('#').unwrap_or(marker);
        let rest = marker
            .strip_prefix("https://")
            .or_else(|| marker.strip_prefix("http://"))?;

        DIALECT_MARKERS
            .iter()
            .find(|(known, _)| *known == rest)
            .map(|(_, version)| *version)
    }

    /// Canonical `$schema` URI for this dialect.
    pub fn marker(&self) -> &'static str {
        match self {
            DialectVersion::Draft3 => "http://json-schema.org/draft-03/schema#",
            DialectVersion::Draft4 => "http://json-schema.org/draft-04/schema#",
            DialectVersion::Draft6 => "http://json-schema.org/draft-06/schema#",
            DialectVersion::Draft7 => "http://json-schema.org/draft-07/schema#",
            DialectVersion::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            DialectVersion::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Short name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DialectVersion::Draft3 => "draft3",
            DialectVersion::Draft4 => "draft4",
            DialectVersion::Draft6 => "draft6",
            DialectVersion::Draft7 => "draft7",
            DialectVersion::Draft201909 => "draft2019-09",
            DialectVersion::Draft202012 => "draft2020-12",
        }
    }

    /// Keyword a document of this dialect uses to declare its own URI.
    pub fn id_keyword(&self) -> &'static str {
        match self {
            DialectVersion::Draft3 | DialectVersion::Draft4 => "id",
            _ => "$id",
        }
    }
}

impl fmt::Display for DialectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        DialectVersion::ALL
            .iter()
            .find(|v| v.name() == wanted)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = DialectVersion::ALL.iter().map(|v| v.name()).collect();
                format!("unknown dialect \"{}\": expected one of {}", s, names.join(", "))
            })
    }
}

/// Drop an empty fragment, so `http://x/s.json#` and `http://x/s.json`
/// name the same document.
pub fn normalize_uri(mut uri: Url) -> Url {
    if uri.fragment() == Some("") {
        uri.set_fragment(None);
    }
    uri
}

/// Identity under which a schema document was found.
///
/// Documents that declare no usable absolute URI share the `Anonymous`
/// identity, which is distinct from any real URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaLocation {
    Anonymous,
    Uri(Url),
}

impl SchemaLocation {
    /// Parse a self-declared identifier, recovering to `Anonymous`.
    ///
    /// Anything that is not an absolute URI (malformed text, relative
    /// references, bare fragments) yields the anonymous identity.
    pub fn parse_or_anonymous(id: &str) -> Self {
        match Url::parse(id) {
            Ok(url) => SchemaLocation::Uri(normalize_uri(url)),
            Err(err) => {
                tracing::debug!(id = id, error = %err, "unusable schema id, treating document as anonymous");
                SchemaLocation::Anonymous
            }
        }
    }

    /// The URI, unless this is the anonymous identity.
    pub fn as_uri(&self) -> Option<&Url> {
        match self {
            SchemaLocation::Anonymous => None,
            SchemaLocation::Uri(url) => Some(url),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SchemaLocation::Anonymous)
    }
}

impl From<Url> for SchemaLocation {
    fn from(url: Url) -> Self {
        SchemaLocation::Uri(normalize_uri(url))
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaLocation::Anonymous => f.write_str("(anonymous)"),
            SchemaLocation::Uri(url) => write!(f, "{}", url),
        }
    }
}
