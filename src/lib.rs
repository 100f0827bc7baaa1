//! Schema Provider
//!
//! Locates the JSON Schema that applies at any point of a validation run.
//!
//! A [`ResolutionContext`] wraps the active schema together with the URI it
//! was found under and the dialect it declares. New contexts are derived by
//! navigating a JSON Pointer, by substituting an inline schema, or by
//! dereferencing an absolute URI through pluggable per-scheme handlers.
//! Every context derived from one root shares the same document cache and
//! handler registry.
//!
//! # Example
//!
//! ```
//! use schema_provider::{DialectVersion, JsonPointer, ResolutionContext, SchemeRegistry};
//! use serde_json::json;
//!
//! let registry = SchemeRegistry::new();
//! registry.register_fn("mem", |_uri| {
//!     Ok(json!({
//!         "$schema": "http://json-schema.org/draft-07/schema#",
//!         "definitions": { "name": { "type": "string" } }
//!     }))
//! });
//!
//! let root = ResolutionContext::with_registry(
//!     DialectVersion::Draft4,
//!     json!({ "id": "mem://schemas/root.json", "properties": {} }),
//!     registry,
//! )
//! .unwrap();
//! assert_eq!(root.version(), DialectVersion::Draft4);
//!
//! let common = root.at_uri("mem://schemas/common.json").unwrap();
//! assert_eq!(common.version(), DialectVersion::Draft7);
//!
//! let name = common
//!     .at_point(&JsonPointer::parse("/definitions/name").unwrap())
//!     .unwrap();
//! assert_eq!(name.document()["type"], "string");
//! ```
//!
//! # Derivations
//!
//! | Operation | Active document | Location | Dialect |
//! |-----------|-----------------|----------|---------|
//! | `at_point` | node under the location's document | inherited | detected |
//! | `with_schema` | the given document | inherited | detected |
//! | `at_uri` (cached) | cached document | the URI | inherited |
//! | `at_uri` (fetched) | fetched document | the URI | detected |

mod cache;
mod context;
mod error;
mod loader;
mod pointer;
mod registry;
mod types;
mod validator;
mod version;

pub use cache::DocumentCache;
pub use context::ResolutionContext;
pub use error::{ErrorKind, FetchError, ResolveError, SchemaError, ValidateError};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str, source_uri, FileHandler};
pub use pointer::JsonPointer;
pub use registry::{SchemeHandler, SchemeRegistry};
pub use types::{json_type_name, normalize_uri, DialectVersion, SchemaLocation};
pub use validator::validate;
pub use version::{detect, ensure_schema};

#[cfg(feature = "remote")]
pub use loader::{load_schema_url, HttpHandler, HTTP_TIMEOUT};
