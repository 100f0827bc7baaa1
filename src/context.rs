//! Resolution context: the schema that is active at one point of validation.
//!
//! A root context is built once per validation run. Every other context is
//! derived from it, either by navigating a JSON Pointer (`at_point`), by
//! substituting a document (`with_schema`) or by dereferencing an absolute
//! URI (`at_uri`). All contexts of one lineage share a [`DocumentCache`] and a
//! [`SchemeRegistry`]; the active document, its location and its dialect are
//! private to each context.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::cache::DocumentCache;
use crate::error::ResolveError;
use crate::pointer::JsonPointer;
use crate::registry::{SchemeHandler, SchemeRegistry};
use crate::types::{normalize_uri, DialectVersion, SchemaLocation};
use crate::version::detect;

/// The active schema plus the shared state needed to move away from it.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    document: Rc<Value>,
    location: SchemaLocation,
    version: DialectVersion,
    default_version: DialectVersion,
    cache: DocumentCache,
    registry: SchemeRegistry,
}

/// What `at_uri` should do with a reference string.
enum UriTarget {
    /// Empty reference or bare fragment: stay where we are.
    Here,
    Absolute(Url),
}

impl ResolutionContext {
    /// Build a root context using the built-in scheme handlers.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidSchema` if the document is not an object.
    pub fn new(
        default_version: DialectVersion,
        document: impl Into<Rc<Value>>,
    ) -> Result<Self, ResolveError> {
        Self::with_registry(
            default_version,
            document,
            SchemeRegistry::with_builtin_handlers(),
        )
    }

    /// Build a root context that fetches through the given registry.
    ///
    /// The document's self-declared `id`/`$id` becomes its location when it
    /// is an absolute URI; otherwise the document is anonymous.
    pub fn with_registry(
        default_version: DialectVersion,
        document: impl Into<Rc<Value>>,
        registry: SchemeRegistry,
    ) -> Result<Self, ResolveError> {
        let document = document.into();
        let version = detect(&document, default_version)?;
        let location = declared_location(&document, version);

        let cache = DocumentCache::new();
        cache.put(location.clone(), document.clone());
        debug!(location = %location, version = %version, "created root resolution context");

        Ok(Self {
            document,
            location,
            version,
            default_version,
            cache,
            registry,
        })
    }

    /// Derive a context for the node at `pointer`.
    ///
    /// The pointer is resolved against the document cached under the current
    /// location, i.e. the last URI-anchored document of the lineage, not the
    /// active document itself.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::PointerNotFound` if nothing lives at `pointer`,
    /// or `ResolveError::InvalidSchema` if the node is not an object.
    pub fn at_point(&self, pointer: &JsonPointer) -> Result<Self, ResolveError> {
        let not_found = || ResolveError::PointerNotFound {
            location: self.location.to_string(),
            pointer: pointer.to_string(),
        };

        let anchor = self.cache.get(&self.location).ok_or_else(not_found)?;
        let node = pointer.resolve(&anchor).ok_or_else(not_found)?;
        trace!(location = %self.location, pointer = %pointer, "navigated to sub-schema");

        let document = Rc::new(node.clone());
        let version = detect(&document, self.default_version)?;
        Ok(self.derive(document, self.location.clone(), version))
    }

    /// Derive a context with `document` active, keeping the current location.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidSchema` if the document is not an object.
    pub fn with_schema(&self, document: impl Into<Rc<Value>>) -> Result<Self, ResolveError> {
        let document = document.into();
        let version = detect(&document, self.default_version)?;
        Ok(self.derive(document, self.location.clone(), version))
    }

    /// Derive a context for the document at an absolute URI.
    ///
    /// An empty reference or a bare fragment returns this context unchanged;
    /// fragments are navigated separately with [`at_point`](Self::at_point).
    /// Cached documents are reused with the current dialect version; misses
    /// are fetched through the registry, cached and version-detected.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidReference` for a relative reference that
    /// is not a bare fragment, `ResolveError::UnsupportedScheme` when no
    /// handler serves the scheme, `ResolveError::Fetch` when the handler
    /// fails, and `ResolveError::InvalidSchema` if the fetched document is
    /// not an object.
    pub fn at_uri(&self, uri: &str) -> Result<Self, ResolveError> {
        let uri = match classify_uri(uri)? {
            UriTarget::Here => return Ok(self.clone()),
            UriTarget::Absolute(uri) => uri,
        };
        self.at_url(uri)
    }

    /// Same as [`at_uri`](Self::at_uri) for an already-parsed absolute URI.
    pub fn at_url(&self, uri: Url) -> Result<Self, ResolveError> {
        let uri = normalize_uri(uri);
        let location = SchemaLocation::Uri(uri.clone());

        // Cache hits inherit the caller's version instead of re-detecting.
        if let Some(document) = self.cache.get(&location) {
            debug!(uri = %uri, "schema cache hit");
            return Ok(self.derive(document, location, self.version));
        }

        debug!(uri = %uri, "schema cache miss");
        let fetched = self.registry.fetch(&uri)?;
        let version = detect(&fetched, self.default_version)?;
        let document = self.cache.put(location.clone(), Rc::new(fetched));

        Ok(self.derive(document, location, version))
    }

    /// Follow a `$ref` value from this context.
    ///
    /// Relative references are resolved against the current location. The
    /// document part is dereferenced with [`at_url`](Self::at_url) and a
    /// non-empty fragment is then navigated as a JSON Pointer. From an
    /// anonymous location only fragment references can be followed.
    ///
    /// # Errors
    ///
    /// Any error from `at_url` or `at_point`, and
    /// `ResolveError::InvalidReference` for references that cannot be made
    /// absolute.
    pub fn follow_ref(&self, reference: &str) -> Result<Self, ResolveError> {
        let invalid = |message: String| ResolveError::InvalidReference {
            reference: reference.to_string(),
            message,
        };

        let (target, fragment) = match Url::parse(reference) {
            Ok(url) => (Some(url), None),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.location {
                SchemaLocation::Uri(base) => {
                    let joined = base.join(reference).map_err(|e| invalid(e.to_string()))?;
                    (Some(joined), None)
                }
                SchemaLocation::Anonymous if reference.is_empty() => (None, None),
                SchemaLocation::Anonymous => {
                    let fragment = reference.strip_prefix('#').ok_or_else(|| {
                        invalid("relative reference from an anonymous schema".to_string())
                    })?;
                    (None, Some(fragment.to_string()))
                }
            },
            Err(e) => return Err(invalid(e.to_string())),
        };

        let (ctx, fragment) = match target {
            Some(mut url) => {
                let fragment = url.fragment().map(str::to_string);
                url.set_fragment(None);
                (self.at_url(url)?, fragment)
            }
            None => (self.clone(), fragment),
        };

        match fragment.as_deref() {
            None | Some("") => Ok(ctx),
            Some(fragment) => ctx.at_point(&JsonPointer::from_uri_fragment(fragment)?),
        }
    }

    /// The active schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Shared handle to the active schema document.
    pub fn shared_document(&self) -> Rc<Value> {
        self.document.clone()
    }

    /// Where the active document (or its enclosing document) was found.
    pub fn location(&self) -> &SchemaLocation {
        &self.location
    }

    /// Dialect detected for the active document.
    pub fn version(&self) -> DialectVersion {
        self.version
    }

    pub fn default_version(&self) -> DialectVersion {
        self.default_version
    }

    /// Change the default dialect used by contexts derived from this one.
    ///
    /// The version already detected for this context is left as it is.
    pub fn set_default_version(&mut self, version: DialectVersion) {
        self.default_version = version;
    }

    /// Register a handler for a scheme, for the whole lineage.
    pub fn register_handler(&self, scheme: &str, handler: impl SchemeHandler + 'static) {
        self.registry.register(scheme, handler);
    }

    /// Remove the handler for a scheme, for the whole lineage.
    pub fn unregister_handler(&self, scheme: &str) -> bool {
        self.registry.unregister(scheme)
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    fn derive(
        &self,
        document: Rc<Value>,
        location: SchemaLocation,
        version: DialectVersion,
    ) -> Self {
        Self {
            document,
            location,
            version,
            default_version: self.default_version,
            cache: self.cache.clone(),
            registry: self.registry.clone(),
        }
    }
}

/// Read the document's self-declared URI, recovering to anonymous.
///
/// The dialect's own id keyword is tried first, then the other spelling.
fn declared_location(document: &Value, version: DialectVersion) -> SchemaLocation {
    let primary = version.id_keyword();
    let fallback = if primary == "id" { "$id" } else { "id" };

    [primary, fallback]
        .iter()
        .find_map(|key| document.get(*key).and_then(Value::as_str))
        .map(SchemaLocation::parse_or_anonymous)
        .unwrap_or(SchemaLocation::Anonymous)
}

fn classify_uri(uri: &str) -> Result<UriTarget, ResolveError> {
    match Url::parse(uri) {
        Ok(url) => Ok(UriTarget::Absolute(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if uri.is_empty() || uri.starts_with('#') {
                Ok(UriTarget::Here)
            } else {
                Err(ResolveError::InvalidReference {
                    reference: uri.to_string(),
                    message: "URI is not absolute and is not a JSON Pointer either".to_string(),
                })
            }
        }
        Err(e) => Err(ResolveError::InvalidReference {
            reference: uri.to_string(),
            message: e.to_string(),
        }),
    }
}
