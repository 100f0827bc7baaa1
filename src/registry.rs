//! Scheme handler registry: dispatches document fetches by URI scheme.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use url::Url;

use crate::error::{FetchError, ResolveError};

/// Something able to retrieve a schema document for a URI.
///
/// Handlers enforce their own timeouts; the engine never retries.
pub trait SchemeHandler {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError>;
}

impl<F> SchemeHandler for F
where
    F: Fn(&Url) -> Result<Value, FetchError>,
{
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        self(uri)
    }
}

/// Mutable table from scheme name to handler.
///
/// Cloning yields another handle to the same table, so a registration made
/// through any context of a lineage is seen by all of them.
#[derive(Clone, Default)]
pub struct SchemeRegistry {
    handlers: Rc<RefCell<HashMap<String, Rc<dyn SchemeHandler>>>>,
}

impl SchemeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the handlers shipped in this crate: `file`, plus
    /// `http` and `https` when the `remote` feature is enabled.
    pub fn with_builtin_handlers() -> Self {
        let registry = Self::new();
        registry.register("file", crate::loader::FileHandler);
        #[cfg(feature = "remote")]
        {
            let http: Rc<dyn SchemeHandler> = Rc::new(crate::loader::HttpHandler::new());
            registry.register_shared("http", http.clone());
            registry.register_shared("https", http);
        }
        registry
    }

    /// Register a handler, replacing any previous one for this scheme.
    pub fn register(&self, scheme: &str, handler: impl SchemeHandler + 'static) {
        self.register_shared(scheme, Rc::new(handler));
    }

    /// Register a closure as the handler for a scheme.
    pub fn register_fn<F>(&self, scheme: &str, fetch: F)
    where
        F: Fn(&Url) -> Result<Value, FetchError> + 'static,
    {
        self.register_shared(scheme, Rc::new(fetch));
    }

    pub fn register_shared(&self, scheme: &str, handler: Rc<dyn SchemeHandler>) {
        self.handlers
            .borrow_mut()
            .insert(scheme.to_ascii_lowercase(), handler);
    }

    /// Remove the handler for a scheme. Returns whether one was registered.
    pub fn unregister(&self, scheme: &str) -> bool {
        self.handlers
            .borrow_mut()
            .remove(&scheme.to_ascii_lowercase())
            .is_some()
    }

    pub fn has_handler(&self, scheme: &str) -> bool {
        self.handlers
            .borrow()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered scheme names, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.handlers.borrow().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Look up the handler for a URI's scheme.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnsupportedScheme` when nothing is registered.
    pub fn handler_for(&self, uri: &Url) -> Result<Rc<dyn SchemeHandler>, ResolveError> {
        self.handlers
            .borrow()
            .get(uri.scheme())
            .cloned()
            .ok_or_else(|| ResolveError::UnsupportedScheme {
                scheme: uri.scheme().to_string(),
                uri: uri.to_string(),
            })
    }

    /// Fetch a document through the handler registered for its scheme.
    ///
    /// The table is not borrowed while the handler runs, so handlers may
    /// themselves register or unregister schemes.
    pub fn fetch(&self, uri: &Url) -> Result<Value, ResolveError> {
        let handler = self.handler_for(uri)?;
        tracing::debug!(uri = %uri, "fetching schema document");
        handler.fetch(uri).map_err(|source| ResolveError::Fetch {
            uri: uri.to_string(),
            source,
        })
    }

    /// Whether two handles refer to the same table.
    pub fn same_table(&self, other: &SchemeRegistry) -> bool {
        Rc::ptr_eq(&self.handlers, &other.handlers)
    }
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
