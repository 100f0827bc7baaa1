//! Document cache shared by every context of one resolution lineage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::types::SchemaLocation;

/// Map from schema location to parsed document.
///
/// Cloning a `DocumentCache` yields another handle to the same store.
/// Entries are never evicted or replaced: the first document stored under a
/// location stays there for the lifetime of the lineage.
#[derive(Debug, Clone, Default)]
pub struct DocumentCache {
    documents: Rc<RefCell<HashMap<SchemaLocation, Rc<Value>>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &SchemaLocation) -> Option<Rc<Value>> {
        self.documents.borrow().get(location).cloned()
    }

    /// Store a document unless the location is already taken.
    ///
    /// Returns the document now cached under `location`, which is the
    /// earlier one if there was a previous entry.
    pub fn put(&self, location: SchemaLocation, document: Rc<Value>) -> Rc<Value> {
        self.documents
            .borrow_mut()
            .entry(location)
            .or_insert(document)
            .clone()
    }

    pub fn contains(&self, location: &SchemaLocation) -> bool {
        self.documents.borrow().contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.documents.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.borrow().is_empty()
    }

    /// Whether two handles refer to the same store.
    pub fn same_store(&self, other: &DocumentCache) -> bool {
        Rc::ptr_eq(&self.documents, &other.documents)
    }
}
