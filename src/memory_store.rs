use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::app_response::AppResponse;
use crate::document_path::DocumentPath;
use crate::document_store::{server_now, DocumentStore};
use crate::local_db_model::{resolve_fields, Fields, StoredDocument};

/// A [`DocumentStore`] kept in process memory.
///
/// Used for dry runs and tests. Paths registered with [`fail_on`](Self::fail_on)
/// reject their write with a `DatabaseError`, the way an unavailable backend would.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<BTreeMap<DocumentPath, StoredDocument>>,
    failing: Mutex<HashSet<DocumentPath>>,
    writes: Mutex<Vec<DocumentPath>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write to `path` fail.
    pub fn fail_on(&self, path: DocumentPath) {
        lock(&self.failing).insert(path);
    }

    pub fn get_document(&self, path: &DocumentPath) -> Result<Option<StoredDocument>, AppResponse> {
        path.ensure_document()?;
        Ok(lock(&self.documents).get(path).cloned())
    }

    /// Documents directly inside `collection`, ordered by path.
    pub fn list_collection(&self, collection: &DocumentPath) -> Result<Vec<StoredDocument>, AppResponse> {
        collection.ensure_collection()?;
        Ok(lock(&self.documents)
            .iter()
            .filter(|(path, _)| path.is_direct_child_of(collection))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    pub fn get_all(&self) -> Vec<StoredDocument> {
        lock(&self.documents).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.documents).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.documents).is_empty()
    }

    /// Every path a write succeeded on, in call order.
    pub fn write_log(&self) -> Vec<DocumentPath> {
        lock(&self.writes).clone()
    }

    pub fn clear_all_records(&self) {
        lock(&self.documents).clear();
        lock(&self.writes).clear();
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), AppResponse> {
        path.ensure_document()?;

        if lock(&self.failing).contains(path) {
            warn!("Injected write failure at {}", path);
            return Err(AppResponse::DatabaseError(format!("Store unavailable for {path}")));
        }

        let doc = StoredDocument {
            id: path.id().to_string(),
            path: path.to_string(),
            data: resolve_fields(fields, &server_now()),
        };
        lock(&self.documents).insert(path.clone(), doc);
        lock(&self.writes).push(path.clone());
        Ok(())
    }
}

// A panic while holding one of these locks cannot leave the maps half-updated,
// so a poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
