//! LMDB-backed [`DocumentStore`].
//!
//! One LMDB environment lives in the directory `<name>.lmdb` and holds a single
//! named database. Each document is stored under its full `/`-joined path as a
//! JSON-serialized [`StoredDocument`], so a collection's documents share a key
//! prefix.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::document_path::{DocumentPath, SEPARATOR};
use crate::document_store::{server_now, DocumentStore};
use crate::local_db_model::{resolve_fields, Fields, StoredDocument};

const MAP_SIZE: usize = 64 * 1024 * 1024;
const MAX_DBS: u32 = 1;
const DOCUMENTS_DB: &str = "documents";

pub struct LmdbDocumentStore {
    env: Option<Environment>,
    db: Database,
    dir: PathBuf,
}

impl LmdbDocumentStore {
    /// Opens (creating if needed) the environment at `<name>.lmdb`.
    pub fn init(name: impl AsRef<str>) -> Result<Self, AppResponse> {
        let dir = PathBuf::from(format!("{}.lmdb", name.as_ref()));
        fs::create_dir_all(&dir)?;

        let env = Environment::new()
            .set_max_dbs(MAX_DBS)
            .set_map_size(MAP_SIZE)
            .open(&dir)?;
        let db = env.create_db(Some(DOCUMENTS_DB), DatabaseFlags::empty())?;

        info!("LMDB document store opened at {}", dir.display());
        Ok(Self {
            env: Some(env),
            db,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    fn env(&self) -> Result<&Environment, AppResponse> {
        self.env.as_ref().ok_or_else(|| {
            AppResponse::DatabaseError(format!("Store at {} is closed", self.dir.display()))
        })
    }

    pub fn get_document(&self, path: &DocumentPath) -> Result<Option<StoredDocument>, AppResponse> {
        path.ensure_document()?;
        let txn = self.env()?.begin_ro_txn()?;
        let key = path.to_string();

        let result = match txn.get(self.db, &key) {
            Ok(bytes) => Some(serde_json::from_slice(bytes)?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(AppResponse::from(e)),
        };
        Ok(result)
    }

    /// Documents directly inside `collection`, ordered by key.
    pub fn list_collection(&self, collection: &DocumentPath) -> Result<Vec<StoredDocument>, AppResponse> {
        collection.ensure_collection()?;
        let prefix = format!("{}{}", collection, SEPARATOR);

        self.scan(|key| {
            key.strip_prefix(prefix.as_str())
                .map_or(false, |rest| !rest.contains(SEPARATOR))
        })
    }

    pub fn get_all(&self) -> Result<Vec<StoredDocument>, AppResponse> {
        self.scan(|_| true)
    }

    fn scan(&self, keep: impl Fn(&str) -> bool) -> Result<Vec<StoredDocument>, AppResponse> {
        let txn = self.env()?.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.db)?;

        let mut documents = Vec::new();
        for (key, value) in cursor.iter_start() {
            let key = match std::str::from_utf8(key) {
                Ok(k) => k,
                Err(e) => {
                    warn!("Skipping non UTF-8 key: {e}");
                    continue;
                }
            };
            if keep(key) {
                documents.push(serde_json::from_slice(value)?);
            }
        }
        debug!("Scan returned {} documents", documents.len());
        Ok(documents)
    }

    pub fn clear_all_records(&self) -> Result<(), AppResponse> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;
        env.sync(true)?;
        info!("All documents cleared from {}", self.dir.display());
        Ok(())
    }

    /// Flushes and releases the environment. Later calls report a closed store.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        match self.env.take() {
            Some(env) => {
                env.sync(true)?;
                info!("LMDB environment at {} closed", self.dir.display());
                Ok(())
            }
            None => {
                debug!("close_database called on an already closed store");
                Ok(())
            }
        }
    }
}

impl DocumentStore for LmdbDocumentStore {
    fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), AppResponse> {
        path.ensure_document()?;

        let doc = StoredDocument {
            id: path.id().to_string(),
            path: path.to_string(),
            data: resolve_fields(fields, &server_now()),
        };
        let json = serde_json::to_vec(&doc)?;

        let mut txn = self.env()?.begin_rw_txn()?;
        txn.put(self.db, &doc.path, &json, WriteFlags::empty())?;
        txn.commit()?;

        debug!("Stored {}", doc.path);
        Ok(())
    }
}
