//! Shared document-store backend.
//!
//! One JSON document file per collection under a data directory, with every
//! mutation fanned out to all watchers as a full-collection snapshot. A
//! single instance can serve several store sessions at once (wrap it in an
//! `Arc`); its lock is what makes [`Backend::fulfill`] safe against two
//! sessions issuing the same request concurrently.
//!
//! An empty store (no users) is seeded on first connection, and only then.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info};

use stockroom_model::EntityId;

use crate::backend::{Backend, Collection, FulfillOutcome, Patch, Watcher};
use crate::error::{PersistenceError, Result};
use crate::seed::seed_state;
use crate::tables::{SubscriberSet, Tables};

pub struct SharedBackend {
    dir: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    tables: Tables,
    subscribers: SubscriberSet,
}

impl SharedBackend {
    /// Open (or initialize) the document store under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::Io {
            operation: "create directory",
            path: dir.clone(),
            source,
        })?;

        let mut tables = Tables::default();
        for collection in Collection::ALL {
            let path = collection_path(&dir, collection);
            if !path.exists() {
                continue;
            }
            let text = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
                operation: "read",
                path: path.clone(),
                source,
            })?;
            let documents: Vec<Value> =
                serde_json::from_str(&text).map_err(|source| PersistenceError::Parse {
                    path: path.clone(),
                    source,
                })?;
            tables.replace_collection(collection, documents, &path)?;
        }

        // One-time bulk seed, keyed on the users collection being empty.
        // Collections that already hold documents are left alone.
        if tables.list(Collection::Users).is_empty() {
            info!(dir = %dir.display(), "store is empty, seeding initial data");
            let seeded = Tables::from_state(&seed_state())?;
            for collection in Collection::ALL {
                if tables.list(collection).is_empty() {
                    tables.replace_collection(collection, seeded.list(collection), &dir)?;
                }
                write_collection(&dir, collection, &tables.list(collection))?;
            }
        }

        Ok(Self {
            dir,
            inner: Mutex::new(Inner {
                tables,
                subscribers: SubscriberSet::default(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_and_notify(&self, inner: &mut Inner, changed: &[Collection]) -> Result<()> {
        for &collection in changed {
            let documents = inner.tables.list(collection);
            write_collection(&self.dir, collection, &documents)?;
            inner.subscribers.notify(collection, &documents);
        }
        Ok(())
    }
}

impl Backend for SharedBackend {
    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self.lock().tables.list(collection))
    }

    fn create(&self, collection: Collection, document: Value) -> Result<EntityId> {
        let mut inner = self.lock();
        let id = inner.tables.create(collection, document)?;
        self.persist_and_notify(&mut inner, &[collection])?;
        debug!(%collection, %id, "created document");
        Ok(id)
    }

    fn update(&self, collection: Collection, id: EntityId, patch: Patch) -> Result<()> {
        let mut inner = self.lock();
        inner.tables.update(collection, id, patch)?;
        self.persist_and_notify(&mut inner, &[collection])
    }

    fn delete(&self, collection: Collection, id: EntityId) -> Result<()> {
        let mut inner = self.lock();
        if inner.tables.delete(collection, id) {
            self.persist_and_notify(&mut inner, &[collection])?;
        }
        Ok(())
    }

    fn subscribe(&self, collection: Collection) -> Watcher {
        self.lock().subscribers.subscribe(collection)
    }

    fn fulfill(&self, request_id: EntityId) -> Result<FulfillOutcome> {
        let mut inner = self.lock();
        let outcome = inner.tables.fulfill(request_id)?;
        if let FulfillOutcome::Applied { new_stock } = outcome {
            self.persist_and_notify(
                &mut inner,
                &[Collection::Materials, Collection::Requests],
            )?;
            debug!(%request_id, new_stock, "request fulfilled");
        }
        Ok(outcome)
    }
}

fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.as_str()))
}

fn write_collection(dir: &Path, collection: Collection, documents: &[Value]) -> Result<()> {
    let path = collection_path(dir, collection);
    let text = serde_json::to_string_pretty(documents)
        .map_err(|source| PersistenceError::Encode { source })?;
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|source| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(text.as_bytes())
        .map_err(|source| PersistenceError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
    file.sync_all().map_err(|source| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, &path).map_err(|source| PersistenceError::AtomicWriteFailed {
        path,
        source,
    })
}
