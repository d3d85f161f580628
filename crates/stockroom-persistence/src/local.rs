//! Snapshot-file backend.
//!
//! The whole database lives in one JSON file, replaced atomically on every
//! write. This is the single-session mode: watchers only ever see this
//! process's own writes.

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

pub struct LocalBackend {
    path: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    tables: Tables,
    subscribers: SubscriberSet,
}

impl LocalBackend {
    /// Open the snapshot file, seeding a fresh one when it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
                operation: "read",
                path: path.clone(),
                source,
            })?;
            let value: Value =
                serde_json::from_str(&text).map_err(|source| PersistenceError::Parse {
                    path: path.clone(),
                    source,
                })?;
            Tables::from_snapshot_value(&value, &path)?
        } else {
            info!(path = %path.display(), "no snapshot file, starting from seed data");
            let tables = Tables::from_state(&seed_state())?;
            write_snapshot(&path, &tables)?;
            tables
        };
        Ok(Self {
            path,
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
        write_snapshot(&self.path, &inner.tables)?;
        for &collection in changed {
            let documents = inner.tables.list(collection);
            inner.subscribers.notify(collection, &documents);
        }
        Ok(())
    }
}

impl Backend for LocalBackend {
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

/// Write the snapshot through a temp file and rename, so a crash mid-write
/// never leaves a truncated database behind.
fn write_snapshot(path: &Path, tables: &Tables) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serde_json::to_string_pretty(&tables.snapshot_value())
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
    fs::rename(&temp_path, path).map_err(|source| PersistenceError::AtomicWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
