//! In-memory document tables and subscription plumbing shared by backends.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::{Sender, channel};

use serde_json::Value;

use stockroom_model::{DatabaseState, EntityId, RequestStatus};

use crate::backend::{ChangeEvent, Collection, FulfillOutcome, Patch, Watcher};
use crate::error::{PersistenceError, Result};

/// Documents per collection, keyed by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    collections: BTreeMap<Collection, BTreeMap<u64, Value>>,
}

impl Tables {
    /// Build tables from typed entity collections.
    pub fn from_state(state: &DatabaseState) -> Result<Self> {
        let mut tables = Tables::default();
        for material in &state.materials {
            tables.insert_encoded(Collection::Materials, material.id, material)?;
        }
        for user in &state.users {
            tables.insert_encoded(Collection::Users, user.id, user)?;
        }
        for request in &state.requests {
            tables.insert_encoded(Collection::Requests, request.id, request)?;
        }
        Ok(tables)
    }

    fn insert_encoded<T: serde::Serialize>(
        &mut self,
        collection: Collection,
        id: EntityId,
        entity: &T,
    ) -> Result<()> {
        let doc = serde_json::to_value(entity)
            .map_err(|source| PersistenceError::Encode { source })?;
        self.table_mut(collection).insert(id.0, doc);
        Ok(())
    }

    /// Read tables back out of a snapshot value (`{"materials": [..], ..}`).
    pub fn from_snapshot_value(value: &Value, path: &Path) -> Result<Self> {
        let mut tables = Tables::default();
        for collection in Collection::ALL {
            let documents = value
                .get(collection.as_str())
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            tables.replace_collection(collection, documents, path)?;
        }
        Ok(tables)
    }

    /// Load one collection from a bare array of documents.
    pub fn replace_collection(
        &mut self,
        collection: Collection,
        documents: Vec<Value>,
        path: &Path,
    ) -> Result<()> {
        let table = self.table_mut(collection);
        table.clear();
        for doc in documents {
            let id = doc_id(&doc).ok_or_else(|| PersistenceError::Parse {
                path: path.to_path_buf(),
                source: serde::de::Error::custom(format!(
                    "{collection} document without a numeric id"
                )),
            })?;
            table.insert(id, doc);
        }
        Ok(())
    }

    /// The whole store as one snapshot value.
    pub fn snapshot_value(&self) -> Value {
        let mut snapshot = serde_json::Map::new();
        for collection in Collection::ALL {
            snapshot.insert(
                collection.as_str().to_string(),
                Value::Array(self.list(collection)),
            );
        }
        Value::Object(snapshot)
    }

    pub fn list(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .get(&collection)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn create(&mut self, collection: Collection, mut document: Value) -> Result<EntityId> {
        if !document.is_object() {
            return Err(PersistenceError::Encode {
                source: serde::ser::Error::custom("document is not a JSON object"),
            });
        }
        let table = self.table_mut(collection);
        let id = table.keys().next_back().copied().unwrap_or(0) + 1;
        document["id"] = Value::from(id);
        table.insert(id, document);
        Ok(EntityId(id))
    }

    pub fn update(&mut self, collection: Collection, id: EntityId, patch: Patch) -> Result<()> {
        let doc = self
            .table_mut(collection)
            .get_mut(&id.0)
            .ok_or(PersistenceError::MissingDocument { collection, id })?;
        if let Some(fields) = doc.as_object_mut() {
            for (key, value) in patch {
                fields.insert(key, value);
            }
        }
        Ok(())
    }

    /// Returns true if a document was removed.
    pub fn delete(&mut self, collection: Collection, id: EntityId) -> bool {
        self.table_mut(collection).remove(&id.0).is_some()
    }

    /// The conditional issue: re-validate status and stock, then apply the
    /// decrement and the status change together, or neither.
    pub fn fulfill(&mut self, request_id: EntityId) -> Result<FulfillOutcome> {
        let request = self
            .collections
            .get(&Collection::Requests)
            .and_then(|table| table.get(&request_id.0))
            .ok_or(PersistenceError::MissingDocument {
                collection: Collection::Requests,
                id: request_id,
            })?;

        let status = request
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(Collection::Requests, request_id, "missing status"))?;
        if status == RequestStatus::Issued.as_str() {
            return Ok(FulfillOutcome::AlreadyIssued);
        }

        let material_id = field_u64(request, "material_id")
            .ok_or_else(|| malformed(Collection::Requests, request_id, "missing material_id"))?;
        let requested = field_u32(request, "quantity")
            .ok_or_else(|| malformed(Collection::Requests, request_id, "missing quantity"))?;

        let material = self
            .collections
            .get(&Collection::Materials)
            .and_then(|table| table.get(&material_id))
            .ok_or(PersistenceError::MissingDocument {
                collection: Collection::Materials,
                id: EntityId(material_id),
            })?;
        let available = field_u32(material, "stock").ok_or_else(|| {
            malformed(Collection::Materials, EntityId(material_id), "missing stock")
        })?;

        if available < requested {
            return Ok(FulfillOutcome::InsufficientStock {
                available,
                requested,
            });
        }

        let new_stock = available - requested;
        if let Some(fields) = self
            .table_mut(Collection::Materials)
            .get_mut(&material_id)
            .and_then(Value::as_object_mut)
        {
            fields.insert("stock".to_string(), Value::from(new_stock));
        }
        if let Some(fields) = self
            .table_mut(Collection::Requests)
            .get_mut(&request_id.0)
            .and_then(Value::as_object_mut)
        {
            fields.insert(
                "status".to_string(),
                Value::from(RequestStatus::Issued.as_str()),
            );
        }
        Ok(FulfillOutcome::Applied { new_stock })
    }

    fn table_mut(&mut self, collection: Collection) -> &mut BTreeMap<u64, Value> {
        self.collections.entry(collection).or_default()
    }
}

fn doc_id(doc: &Value) -> Option<u64> {
    doc.get("id").and_then(Value::as_u64)
}

fn field_u64(doc: &Value, field: &str) -> Option<u64> {
    doc.get(field).and_then(Value::as_u64)
}

fn field_u32(doc: &Value, field: &str) -> Option<u32> {
    field_u64(doc, field).and_then(|v| u32::try_from(v).ok())
}

fn malformed(collection: Collection, id: EntityId, reason: &str) -> PersistenceError {
    PersistenceError::MalformedDocument {
        collection,
        id,
        reason: reason.to_string(),
    }
}

/// Fan-out of change events to collection watchers.
///
/// Senders whose watcher has been dropped are pruned on the next notify.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    senders: Vec<(Collection, Sender<ChangeEvent>)>,
}

impl SubscriberSet {
    pub fn subscribe(&mut self, collection: Collection) -> Watcher {
        let (sender, receiver) = channel();
        self.senders.push((collection, sender));
        Watcher::new(receiver)
    }

    pub fn notify(&mut self, collection: Collection, documents: &[Value]) {
        self.senders.retain(|(subscribed, sender)| {
            if *subscribed != collection {
                return true;
            }
            sender
                .send(ChangeEvent {
                    collection,
                    documents: documents.to_vec(),
                })
                .is_ok()
        });
    }
}
