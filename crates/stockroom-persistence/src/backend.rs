//! The persistence adapter contract.

use std::fmt;
use std::sync::mpsc::Receiver;

use serde_json::Value;

use stockroom_model::EntityId;

use crate::error::Result;

/// The three entity collections known to every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Materials,
    Users,
    Requests,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Materials,
        Collection::Users,
        Collection::Requests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Materials => "materials",
            Collection::Users => "users",
            Collection::Requests => "requests",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial document update: fields present overwrite the stored value.
pub type Patch = serde_json::Map<String, Value>;

/// A full-collection snapshot delivered to watchers after a mutation.
///
/// Snapshot (rather than delta) semantics keep the consumer trivial: replace
/// the collection wholesale, the way the source system's change listeners
/// behaved.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub documents: Vec<Value>,
}

/// Receiving end of a collection subscription.
///
/// Events queue up until drained; dropping the watcher unsubscribes.
pub struct Watcher {
    receiver: Receiver<ChangeEvent>,
}

impl Watcher {
    pub(crate) fn new(receiver: Receiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Take the next pending event, if any. Never blocks.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Outcome of the atomic fulfillment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillOutcome {
    /// Stock was decremented and the request marked issued.
    Applied { new_stock: u32 },
    /// The request was already issued; nothing changed.
    AlreadyIssued,
    /// Not enough stock on hand; nothing changed.
    InsufficientStock { available: u32, requested: u32 },
}

/// Storage contract the entity store depends on.
///
/// Documents cross the boundary as JSON values keyed by a `Collection` and
/// an id field, which is how the remote document store this abstracts over
/// shapes its records.
pub trait Backend: Send + Sync {
    /// All documents currently in the collection, ordered by id.
    fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Insert a document, allocating and returning its id. Any `id` field
    /// in the input is overwritten with the allocated value.
    fn create(&self, collection: Collection, document: Value) -> Result<EntityId>;

    /// Merge the patch fields into an existing document.
    fn update(&self, collection: Collection, id: EntityId, patch: Patch) -> Result<()>;

    /// Remove a document. Deleting an absent id is a no-op.
    fn delete(&self, collection: Collection, id: EntityId) -> Result<()>;

    /// Watch a collection. The watcher receives a full snapshot after every
    /// mutation of that collection, including the subscriber's own writes.
    fn subscribe(&self, collection: Collection) -> Watcher;

    /// Atomically issue the request: re-check its status and the material's
    /// stock under the backend's lock, then either apply both the stock
    /// decrement and the status change together, or apply nothing.
    ///
    /// This is the compare-and-swap that keeps two racing sessions from
    /// decrementing stock twice for one request.
    fn fulfill(&self, request_id: EntityId) -> Result<FulfillOutcome>;
}
