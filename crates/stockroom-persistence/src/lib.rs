//! Durable storage for the stockroom entity collections.
//!
//! The store talks to a [`Backend`]: a small document-store contract with
//! `list`/`create`/`update`/`delete`, per-collection change subscriptions,
//! and one conditional operation ([`Backend::fulfill`]) that applies the
//! stock decrement and the issued status together under the backend's lock.
//!
//! Two backends implement the contract:
//!
//! - [`LocalBackend`] writes a single JSON snapshot file, replaced
//!   atomically on every write. When the file does not exist the seed data
//!   set is used.
//! - [`SharedBackend`] keeps one JSON document file per collection, shareable
//!   between several store sessions in one process; every mutation fans a
//!   full-collection snapshot out to all watchers. An empty shared store is
//!   seeded on first connection.
//!
//! Which backend to use is a configuration decision made by the caller;
//! nothing in the contract leaks the choice.

mod backend;
mod error;
mod local;
mod seed;
mod shared;
mod tables;

pub use backend::{Backend, ChangeEvent, Collection, FulfillOutcome, Patch, Watcher};
pub use error::{PersistenceError, Result};
pub use local::LocalBackend;
pub use seed::seed_state;
pub use shared::SharedBackend;
