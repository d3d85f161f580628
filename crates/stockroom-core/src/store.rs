//! The entity store: owned collections, write-through CRUD, session user,
//! and the subscribe/notify contract consumers re-render from.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use stockroom_model::{
    DatabaseState, EntityId, Material, Request, RequestStatus, Role, User,
};
use stockroom_persistence::{Backend, Collection, Patch, Watcher};

use crate::error::{Result, StoreError};

/// Material fields without an id; the backend allocates one on create.
#[derive(Debug, Clone, Serialize)]
pub struct NewMaterial {
    pub name: String,
    pub stock: u32,
    pub unit: String,
}

/// User fields without an id.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub department: String,
    pub role: Role,
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct NewRequest {
    user_id: EntityId,
    material_id: EntityId,
    quantity: u32,
    request_date: chrono::DateTime<Utc>,
    status: RequestStatus,
}

type Listener = Box<dyn FnMut(Collection, &DatabaseState)>;

/// Single source of truth for the current process.
///
/// The store is an explicit owned value passed by reference to whoever needs
/// it; nothing here is a global. All mutations write through to the backend
/// before the in-memory copy changes, and registered listeners run after
/// every applied mutation.
pub struct Store {
    backend: Arc<dyn Backend>,
    state: DatabaseState,
    current_user: Option<User>,
    watchers: Vec<Watcher>,
    listeners: Vec<Listener>,
}

impl Store {
    /// Connect to a backend: subscribe to all collections, then load the
    /// initial state.
    pub fn open(backend: Arc<dyn Backend>) -> Result<Self> {
        let watchers = Collection::ALL
            .iter()
            .map(|&collection| backend.subscribe(collection))
            .collect();
        let mut store = Self {
            backend,
            state: DatabaseState::default(),
            current_user: None,
            watchers,
            listeners: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    fn reload(&mut self) -> Result<()> {
        self.state.materials = decode(self.backend.list(Collection::Materials)?, Collection::Materials)?;
        self.state.users = decode(self.backend.list(Collection::Users)?, Collection::Users)?;
        self.state.requests = decode(self.backend.list(Collection::Requests)?, Collection::Requests)?;
        debug!(
            materials = self.state.materials.len(),
            users = self.state.users.len(),
            requests = self.state.requests.len(),
            "store loaded"
        );
        Ok(())
    }

    pub fn state(&self) -> &DatabaseState {
        &self.state
    }

    pub fn materials(&self) -> &[Material] {
        &self.state.materials
    }

    pub fn users(&self) -> &[User] {
        &self.state.users
    }

    pub fn requests(&self) -> &[Request] {
        &self.state.requests
    }

    pub(crate) fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub(crate) fn state_mut(&mut self) -> &mut DatabaseState {
        &mut self.state
    }

    /// Register a listener called after every applied mutation, local or
    /// reflected from the backend.
    pub fn subscribe(&mut self, listener: impl FnMut(Collection, &DatabaseState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn notify(&mut self, collection: Collection) {
        let state = &self.state;
        for listener in &mut self.listeners {
            listener(collection, state);
        }
    }

    /// Drain pending backend change notifications and apply them.
    ///
    /// Snapshots replace the collection wholesale, so replaying this
    /// process's own writes is harmless and another session's writes become
    /// visible here. Returns the number of snapshots applied.
    pub fn poll_changes(&mut self) -> Result<usize> {
        let mut events = Vec::new();
        for watcher in &self.watchers {
            while let Some(event) = watcher.try_next() {
                events.push(event);
            }
        }
        let applied = events.len();
        for event in events {
            match event.collection {
                Collection::Materials => {
                    self.state.materials = decode(event.documents, Collection::Materials)?;
                }
                Collection::Users => {
                    self.state.users = decode(event.documents, Collection::Users)?;
                }
                Collection::Requests => {
                    self.state.requests = decode(event.documents, Collection::Requests)?;
                }
            }
            self.notify(event.collection);
        }
        Ok(applied)
    }

    // --- Material CRUD ---

    pub fn add_material(&mut self, new: NewMaterial) -> Result<Material> {
        let id = self.backend.create(Collection::Materials, encode(&new)?)?;
        let material = Material {
            id,
            name: new.name,
            stock: new.stock,
            unit: new.unit,
        };
        info!(material_id = %id, name = %material.name, "material added");
        self.state.materials.push(material.clone());
        self.notify(Collection::Materials);
        Ok(material)
    }

    /// Overwrite all mutable fields of the material with the given id.
    pub fn update_material(&mut self, material: Material) -> Result<()> {
        if self.state.material(material.id).is_none() {
            return Err(StoreError::MaterialNotFound(material.id));
        }
        let patch = patch_fields([
            ("name", Value::from(material.name.clone())),
            ("stock", Value::from(material.stock)),
            ("unit", Value::from(material.unit.clone())),
        ]);
        self.backend.update(Collection::Materials, material.id, patch)?;
        if let Some(stored) = self.state.material_mut(material.id) {
            *stored = material;
        }
        self.notify(Collection::Materials);
        Ok(())
    }

    /// Remove a material. Requests referencing it keep their dangling
    /// `material_id`; views render the gap as "Unknown".
    pub fn delete_material(&mut self, id: EntityId) -> Result<()> {
        self.backend.delete(Collection::Materials, id)?;
        self.state.materials.retain(|m| m.id != id);
        info!(material_id = %id, "material deleted");
        self.notify(Collection::Materials);
        Ok(())
    }

    // --- User CRUD ---

    /// Create a user. The username must not already be taken; the check
    /// runs only here, not on updates.
    pub fn add_user(&mut self, new: NewUser) -> Result<User> {
        if self.state.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::DuplicateUsername(new.username));
        }
        let id = self.backend.create(Collection::Users, encode(&new)?)?;
        let user = User {
            id,
            name: new.name,
            department: new.department,
            role: new.role,
            username: new.username,
            password: new.password,
        };
        info!(user_id = %id, username = %user.username, "user added");
        self.state.users.push(user.clone());
        self.notify(Collection::Users);
        Ok(user)
    }

    /// Overwrite all mutable fields of the user with the given id. When the
    /// updated record belongs to the signed-in user, the session snapshot
    /// refreshes so role and department stay current without re-login.
    pub fn update_user(&mut self, user: User) -> Result<()> {
        if self.state.user(user.id).is_none() {
            return Err(StoreError::UserNotFound(user.id));
        }
        let patch = patch_fields([
            ("name", Value::from(user.name.clone())),
            ("department", Value::from(user.department.clone())),
            ("role", Value::from(user.role.as_str())),
            ("username", Value::from(user.username.clone())),
            ("password", Value::from(user.password.clone())),
        ]);
        self.backend.update(Collection::Users, user.id, patch)?;
        if self
            .current_user
            .as_ref()
            .is_some_and(|current| current.id == user.id)
        {
            self.current_user = Some(user.clone());
        }
        if let Some(stored) = self.state.users.iter_mut().find(|u| u.id == user.id) {
            *stored = user;
        }
        self.notify(Collection::Users);
        Ok(())
    }

    /// Remove a user record. Role policy belongs to the calling layer; see
    /// [`crate::policy::can_delete_user`].
    pub fn delete_user(&mut self, id: EntityId) -> Result<()> {
        self.backend.delete(Collection::Users, id)?;
        self.state.users.retain(|u| u.id != id);
        info!(user_id = %id, "user deleted");
        self.notify(Collection::Users);
        Ok(())
    }

    // --- Requests ---

    /// Raise a new request. Stock is deliberately not checked here: it may
    /// fluctuate between request and approval, so insufficiency is only
    /// decided at fulfillment time.
    pub fn create_request(
        &mut self,
        user_id: EntityId,
        material_id: EntityId,
        quantity: u32,
    ) -> Result<Request> {
        let new = NewRequest {
            user_id,
            material_id,
            quantity,
            request_date: Utc::now(),
            status: RequestStatus::Pending,
        };
        let id = self.backend.create(Collection::Requests, encode(&new)?)?;
        let request = Request {
            id,
            user_id,
            material_id,
            quantity,
            request_date: new.request_date,
            status: RequestStatus::Pending,
        };
        info!(request_id = %id, %user_id, %material_id, quantity, "request created");
        self.state.requests.push(request.clone());
        self.notify(Collection::Requests);
        Ok(request)
    }

    // --- Session ---

    /// Exact-match credential check over the user collection.
    pub fn login(&mut self, username: &str, password: &str) -> Result<User> {
        let user = self
            .state
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
            .ok_or(StoreError::AuthFailure)?;
        info!(user_id = %user.id, username = %user.username, "login");
        self.current_user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.id, "logout");
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Install a previously captured session snapshot (a new process
    /// resuming a saved session).
    pub fn restore_session(&mut self, user: User) {
        self.current_user = Some(user);
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|source| StoreError::Persistence(stockroom_persistence::PersistenceError::Encode { source }))
}

fn decode<T: serde::de::DeserializeOwned>(
    documents: Vec<Value>,
    collection: Collection,
) -> Result<Vec<T>> {
    documents
        .into_iter()
        .map(|doc| {
            serde_json::from_value(doc).map_err(|source| StoreError::Decode { collection, source })
        })
        .collect()
}

fn patch_fields<const N: usize>(entries: [(&'static str, Value); N]) -> Patch {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
