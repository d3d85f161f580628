use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, Material, Request, User};

/// The three entity collections, as one value.
///
/// This is the unit of snapshot persistence and the in-memory shape owned
/// by the store. Lookup helpers return `None` for dangling references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseState {
    pub materials: Vec<Material>,
    pub users: Vec<User>,
    pub requests: Vec<Request>,
}

impl DatabaseState {
    pub fn material(&self, id: EntityId) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn material_mut(&mut self, id: EntityId) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    pub fn user(&self, id: EntityId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn request(&self, id: EntityId) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn request_mut(&mut self, id: EntityId) -> Option<&mut Request> {
        self.requests.iter_mut().find(|r| r.id == id)
    }
}
