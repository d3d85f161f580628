//! The fixed record set loaded into an empty store.

use chrono::{Duration, Utc};

use stockroom_model::{
    DatabaseState, EntityId, Material, Request, RequestStatus, Role, User,
};

/// Sample materials, one admin plus two regular users, and two requests,
/// so a fresh installation is usable without manual setup.
pub fn seed_state() -> DatabaseState {
    let now = Utc::now();
    DatabaseState {
        materials: vec![
            material(1, "A4 paper", 50, "ream"),
            material(2, "Blue ballpoint pen", 100, "piece"),
            material(3, "Stapler", 10, "piece"),
            material(4, "Whiteboard marker", 25, "box"),
        ],
        users: vec![
            user(1, "Admin Officer", "Administration", Role::Admin, "admin"),
            user(2, "Somchai Jaidee", "Sales", Role::User, "somchai"),
            user(3, "Somsri Rakngan", "Human Resources", Role::User, "somsri"),
        ],
        requests: vec![
            Request {
                id: EntityId(1),
                user_id: EntityId(2),
                material_id: EntityId(1),
                quantity: 2,
                request_date: now - Duration::days(1),
                status: RequestStatus::Issued,
            },
            Request {
                id: EntityId(2),
                user_id: EntityId(3),
                material_id: EntityId(2),
                quantity: 5,
                request_date: now,
                status: RequestStatus::Pending,
            },
        ],
    }
}

fn material(id: u64, name: &str, stock: u32, unit: &str) -> Material {
    Material {
        id: EntityId(id),
        name: name.to_string(),
        stock,
        unit: unit.to_string(),
    }
}

fn user(id: u64, name: &str, department: &str, role: Role, username: &str) -> User {
    User {
        id: EntityId(id),
        name: name.to_string(),
        department: department.to_string(),
        role,
        username: username.to_string(),
        password: "123".to_string(),
    }
}
