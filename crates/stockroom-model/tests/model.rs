//! Tests for stockroom-model types.

use chrono::{TimeZone, Utc};
use stockroom_model::{DatabaseState, EntityId, Material, Request, RequestStatus, Role, User};

fn sample_material() -> Material {
    Material {
        id: EntityId(1),
        name: "A4 paper".to_string(),
        stock: 50,
        unit: "ream".to_string(),
    }
}

#[test]
fn status_round_trips_through_wire_format() {
    for status in [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Issued,
    ] {
        let json = serde_json::to_string(&status).expect("serialize status");
        let round: RequestStatus = serde_json::from_str(&json).expect("deserialize status");
        assert_eq!(round, status);
        assert_eq!(json, format!("\"{}\"", status.as_str()));
    }
}

#[test]
fn status_parses_case_insensitively() {
    assert_eq!("pending".parse::<RequestStatus>(), Ok(RequestStatus::Pending));
    assert_eq!("Issued".parse::<RequestStatus>(), Ok(RequestStatus::Issued));
    assert!("SHIPPED".parse::<RequestStatus>().is_err());
}

#[test]
fn terminal_states() {
    assert!(!RequestStatus::Pending.is_terminal());
    assert!(!RequestStatus::Approved.is_terminal());
    assert!(RequestStatus::Rejected.is_terminal());
    assert!(RequestStatus::Issued.is_terminal());
}

#[test]
fn role_serializes_in_screaming_case() {
    let json = serde_json::to_string(&Role::Admin).expect("serialize role");
    assert_eq!(json, "\"ADMIN\"");
    assert_eq!("user".parse::<Role>(), Ok(Role::User));
}

#[test]
fn request_serializes_with_snake_case_references() {
    let request = Request {
        id: EntityId(7),
        user_id: EntityId(2),
        material_id: EntityId(1),
        quantity: 5,
        request_date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        status: RequestStatus::Pending,
    };
    let value = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(value["user_id"], 2);
    assert_eq!(value["material_id"], 1);
    assert_eq!(value["status"], "PENDING");
    let round: Request = serde_json::from_value(value).expect("deserialize request");
    assert_eq!(round, request);
}

#[test]
fn state_lookups_tolerate_missing_records() {
    let state = DatabaseState {
        materials: vec![sample_material()],
        users: vec![User {
            id: EntityId(2),
            name: "Somchai Jaidee".to_string(),
            department: "Sales".to_string(),
            role: Role::User,
            username: "somchai".to_string(),
            password: "123".to_string(),
        }],
        requests: vec![],
    };
    assert!(state.material(EntityId(1)).is_some());
    assert!(state.material(EntityId(99)).is_none());
    assert!(state.user_by_username("somchai").is_some());
    assert!(state.user_by_username("somchaX").is_none());
    assert!(state.request(EntityId(1)).is_none());
}
