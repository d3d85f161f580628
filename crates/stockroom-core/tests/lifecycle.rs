//! Integration tests for the request lifecycle engine.

use std::sync::Arc;

use tempfile::tempdir;

use stockroom_core::{NewMaterial, Store, StoreError};
use stockroom_model::RequestStatus;
use stockroom_persistence::LocalBackend;

fn open_store(dir: &tempfile::TempDir) -> Store {
    let backend = LocalBackend::open(dir.path().join("db.json")).expect("open backend");
    Store::open(Arc::new(backend)).expect("open store")
}

#[test]
fn approve_then_issue_decrements_stock_once() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let material = store
        .add_material(NewMaterial {
            name: "Toner cartridge".to_string(),
            stock: 10,
            unit: "piece".to_string(),
        })
        .expect("add material");
    let user_id = store.users()[0].id;
    let request = store
        .create_request(user_id, material.id, 5)
        .expect("create request");
    assert_eq!(request.status, RequestStatus::Pending);

    let approved = store
        .transition(request.id, RequestStatus::Approved)
        .expect("approve");
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.new_stock, None);
    assert_eq!(
        store.state().material(material.id).expect("material").stock,
        10,
        "approval must not touch stock"
    );

    let issued = store
        .transition(request.id, RequestStatus::Issued)
        .expect("issue");
    assert_eq!(issued.new_stock, Some(5));
    assert_eq!(store.state().material(material.id).expect("material").stock, 5);
    assert_eq!(
        store.state().request(request.id).expect("request").status,
        RequestStatus::Issued
    );

    // Double submission: reported as success, stock untouched.
    let again = store
        .transition(request.id, RequestStatus::Issued)
        .expect("re-issue");
    assert_eq!(again.new_stock, None);
    assert_eq!(store.state().material(material.id).expect("material").stock, 5);
}

#[test]
fn issue_fails_with_insufficient_stock_and_mutates_nothing() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let material = store
        .add_material(NewMaterial {
            name: "Binder".to_string(),
            stock: 3,
            unit: "piece".to_string(),
        })
        .expect("add material");
    let user_id = store.users()[0].id;
    let request = store
        .create_request(user_id, material.id, 5)
        .expect("create request");

    let error = store
        .transition(request.id, RequestStatus::Issued)
        .expect_err("must refuse");
    match &error {
        StoreError::InsufficientStock {
            available,
            requested,
        } => {
            assert_eq!(*available, 3);
            assert_eq!(*requested, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The operator-facing message cites both numbers.
    let message = error.to_string();
    assert!(message.contains('3'), "message cites stock: {message}");
    assert!(message.contains('5'), "message cites quantity: {message}");

    assert_eq!(store.state().material(material.id).expect("material").stock, 3);
    assert_eq!(
        store.state().request(request.id).expect("request").status,
        RequestStatus::Pending
    );
}

#[test]
fn unknown_request_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let error = store
        .transition(9999.into(), RequestStatus::Approved)
        .expect_err("must refuse");
    assert!(matches!(error, StoreError::RequestNotFound(id) if id == 9999.into()));
}

#[test]
fn issue_against_deleted_material_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let material = store
        .add_material(NewMaterial {
            name: "Folder".to_string(),
            stock: 20,
            unit: "pack".to_string(),
        })
        .expect("add material");
    let user_id = store.users()[0].id;
    let request = store
        .create_request(user_id, material.id, 2)
        .expect("create request");
    store.delete_material(material.id).expect("delete material");

    let error = store
        .transition(request.id, RequestStatus::Issued)
        .expect_err("must refuse");
    assert!(matches!(error, StoreError::MaterialNotFound(id) if id == material.id));
    assert_eq!(
        store.state().request(request.id).expect("request").status,
        RequestStatus::Pending
    );
}

#[test]
fn approve_and_reject_overwrite_from_any_state() {
    // The engine keeps the permissiveness of the system it replaces:
    // approve/reject are unconditional overwrites with no stock effect.
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let material = store
        .add_material(NewMaterial {
            name: "Notebook".to_string(),
            stock: 10,
            unit: "piece".to_string(),
        })
        .expect("add material");
    let user_id = store.users()[0].id;
    let request = store
        .create_request(user_id, material.id, 4)
        .expect("create request");

    store
        .transition(request.id, RequestStatus::Issued)
        .expect("issue directly from pending");
    assert_eq!(store.state().material(material.id).expect("material").stock, 6);

    let rejected = store
        .transition(request.id, RequestStatus::Rejected)
        .expect("reject an issued request");
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(
        store.state().request(request.id).expect("request").status,
        RequestStatus::Rejected
    );
    // Stock stays consumed; reject never refunds.
    assert_eq!(store.state().material(material.id).expect("material").stock, 6);
}

#[test]
fn transition_messages_are_human_readable() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(&dir);

    let material = store
        .add_material(NewMaterial {
            name: "Tape".to_string(),
            stock: 8,
            unit: "roll".to_string(),
        })
        .expect("add material");
    let user_id = store.users()[0].id;
    let request = store
        .create_request(user_id, material.id, 3)
        .expect("create request");

    let approved = store
        .transition(request.id, RequestStatus::Approved)
        .expect("approve");
    assert!(approved.message().contains("APPROVED"));

    let issued = store
        .transition(request.id, RequestStatus::Issued)
        .expect("issue");
    assert!(issued.message().contains("5 remaining"));

    let again = store
        .transition(request.id, RequestStatus::Issued)
        .expect("re-issue");
    assert!(again.message().contains("already issued"));
}
