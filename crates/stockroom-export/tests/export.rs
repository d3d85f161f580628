//! Tests for CSV export and re-import.

use chrono::{TimeZone, Utc};

use stockroom_export::{materials_csv, parse_materials_csv, requests_csv};
use stockroom_model::{DatabaseState, EntityId, Material, Request, RequestStatus, Role, User};

fn material(id: u64, name: &str, stock: u32, unit: &str) -> Material {
    Material {
        id: EntityId(id),
        name: name.to_string(),
        stock,
        unit: unit.to_string(),
    }
}

fn sample_state() -> DatabaseState {
    DatabaseState {
        materials: vec![material(1, "A4 paper", 50, "ream")],
        users: vec![User {
            id: EntityId(2),
            name: "Somchai Jaidee".to_string(),
            department: "Sales".to_string(),
            role: Role::User,
            username: "somchai".to_string(),
            password: "123".to_string(),
        }],
        requests: vec![
            Request {
                id: EntityId(1),
                user_id: EntityId(2),
                material_id: EntityId(1),
                quantity: 2,
                request_date: Utc.with_ymd_and_hms(2026, 5, 20, 8, 0, 0).unwrap(),
                status: RequestStatus::Issued,
            },
            // Dangling references: both parents deleted since.
            Request {
                id: EntityId(2),
                user_id: EntityId(77),
                material_id: EntityId(88),
                quantity: 5,
                request_date: Utc.with_ymd_and_hms(2026, 5, 21, 9, 30, 0).unwrap(),
                status: RequestStatus::Pending,
            },
        ],
    }
}

#[test]
fn material_export_starts_with_a_byte_order_mark() {
    let materials = vec![material(1, "A4 paper", 50, "ream")];
    let csv = materials_csv(&materials).expect("export");
    assert!(csv.starts_with('\u{feff}'), "BOM for spreadsheet tools");
    assert!(csv.contains("ID,Name,Stock,Unit"));
}

#[test]
fn material_export_round_trips_in_order() {
    let materials = vec![
        material(3, "Stapler", 10, "piece"),
        material(1, "A4 paper", 50, "ream"),
        material(2, "Blue ballpoint pen", 100, "piece"),
    ];
    let csv = materials_csv(&materials).expect("export");
    let parsed = parse_materials_csv(&csv).expect("parse");
    assert_eq!(parsed, materials, "ids, names, stock, units, and order");
}

#[test]
fn material_export_quotes_embedded_commas() {
    let materials = vec![material(1, "Paper, legal size", 5, "ream")];
    let csv = materials_csv(&materials).expect("export");
    let parsed = parse_materials_csv(&csv).expect("parse");
    assert_eq!(parsed[0].name, "Paper, legal size");
}

#[test]
fn request_export_joins_names_and_tolerates_dangling_references() {
    let state = sample_state();
    let csv = requests_csv(&state.requests, &state).expect("export");
    let body = csv.trim_start_matches('\u{feff}');

    insta::assert_snapshot!(body.trim_end(), @r"
    ID,User,Department,Material,Quantity,Unit,Date,Status
    1,Somchai Jaidee,Sales,A4 paper,2,ream,2026-05-20,ISSUED
    2,Unknown,-,Unknown,5,-,2026-05-21,PENDING
    ");
}

#[test]
fn empty_material_export_is_just_the_header() {
    let csv = materials_csv(&[]).expect("export");
    let parsed = parse_materials_csv(&csv).expect("parse");
    assert!(parsed.is_empty());
}
