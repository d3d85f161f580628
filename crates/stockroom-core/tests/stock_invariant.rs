//! Model-based property test for the lifecycle engine.
//!
//! A reference model applies the documented rules; the store must agree
//! with it after every operation. In particular: stock never underflows,
//! an insufficient issue changes nothing, and repeated issues of an
//! already-issued request never decrement again.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tempfile::tempdir;

use stockroom_core::{NewMaterial, Store, StoreError};
use stockroom_model::{EntityId, RequestStatus};
use stockroom_persistence::LocalBackend;

/// The transition targets the approval queue exposes.
fn status_from(code: u8) -> RequestStatus {
    match code % 3 {
        0 => RequestStatus::Approved,
        1 => RequestStatus::Rejected,
        _ => RequestStatus::Issued,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_agrees_with_the_reference_model(
        initial_stock in 0u32..60,
        quantities in prop::collection::vec(1u32..20, 1..8),
        ops in prop::collection::vec((0usize..8, 0u8..3), 0..40),
    ) {
        let dir = tempdir().expect("tempdir");
        let backend = LocalBackend::open(dir.path().join("db.json")).expect("open backend");
        let mut store = Store::open(Arc::new(backend)).expect("open store");

        let material = store
            .add_material(NewMaterial {
                name: "Counted widget".to_string(),
                stock: initial_stock,
                unit: "piece".to_string(),
            })
            .expect("add material");
        let user_id = store.users()[0].id;

        let mut request_ids: Vec<EntityId> = Vec::new();
        let mut model_status: Vec<RequestStatus> = Vec::new();
        for &quantity in &quantities {
            let request = store
                .create_request(user_id, material.id, quantity)
                .expect("create request");
            request_ids.push(request.id);
            model_status.push(RequestStatus::Pending);
        }
        let mut model_stock = initial_stock;

        for (index, code) in ops {
            let slot = index % request_ids.len();
            let request_id = request_ids[slot];
            let quantity = quantities[slot];
            let target = status_from(code);

            let result = store.transition(request_id, target);
            match target {
                RequestStatus::Issued if model_status[slot] == RequestStatus::Issued => {
                    // Double submission: success, no stock movement.
                    let transition = result.expect("re-issue reports success");
                    prop_assert_eq!(transition.new_stock, None);
                }
                RequestStatus::Issued if model_stock >= quantity => {
                    let transition = result.expect("issue succeeds with enough stock");
                    model_stock -= quantity;
                    model_status[slot] = RequestStatus::Issued;
                    prop_assert_eq!(transition.new_stock, Some(model_stock));
                }
                RequestStatus::Issued => {
                    match result {
                        Err(StoreError::InsufficientStock { available, requested }) => {
                            prop_assert_eq!(available, model_stock);
                            prop_assert_eq!(requested, quantity);
                        }
                        other => {
                            return Err(TestCaseError::fail(format!(
                                "expected InsufficientStock, got {other:?}"
                            )));
                        }
                    }
                }
                status => {
                    // Approve/reject overwrite from any prior state.
                    result.expect("status overwrite succeeds");
                    model_status[slot] = status;
                }
            }

            let stock = store
                .state()
                .material(material.id)
                .expect("material exists")
                .stock;
            prop_assert_eq!(stock, model_stock, "stock must match the model");
            for (id, expected) in request_ids.iter().zip(&model_status) {
                let actual = store.state().request(*id).expect("request exists").status;
                prop_assert_eq!(actual, *expected);
            }
        }
    }
}
