//! Request status transitions and the stock-consistency guarantee.
//!
//! `Pending -> {Approved, Rejected}`, `Approved -> Issued`; `Rejected` and
//! `Issued` are terminal. Issuing is the only transition with a side
//! effect: the material's stock drops by the requested quantity, applied
//! together with the status change or not at all, and at most once over the
//! request's lifetime no matter how often the transition is retried.

use tracing::info;

use stockroom_model::{EntityId, RequestStatus};
use stockroom_persistence::{Collection, FulfillOutcome, PersistenceError};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// A successful status transition, with enough context for a confirmation
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub request_id: EntityId,
    pub status: RequestStatus,
    /// Remaining stock after an issue that consumed stock; `None` when no
    /// stock moved (approve/reject, or an already-issued no-op).
    pub new_stock: Option<u32>,
}

impl Transition {
    pub fn message(&self) -> String {
        match (self.status, self.new_stock) {
            (RequestStatus::Issued, Some(stock)) => {
                format!(
                    "Request {} issued; {} remaining in stock",
                    self.request_id, stock
                )
            }
            (RequestStatus::Issued, None) => {
                format!("Request {} was already issued", self.request_id)
            }
            (status, _) => format!("Request {} updated to {}", self.request_id, status),
        }
    }
}

impl Store {
    /// Apply a status transition to a request.
    ///
    /// The engine validates its own preconditions rather than trusting the
    /// caller's sequencing: issuing re-checks the material and its stock,
    /// and an already-issued request is reported as success without
    /// touching stock again. Approve and reject overwrite the status from
    /// any prior state with no side effect, as the system being replaced
    /// did.
    pub fn transition(
        &mut self,
        request_id: EntityId,
        target: RequestStatus,
    ) -> Result<Transition> {
        let request = self
            .state()
            .request(request_id)
            .ok_or(StoreError::RequestNotFound(request_id))?
            .clone();

        if target != RequestStatus::Issued {
            self.backend().update(
                Collection::Requests,
                request_id,
                status_patch(target),
            )?;
            if let Some(stored) = self.state_mut().request_mut(request_id) {
                stored.status = target;
            }
            info!(%request_id, status = %target, "request status updated");
            self.notify(Collection::Requests);
            return Ok(Transition {
                request_id,
                status: target,
                new_stock: None,
            });
        }

        if request.status == RequestStatus::Issued {
            // Double submission: success, and a no-op with respect to stock.
            return Ok(Transition {
                request_id,
                status: RequestStatus::Issued,
                new_stock: None,
            });
        }

        let material = self
            .state()
            .material(request.material_id)
            .ok_or(StoreError::MaterialNotFound(request.material_id))?;
        if material.stock < request.quantity {
            return Err(StoreError::InsufficientStock {
                available: material.stock,
                requested: request.quantity,
            });
        }

        // The backend re-validates under its own lock, so a concurrent
        // session cannot slip a second decrement between our check and the
        // write.
        let outcome = self
            .backend()
            .fulfill(request_id)
            .map_err(map_fulfill_error)?;
        match outcome {
            FulfillOutcome::Applied { new_stock } => {
                if let Some(stored) = self.state_mut().material_mut(request.material_id) {
                    stored.stock = new_stock;
                }
                if let Some(stored) = self.state_mut().request_mut(request_id) {
                    stored.status = RequestStatus::Issued;
                }
                info!(
                    %request_id,
                    material_id = %request.material_id,
                    quantity = request.quantity,
                    new_stock,
                    "request issued"
                );
                self.notify(Collection::Materials);
                self.notify(Collection::Requests);
                Ok(Transition {
                    request_id,
                    status: RequestStatus::Issued,
                    new_stock: Some(new_stock),
                })
            }
            FulfillOutcome::AlreadyIssued => {
                // Another session won the race; reflect the terminal status
                // and report success.
                if let Some(stored) = self.state_mut().request_mut(request_id) {
                    stored.status = RequestStatus::Issued;
                }
                self.notify(Collection::Requests);
                Ok(Transition {
                    request_id,
                    status: RequestStatus::Issued,
                    new_stock: None,
                })
            }
            FulfillOutcome::InsufficientStock {
                available,
                requested,
            } => Err(StoreError::InsufficientStock {
                available,
                requested,
            }),
        }
    }
}

fn status_patch(status: RequestStatus) -> stockroom_persistence::Patch {
    let mut patch = stockroom_persistence::Patch::new();
    patch.insert(
        "status".to_string(),
        serde_json::Value::from(status.as_str()),
    );
    patch
}

fn map_fulfill_error(error: PersistenceError) -> StoreError {
    match error {
        PersistenceError::MissingDocument {
            collection: Collection::Requests,
            id,
        } => StoreError::RequestNotFound(id),
        PersistenceError::MissingDocument {
            collection: Collection::Materials,
            id,
        } => StoreError::MaterialNotFound(id),
        other => StoreError::Persistence(other),
    }
}
