//! The stockroom entity store and request lifecycle engine.
//!
//! A [`Store`] owns the in-process copy of the three collections, writes
//! every mutation through its persistence backend, and replays backend
//! change notifications into itself on [`Store::poll_changes`]. It also
//! holds the authenticated session user. The one stateful algorithm lives
//! in [`Store::transition`]: validated request status changes, including
//! the atomic stock decrement on issue.

pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod store;
pub mod views;

pub use error::StoreError;
pub use lifecycle::Transition;
pub use store::{NewMaterial, NewUser, Store};
pub use views::{
    DashboardStats, LOW_STOCK_THRESHOLD, MaterialFilter, MaterialSortKey, SortDirection,
    dashboard_stats, filter_and_sort_materials, queue_order, requests_for_user,
};
