//! CLI library components for the stockroom tracker.

pub mod logging;
pub mod session;
