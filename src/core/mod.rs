//! Session state and evaluation result model.

pub mod graph;
pub mod history;
pub mod registry;
pub mod session;
