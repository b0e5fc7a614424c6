//! Squares Pool Backend Library
//!
//! Exposes the winner-resolution engine plus the storage and notice plumbing
//! that the `squares` binary wires around it.

pub mod models;
pub mod notify;
pub mod squares;
pub mod store;
