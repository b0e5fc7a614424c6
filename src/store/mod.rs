//! Storage Module
//! Mission: Persist the pool's board configuration and participant claims

pub mod pool_store;

pub use pool_store::{BoardNumbers, PoolStore, TeamNames};
