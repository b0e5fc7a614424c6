//! Squares Engine
//! Mission: Decide which squares pay for a quarter and who owns them
//!
//! Pure and synchronous: no I/O, no shared state. Callers fetch the board and
//! the claims, run `resolve` then `aggregate`, and hand the summaries to
//! whatever delivers them.

pub mod aggregator;
pub mod error;
pub mod prizes;
pub mod resolver;
pub mod types;

pub use aggregator::{aggregate, label_for, ClaimBook, ClaimLookup};
pub use error::{Axis, SquaresError};
pub use prizes::PrizeSchedule;
pub use resolver::{resolve, Resolver};
pub use types::*;
