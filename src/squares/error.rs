use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the board a digit lookup ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Home team digits, one per row
    Row,
    /// Away team digits, one per column
    Col,
}

impl Axis {
    pub fn as_str(&self) -> &str {
        match self {
            Axis::Row => "row",
            Axis::Col => "col",
        }
    }
}

/// Errors surfaced by the squares engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquaresError {
    /// A required digit is absent from the supplied digit array
    InvalidConfig { axis: Axis, digit: u8 },
    /// Quarter outside 1..=4
    InvalidQuarter(u8),
}

impl fmt::Display for SquaresError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { axis, digit } => write!(
                f,
                "invalid board configuration: digit {} not found in {} digits",
                digit,
                axis.as_str()
            ),
            Self::InvalidQuarter(q) => write!(f, "invalid quarter: {} (expected 1-4)", q),
        }
    }
}

impl std::error::Error for SquaresError {}
