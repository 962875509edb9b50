use derive_more::{Display, Error};

use crate::graph::ParseError;
use crate::shortest_path::ComputationError;

/// Travel planner custom error
#[derive(Debug, Display, Error)]
pub enum TPlanError {
    #[display(fmt = "{}", message)]
    Internal { message: String },
    #[display(fmt = "{}", message)]
    BadInput { message: String },
    #[display(fmt = "{}", message)]
    Io { message: String },
}

impl TPlanError {
    /// Return the name of this error
    pub fn name(&self) -> String {
        match self {
            Self::Internal { .. } => "Internal Error".to_string(),
            Self::BadInput { .. } => "Bad Input".to_string(),
            Self::Io { .. } => "I/O Error".to_string(),
        }
    }
}

impl From<std::io::Error> for TPlanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io { message: err.to_string() }
    }
}

impl From<ParseError> for TPlanError {
    fn from(err: ParseError) -> Self {
        Self::BadInput { message: err.to_string() }
    }
}

impl From<ComputationError> for TPlanError {
    fn from(err: ComputationError) -> Self {
        Self::Internal { message: err.to_string() }
    }
}
