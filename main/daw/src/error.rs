use derive_more::{Display, Error};

/// An error which can occur when talking to the DAW.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
pub enum DawError {
    #[display(fmt = "no project is open")]
    NoProject,
    #[display(fmt = "REAPER function {} failed", function)]
    FunctionFailed { function: &'static str },
    #[display(fmt = "{} {} doesn't exist", kind, index)]
    ObjectNotFound { kind: &'static str, index: u32 },
    #[display(fmt = "{} contains a nul byte", what)]
    InvalidString { what: &'static str },
    #[display(fmt = "{} is not a valid command ID", id)]
    InvalidCommandId { id: i32 },
}

impl DawError {
    pub fn failed(function: &'static str) -> Self {
        DawError::FunctionFailed { function }
    }

    pub fn not_found(kind: &'static str, index: u32) -> Self {
        DawError::ObjectNotFound { kind, index }
    }
}

pub type DawResult<T> = Result<T, DawError>;
