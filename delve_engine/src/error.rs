//! Precondition failures that abort the current operation.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no item definition for key '{0}'")]
    UnknownItem(String),
    #[error("no room definition for key '{0}'")]
    UnknownRoom(String),
    #[error("start room '{0}' is not defined")]
    NoStartRoom(String),
    #[error("no class named '{0}'")]
    UnknownClass(String),
}
