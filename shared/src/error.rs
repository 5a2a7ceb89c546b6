use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "**Something went wrong, please try again later!**";

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Operation not authorized")]
    Unauthorized,
    #[error("Resource conflict")]
    Conflict,
    #[error("Internal system error")]
    SystemError,
    #[error("Validation failed")]
    ValidationFailed,
}

#[cfg(feature = "backend")]
impl ErrorCode {
    pub fn status(self) -> rocket::http::Status {
        use rocket::http::Status;
        match self {
            ErrorCode::InvalidInput => Status::BadRequest,
            ErrorCode::NotFound => Status::NotFound,
            ErrorCode::Unauthorized => Status::Unauthorized,
            ErrorCode::Conflict => Status::Conflict,
            ErrorCode::SystemError => Status::InternalServerError,
            ErrorCode::ValidationFailed => Status::UnprocessableEntity,
        }
    }
}

/// Creator-only actions on a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    Close,
    Delete,
}

impl fmt::Display for PollAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollAction::Close => f.write_str("close"),
            PollAction::Delete => f.write_str("delete"),
        }
    }
}

/// Failures of the poll store contract.
///
/// The `Display` text of every variant except [`StoreError::Decode`] and
/// [`StoreError::Io`] is shown to chat users as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("**Invalid Poll_ID or not exists!**")]
    NotFound,
    #[error("*Poll*: `{0}` **already exists!**")]
    Conflict(String),
    #[error("**You don't have the permission to {0} a vote!**")]
    Permission(PollAction),
    #[error("*Poll*: `{0}` **has already been closed!**")]
    AlreadyClosed(String),
    #[error("**Invalid option!**")]
    InvalidOption,
    #[error("**You can't vote again!**")]
    DuplicateVote,
    #[error("*Poll*: `{0}` **is already closed!**")]
    PollClosed(String),
    #[error("malformed poll record: {0}")]
    Decode(String),
    #[error("storage i/o failure: {0}")]
    Io(String),
}

impl StoreError {
    pub fn decode(details: impl fmt::Display) -> Self {
        StoreError::Decode(details.to_string())
    }

    pub fn io(details: impl fmt::Display) -> Self {
        StoreError::Io(details.to_string())
    }

    pub fn is_user_facing(&self) -> bool {
        !matches!(self, StoreError::Decode(_) | StoreError::Io(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound => ErrorCode::NotFound,
            StoreError::Conflict(_) => ErrorCode::Conflict,
            StoreError::Permission(_) => ErrorCode::Unauthorized,
            StoreError::AlreadyClosed(_)
            | StoreError::InvalidOption
            | StoreError::DuplicateVote
            | StoreError::PollClosed(_) => ErrorCode::ValidationFailed,
            StoreError::Decode(_) | StoreError::Io(_) => ErrorCode::SystemError,
        }
    }

    /// Text safe to hand back to the chat user. Operator-facing failures are
    /// replaced with `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_user_facing() {
            self.to_string()
        } else {
            fallback.to_string()
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
