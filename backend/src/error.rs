use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{CommandResponse, ErrorCode};
use thiserror::Error;

/// Failures that end a slash command request with a non-200 status.
///
/// User-facing poll errors are not here: the chat platform only shows the
/// reply text for successful responses, so those are answered with 200.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("'command' or 'token' are empty in the form data")]
    MissingCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::MissingCredentials => ErrorCode::InvalidInput,
            ApiError::InvalidToken => ErrorCode::Unauthorized,
            ApiError::Internal(_) => ErrorCode::SystemError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.code().status();
        rocket::Response::build_from(Json(CommandResponse::ephemeral(self.to_string())).respond_to(req)?)
            .status(status)
            .ok()
    }
}
