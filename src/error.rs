//! Error types for registration and inbound frame decoding.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::protocol::RegisterResponse;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Name is required!")]
    InvalidInput,

    #[error("This name is already taken!")]
    NameTaken,
}

impl RegistrationError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistrationError::InvalidInput => StatusCode::BAD_REQUEST,
            RegistrationError::NameTaken => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let body = RegisterResponse::Error {
            message: self.to_string(),
        };
        (self.status(), body).into_response()
    }
}

/// Why an inbound chat frame was dropped
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported frame kind")]
    NotData,
}
