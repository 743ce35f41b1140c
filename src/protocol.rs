use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, RegistrationError};
use crate::types::Participant;

/// Client -> server frames on the chat channel.
///
/// Only the `type` tag and, for `exit`, the departing name are inspected.
/// Everything else in a `send` frame is opaque and relayed untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    Send,
    Exit { user: ExitUser },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExitUser {
    pub name: String,
}

impl InboundFrame {
    pub fn decode(raw: &[u8]) -> Result<Self, FrameError> {
        Ok(serde_json::from_slice(raw)?)
    }
}

/// Serialize a directory snapshot as a bare `[{id, name}, ...]` array.
/// Snapshots carry no type tag; clients tell them apart from relayed
/// `send` frames by shape.
pub fn encode_snapshot(participants: &[Participant]) -> Result<String, serde_json::Error> {
    serde_json::to_string(participants)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl RegisterRequest {
    /// Decode a registration body regardless of its declared content type
    /// and return the requested display name.
    pub fn parse_name(body: &[u8]) -> Result<String, RegistrationError> {
        let request: RegisterRequest =
            serde_json::from_slice(body).map_err(|_| RegistrationError::InvalidInput)?;

        match request.name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(RegistrationError::InvalidInput),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegisterResponse {
    Ok { user: Participant },
    Error { message: String },
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
