//! HTTP endpoint for name registration.

use axum::{body::Bytes, extract::State};
use std::sync::Arc;

use crate::error::RegistrationError;
use crate::protocol::{RegisterRequest, RegisterResponse};
use crate::state::AppState;

/// Register a display name.
///
/// POST /new-user
///
/// The body is decoded as JSON whatever its content type. Returns the new
/// participant, 400 for a missing/empty name or 409 when the name is taken.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<RegisterResponse, RegistrationError> {
    let name = RegisterRequest::parse_name(&body).inspect_err(|_| {
        tracing::debug!("Rejected registration with missing name");
    })?;

    match state.register(&name).await {
        Ok(user) => Ok(RegisterResponse::Ok { user }),
        Err(e) => {
            tracing::info!(name = %name, "Registration rejected: {}", e);
            Err(e)
        }
    }
}
