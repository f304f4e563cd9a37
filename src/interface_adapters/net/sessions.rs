use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::domain::tuning::GameVariant;
use crate::interface_adapters::http::error_response;
use crate::interface_adapters::protocol::{
    ClientCommand, CreateSessionRequest, CreateSessionResponse, SessionSnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::new_session_id;

const MAX_SESSION_ID_LEN: usize = 128;

/// Resolves an optional variant slug; absent means the default variant.
pub(crate) fn parse_variant(value: Option<&str>) -> Result<GameVariant, Response> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(GameVariant::default()),
        Some(slug) => GameVariant::from_slug(slug).ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("unknown game variant `{slug}`"),
            )
        }),
    }
}

/// Trims a client-chosen id, or generates one when absent.
pub(crate) fn resolve_session_id(value: Option<&str>) -> Result<String, Response> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(new_session_id()),
        Some(id) if id.len() > MAX_SESSION_ID_LEN => Err(error_response(
            StatusCode::BAD_REQUEST,
            "session_id is too long",
        )),
        Some(id) => Ok(id.to_string()),
    }
}

pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Response {
    // A bare POST with no JSON body creates a default session.
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionRequest::default(),
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let variant = match parse_variant(payload.variant.as_deref()) {
        Ok(variant) => variant,
        Err(response) => return response,
    };
    let session_id = match resolve_session_id(payload.session_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .registry
        .create_session(session_id.clone(), variant)
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(CreateSessionResponse {
                session_id,
                variant,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    match state.registry.snapshot(&session_id).await {
        Ok(snapshot) => Json(SessionSnapshotDto::from(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<ClientCommand>, JsonRejection>,
) -> Response {
    let command = match payload {
        Ok(Json(command)) => command,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.registry.send(&session_id, command.into()).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    match state.registry.remove_session(&session_id).await {
        Ok(()) => {
            info!(session_id = %session_id, "session deleted over http");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}
