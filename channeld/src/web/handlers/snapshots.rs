// Snapshot bootstrap endpoints

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::common::{error_reply, request_body, ApiResult, ErrorReply, TabJson};
use crate::errors::{ChannelError, ParticipationError};
use crate::types::{BootstrapStatus, JoinBySnapshotRequest};
use crate::web::AppState;

/// Start bootstrapping a channel from a snapshot directory on the node
pub async fn join_by_snapshot(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<BootstrapStatus> {
    let body = request_body(body)?;
    let request: JoinBySnapshotRequest = serde_json::from_slice(&body).map_err(|e| {
        error_reply(
            StatusCode::BAD_REQUEST,
            format!("invalid join by snapshot request: {}", e),
        )
    })?;
    if request.snapshot_path.trim().is_empty() {
        return Err(error_reply(
            StatusCode::BAD_REQUEST,
            "invalid join by snapshot request: snapshot path is empty",
        ));
    }

    let snapshot_dir = PathBuf::from(&request.snapshot_path);
    match state.channels.join_by_snapshot(&snapshot_dir).await {
        Ok(status) => {
            info!("Snapshot bootstrap started from {}", request.snapshot_path);
            Ok(TabJson(StatusCode::ACCEPTED, status))
        }
        Err(e) => Err(join_by_snapshot_error(e)),
    }
}

fn join_by_snapshot_error(e: ParticipationError) -> ErrorReply {
    let status = match &e {
        ParticipationError::Channel(ChannelError::InvalidSnapshot { .. }) => {
            StatusCode::BAD_REQUEST
        }
        ParticipationError::Channel(c) if c.is_conflict() => StatusCode::METHOD_NOT_ALLOWED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Failed to start snapshot bootstrap: {}", e);
    } else {
        warn!("Snapshot bootstrap refused: {}", e);
    }
    error_reply(status, format!("cannot join by snapshot: {}", e))
}

/// Report whether a snapshot bootstrap is running
pub async fn join_by_snapshot_status(State(state): State<AppState>) -> ApiResult<BootstrapStatus> {
    Ok(TabJson(
        StatusCode::OK,
        state.channels.join_by_snapshot_status().await,
    ))
}
