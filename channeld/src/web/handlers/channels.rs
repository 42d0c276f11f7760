// Channel participation endpoints

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
};
use tracing::{debug, error, info, warn};

use super::common::{error_reply, request_body, ApiResult, ErrorReply, TabJson};
use crate::configblock;
use crate::errors::{ChannelError, ParticipationError};
use crate::types::{ChannelInfo, ChannelList};
use crate::web::AppState;

/// Join a channel; the request body is the serialized genesis config block
pub async fn join_channel(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ChannelInfo> {
    let body = request_body(body)?;
    let config_block = configblock::validate_config_block(&body, None).map_err(|e| {
        debug!("Rejected join block: {}", e);
        error_reply(StatusCode::BAD_REQUEST, format!("invalid join block: {}", e))
    })?;
    let channel_id = config_block.channel_id.clone();

    match state.channels.join_channel(config_block).await {
        Ok(info) => {
            info!("Joined channel {}", channel_id);
            Ok(TabJson(StatusCode::CREATED, info.with_url()))
        }
        Err(e) => Err(join_error(&channel_id, e)),
    }
}

fn join_error(channel_id: &str, e: ParticipationError) -> ErrorReply {
    match &e {
        ParticipationError::Block(_) => {
            error_reply(StatusCode::BAD_REQUEST, format!("invalid join block: {}", e))
        }
        ParticipationError::Channel(c) if c.is_conflict() => {
            warn!("Join of channel {} refused: {}", channel_id, e);
            error_reply(StatusCode::METHOD_NOT_ALLOWED, format!("cannot join: {}", e))
        }
        _ => {
            error!("Failed to join channel {}: {}", channel_id, e);
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("cannot join: {}", e),
            )
        }
    }
}

/// List all hosted channels
pub async fn list_channels(State(state): State<AppState>) -> ApiResult<ChannelList> {
    Ok(TabJson(StatusCode::OK, state.channels.channel_list().await))
}

/// Describe a single hosted channel
pub async fn get_channel(
    Path(channel_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<ChannelInfo> {
    configblock::validate_channel_id(&channel_id)
        .map_err(|e| error_reply(StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.channels.channel_info(&channel_id).await {
        Ok(info) => Ok(TabJson(StatusCode::OK, info.with_url())),
        Err(e) => Err(error_reply(StatusCode::NOT_FOUND, e.to_string())),
    }
}

/// Stop hosting a channel and delete its ledger
pub async fn remove_channel(
    Path(channel_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ErrorReply> {
    configblock::validate_channel_id(&channel_id)
        .map_err(|e| error_reply(StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.channels.remove_channel(&channel_id).await {
        Ok(()) => {
            info!("Removed channel {}", channel_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(ParticipationError::Channel(ChannelError::NotExist)) => Err(error_reply(
            StatusCode::NOT_FOUND,
            format!("cannot remove: {}", ChannelError::NotExist),
        )),
        Err(e) => {
            error!("Failed to remove channel {}: {}", channel_id, e);
            Err(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("cannot remove: {}", e),
            ))
        }
    }
}
