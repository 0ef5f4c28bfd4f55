//! HTTP request handlers
//!
//! Thin wrappers over [`Jukebox`](crate::jukebox::Jukebox): parse the
//! request, run the command, and render the outcome with the user-facing
//! message.

use crate::api::server::AppContext;
use crate::control::ReactionEvent;
use crate::error::Error;
use crate::jukebox::{PlayOutcome, PlayRequest};
use crate::playback::{SessionSnapshot, StopReport};
use crate::presentation::QueueListing;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use jukebox_common::{ChannelId, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    sessions: usize,
}

/// Body of every error and of plain acknowledgements
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
    message: String,
}

impl StatusResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayBody {
    /// Requester's voice channel; absent when they are not in one
    #[serde(default)]
    channel_id: Option<ChannelId>,
    requester: String,
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// 0-200 user-facing scale
    volume: i64,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u32,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    message: String,
    #[serde(flatten)]
    report: StopReport,
}

type ApiError = (StatusCode, Json<StatusResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Map a command error to its HTTP status and user message
fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidVolume(_) | Error::CatalogLink(_) | Error::NotInVoiceChannel => {
            StatusCode::BAD_REQUEST
        }
        Error::NothingFound(_) | Error::Resolution { .. } => StatusCode::NOT_FOUND,
        Error::InvalidControl(_) | Error::EmptyQueue => StatusCode::CONFLICT,
        Error::Connection(_) | Error::SessionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_benign() {
        debug!(error = %err, "Request rejected");
    } else {
        warn!(error = %err, "Request failed");
    }

    (
        status,
        Json(StatusResponse {
            status: "error".to_string(),
            message: err.user_message(),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "jukebox-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: ctx.jukebox.registry().len().await,
    })
}

// ============================================================================
// Session Commands
// ============================================================================

/// POST /sessions/:session_id/play - Resolve and enqueue
pub async fn play(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
    Json(body): Json<PlayBody>,
) -> ApiResult<PlayOutcome> {
    let request = PlayRequest {
        session_id,
        channel_id: body.channel_id,
        requester: body.requester,
        query: body.query,
    };
    ctx.jukebox.play(request).await.map(Json).map_err(api_error)
}

/// POST /sessions/:session_id/volume - Set volume (0-200)
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<VolumeRequest>,
) -> ApiResult<VolumeResponse> {
    let volume = ctx
        .jukebox
        .volume(session_id, req.volume)
        .await
        .map_err(api_error)?;
    Ok(Json(VolumeResponse {
        volume,
        message: format!("🔊 Volume set to {}%.", volume),
    }))
}

/// POST /sessions/:session_id/skip
pub async fn skip(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<StatusResponse> {
    let title = ctx.jukebox.skip(session_id).await.map_err(api_error)?;
    Ok(StatusResponse::ok(format!("⏩ Skipped \"{}\".", title)))
}

/// POST /sessions/:session_id/pause
pub async fn pause(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<StatusResponse> {
    ctx.jukebox.pause(session_id).await.map_err(api_error)?;
    Ok(StatusResponse::ok("⏸️ Paused."))
}

/// POST /sessions/:session_id/resume
pub async fn resume(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<StatusResponse> {
    ctx.jukebox.resume(session_id).await.map_err(api_error)?;
    Ok(StatusResponse::ok("▶️ Resumed."))
}

/// POST /sessions/:session_id/stop - Clear, end stream, disconnect
pub async fn stop(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<StopResponse> {
    let report = ctx.jukebox.stop(session_id).await.map_err(api_error)?;
    Ok(Json(StopResponse {
        message: "📛 Playback stopped and disconnected.".to_string(),
        report,
    }))
}

/// GET /sessions/:session_id/queue - Pending tracks
pub async fn get_queue(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<QueueListing> {
    ctx.jukebox.queue(session_id).await.map(Json).map_err(api_error)
}

/// GET /sessions/:session_id/state - Phase, current track, queue, volume
pub async fn get_state(
    State(ctx): State<AppContext>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<SessionSnapshot> {
    ctx.jukebox.state(session_id).await.map(Json).map_err(api_error)
}

// ============================================================================
// Reactions
// ============================================================================

/// POST /reactions - A user reacted to a posted display
pub async fn post_reaction(
    State(ctx): State<AppContext>,
    Json(event): Json<ReactionEvent>,
) -> StatusCode {
    let listeners = ctx.jukebox.react(event);
    debug!(listeners, "Reaction delivered");
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(api_error(Error::InvalidVolume(300)).0, StatusCode::BAD_REQUEST);
        assert_eq!(api_error(Error::NothingFound("x".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(api_error(Error::EmptyQueue).0, StatusCode::CONFLICT);
        assert_eq!(
            api_error(Error::Connection("refused".into())).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        let (status, body) = api_error(Error::Internal("boom".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.0.message.contains("boom"));
    }
}
