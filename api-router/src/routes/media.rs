use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use common::media::guess_mime_type;

use crate::{api_state::ApiState, error::ApiError};

/// Serve a stored object (voice-clone audio) so the upstream API can fetch
/// it by URL.
pub async fn serve_media(
    State(state): State<ApiState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let data = state.media.get(&path).await?;
    let content_type = guess_mime_type(&path);

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
