use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{
    analysis::{analyze_argumentation, analyze_sentiment},
    content::create_content,
    jobs::{job_status, wait_for_job},
    liveness::live,
    media::serve_media,
    readiness::ready,
    voices::{clone_voice, list_voices},
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public, unauthenticated endpoints (probes and media served back to the
    // upstream by URL)
    let public = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/media/{*path}", get(serve_media));

    let api = Router::new()
        .route("/content", post(create_content))
        .route("/analysis/sentiment", post(analyze_sentiment))
        .route("/analysis/argumentation", post(analyze_argumentation))
        .route("/voices", get(list_voices))
        .route(
            "/voices/clone",
            post(clone_voice).layer(DefaultBodyLimit::max(app_state.config.upload_max_bytes)),
        )
        .route("/jobs/{id}", get(job_status))
        .route("/jobs/{id}/wait", get(wait_for_job));

    public.merge(api)
}
