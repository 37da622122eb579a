use std::sync::Arc;

use axum::response::IntoResponse;
use log::{error, warn};
use serde_json::json;

use crate::api::api_utils::{playlist_content_type, serve_file};
use crate::api::model::app_state::AppState;
use crate::harvest_error::HarvestErrorKind;
use crate::repository::playlist_repository::resolve_playlist_path;
use crate::utils::debug_if_enabled;

async fn playlist_file(
    axum::extract::Path(path): axum::extract::Path<String>,
    axum::extract::State(app_state): axum::extract::State<Arc<AppState>>,
) -> impl axum::response::IntoResponse + Send {
    match resolve_playlist_path(app_state.playlists.library(), &path) {
        Ok(file_path) => serve_file(&file_path, &playlist_content_type(&file_path)).await,
        Err(err) => match err.kind {
            HarvestErrorKind::PathSecurity => {
                warn!("{err}");
                (axum::http::StatusCode::FORBIDDEN, "Access denied").into_response()
            }
            HarvestErrorKind::NotFound => {
                debug_if_enabled!("{}", err);
                (axum::http::StatusCode::NOT_FOUND, "Playlist not found").into_response()
            }
            _ => {
                error!("Error serving playlist {path}: {err}");
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Error accessing playlist").into_response()
            }
        },
    }
}

async fn playlist_list(
    axum::extract::State(app_state): axum::extract::State<Arc<AppState>>,
) -> impl axum::response::IntoResponse + Send {
    match app_state.playlists.get().await {
        Ok(playlists) => axum::Json(json!({"status": "success", "playlists": &*playlists})).into_response(),
        Err(err) => {
            error!("Error listing playlists: {err}");
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR,
             axum::Json(json!({"status": "error", "message": "Could not load playlists"}))).into_response()
        }
    }
}

pub fn playlist_api_register() -> axum::Router<Arc<AppState>> {
    axum::Router::new()
        .route("/playlists/{*path}", axum::routing::get(playlist_file))
        .route("/api/playlists", axum::routing::get(playlist_list))
}
