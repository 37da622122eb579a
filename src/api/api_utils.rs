use std::path::Path;

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use log::error;
use tokio_util::io::ReaderStream;

pub const M3U8_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const M3U_CONTENT_TYPE: &str = "audio/x-mpegurl";

pub fn playlist_content_type(file_path: &Path) -> String {
    match file_path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
        Some("m3u8") => M3U8_CONTENT_TYPE.to_string(),
        Some("m3u") => M3U_CONTENT_TYPE.to_string(),
        _ => mime::TEXT_PLAIN_UTF_8.to_string(),
    }
}

pub async fn serve_file(file_path: &Path, content_type: &str) -> axum::response::Response {
    match tokio::fs::File::open(file_path).await {
        Ok(file) => {
            axum::response::Response::builder()
                .status(axum::http::StatusCode::OK)
                .header(CONTENT_TYPE, content_type)
                .header(CACHE_CONTROL, "no-cache")
                .body(axum::body::Body::from_stream(ReaderStream::new(file)))
                .map_or_else(|_| axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response(), IntoResponse::into_response)
        }
        Err(err) => {
            error!("Failed to open {}: {err}", file_path.display());
            axum::http::StatusCode::NOT_FOUND.into_response()
        }
    }
}
