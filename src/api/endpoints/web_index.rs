use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use axum::response::IntoResponse;
use log::error;

use crate::api::model::app_state::AppState;
use crate::model::playlist::PlaylistFileRecord;

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_index_page(playlists: &[PlaylistFileRecord]) -> String {
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Playlists</title></head>\n<body>\n<h1>Playlists</h1>\n");
    if playlists.is_empty() {
        page.push_str("<p>No playlists available.</p>\n");
    } else {
        page.push_str("<ul>\n");
        for playlist in playlists {
            let _ = writeln!(page, "<li><a href=\"{}\">{}</a> <small>{}</small></li>",
                             html_escape(&playlist.url), html_escape(&playlist.name), html_escape(&playlist.modified));
        }
        page.push_str("</ul>\n");
    }
    page.push_str("</body>\n</html>\n");
    page
}

pub fn render_error_page(message: &str) -> String {
    format!("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Error</title></head>\n<body>\n<h1>Error</h1>\n<p>{}</p>\n</body>\n</html>\n",
            html_escape(message))
}

pub fn error_page_response(status: axum::http::StatusCode, message: &str) -> axum::response::Response {
    (status, axum::response::Html(render_error_page(message))).into_response()
}

async fn index(
    axum::extract::State(app_state): axum::extract::State<Arc<AppState>>,
) -> impl axum::response::IntoResponse + Send {
    match app_state.playlists.get().await {
        Ok(playlists) => axum::response::Html(render_index_page(&playlists)).into_response(),
        Err(err) => {
            error!("Error rendering index: {err}");
            error_page_response(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Could not load playlists")
        }
    }
}

async fn not_found() -> impl axum::response::IntoResponse + Send {
    error_page_response(axum::http::StatusCode::NOT_FOUND, "Page not found")
}

/// Static files from `web_root` answer everything the api does not.
pub fn index_register(web_dir_path: Option<&Path>) -> axum::Router<Arc<AppState>> {
    let router = axum::Router::new()
        .route("/", axum::routing::get(index));
    match web_dir_path {
        Some(web_dir) => router.fallback_service(axum::routing::get_service(tower_http::services::ServeDir::new(web_dir))),
        None => router.fallback(not_found),
    }
}
