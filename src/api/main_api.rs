use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints::playlist_api::playlist_api_register;
use crate::api::endpoints::web_index::index_register;
use crate::api::model::app_state::AppState;
use crate::api::model::playlist_cache::{warm_up, PlaylistCache};
use crate::model::config::Config;
use crate::processing::playlist_watch::start_library_watch;

fn get_web_dir_path(cfg: &Config) -> Option<PathBuf> {
    if cfg.api.web_root.is_empty() {
        return None;
    }
    let web_dir_path = PathBuf::from(&cfg.api.web_root);
    if web_dir_path.is_dir() {
        Some(web_dir_path)
    } else {
        error!("web_root does not exists or is not an directory: {}", web_dir_path.display());
        None
    }
}

pub fn create_router(app_state: Arc<AppState>) -> axum::Router {
    let web_dir_path = get_web_dir_path(&app_state.config);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::HEAD, axum::http::Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    axum::Router::new()
        .merge(playlist_api_register())
        .merge(index_register(web_dir_path.as_deref()))
        .layer(cors)
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {err}");
    }
    info!("Shutting down");
}

pub async fn start_server(cfg: Arc<Config>) -> std::io::Result<()> {
    let host = cfg.api.host.to_string();
    let port = cfg.api.port;

    std::fs::create_dir_all(&cfg.library.dir)?;
    let playlists = Arc::new(PlaylistCache::new(cfg.library.clone()));
    warm_up(&playlists).await;
    if start_library_watch(&playlists).is_some() {
        info!("Watching {} for playlist changes", cfg.library.dir);
    }

    let app_state = Arc::new(AppState {
        config: Arc::clone(&cfg),
        playlists,
    });
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    info!("Server running: http://{host}:{port}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
