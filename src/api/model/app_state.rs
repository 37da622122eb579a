use std::sync::Arc;

use crate::api::model::playlist_cache::PlaylistCache;
use crate::model::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub playlists: Arc<PlaylistCache>,
}
