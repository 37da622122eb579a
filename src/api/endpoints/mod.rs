pub mod playlist_api;
pub mod web_index;
