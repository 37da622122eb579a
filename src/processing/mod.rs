pub mod playlist_watch;
pub mod playlist_writer;
pub mod listing;
