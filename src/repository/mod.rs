pub mod playlist_repository;
