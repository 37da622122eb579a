use std::collections::HashMap;

pub(crate) fn default_as_true() -> bool { true }

pub(crate) fn default_as_empty_map<K, V>() -> HashMap<K, V> { HashMap::new() }

pub(crate) fn default_api_host() -> String { String::from("0.0.0.0") }

pub(crate) fn default_api_port() -> u16 { 3000 }

pub(crate) fn default_scraper_workers() -> usize { 5 }

pub(crate) fn default_scraper_timeout_secs() -> u64 { 30 }

pub(crate) fn default_playlist_output() -> String { String::from("final_playlist.m3u8") }

pub(crate) fn default_library_dir() -> String { String::from("playlists") }

pub(crate) fn default_library_extensions() -> Vec<String> { vec![String::from("m3u8"), String::from("m3u")] }

pub(crate) fn default_rescan_interval_secs() -> u64 { 30 }

pub(crate) fn default_watch_interval_secs() -> u64 { 2 }
