use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use log::warn;
use url::Url;

use crate::harvest_error::{create_harvest_error_result, scan_err, HarvestError, HarvestErrorKind};
use crate::model::config::LibraryConfig;
use crate::model::playlist::PlaylistFileRecord;
use crate::utils::debug_if_enabled;
use crate::utils::file::file_utils::{read_first_line, traverse_dir};

pub const PLAYLIST_PATH: &str = "playlists";
const DEFAULT_PLAYLIST_NAME: &str = "Default Playlist";
const EXTINF_PREFIX: &str = "#EXTINF:";
const PLAYLIST_TITLE_PREFIX: &str = "#PLAYLIST:";

/// Title from a `#EXTINF:<duration>,<title>` or `#PLAYLIST:<title>` header line.
pub fn extract_title(first_line: &str) -> Option<String> {
    let line = first_line.trim();
    let title = if let Some(info) = line.strip_prefix(EXTINF_PREFIX) {
        info.split_once(',').map(|(_, title)| title)
    } else {
        line.strip_prefix(PLAYLIST_TITLE_PREFIX)
    }?.trim();
    if title.is_empty() { None } else { Some(title.to_string()) }
}

/// Serving url for a path relative to the library root, `None` unless every
/// component is a plain name.
pub fn playlist_url(relative: &Path) -> Option<String> {
    let mut url = Url::parse("http://localhost/").ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty().push(PLAYLIST_PATH);
        for component in relative.components() {
            match component {
                Component::Normal(name) => { segments.push(name.to_str()?); }
                _ => return None,
            }
        }
    }
    Some(url.path().to_string())
}

fn relative_filename(relative: &Path) -> String {
    relative.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_playlist_title(path: &Path) -> Option<String> {
    match read_first_line(path) {
        Ok(line) => line.as_deref().and_then(extract_title),
        Err(err) => {
            debug_if_enabled!("Could not read title from {}: {}", path.display(), err);
            None
        }
    }
}

fn create_playlist_record(root: &Path, path: &Path) -> Option<PlaylistFileRecord> {
    let canonical = match path.canonicalize() {
        Ok(canonical) => canonical,
        Err(err) => {
            warn!("Skipping playlist {}: {err}", path.display());
            return None;
        }
    };
    if !canonical.starts_with(root) {
        warn!("Skipping playlist {}, it resolves outside of the playlist directory", path.display());
        return None;
    }
    let relative = path.strip_prefix(root).ok()?;
    let Some(url) = playlist_url(relative) else {
        warn!("Skipping playlist {}, the path can not be served", path.display());
        return None;
    };
    let metadata = match fs::metadata(&canonical) {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!("Skipping playlist {}: {err}", path.display());
            return None;
        }
    };
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    let modified_ts = modified.duration_since(UNIX_EPOCH).map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
    let file_name = path.file_name().map_or_else(String::new, |name| name.to_string_lossy().to_string());

    Some(PlaylistFileRecord {
        name: read_playlist_title(&canonical).unwrap_or(file_name),
        url,
        filename: relative_filename(relative),
        size: metadata.len(),
        modified: DateTime::<Local>::from(modified).to_rfc3339(),
        path: canonical,
        modified_ts,
    })
}

/// Recursively collects all playlist files of the library, newest first.
pub fn scan_playlist_dir(library: &LibraryConfig) -> Result<Vec<PlaylistFileRecord>, HarvestError> {
    let root = PathBuf::from(&library.dir);
    let canonical_root = root.canonicalize()
        .map_err(|err| scan_err!("Failed to read playlist directory {}: {err}", root.display()))?;
    let mut playlists = vec![];
    traverse_dir(&canonical_root, &mut |entry, _metadata| {
        let path = entry.path();
        if library.is_playlist_file(&path) {
            if let Some(record) = create_playlist_record(&canonical_root, &path) {
                playlists.push(record);
            }
        }
    }).map_err(|err| scan_err!("Failed to scan playlist directory {}: {err}", root.display()))?;
    playlists.sort_by(|a, b| b.modified_ts.cmp(&a.modified_ts).then_with(|| a.filename.cmp(&b.filename)));
    debug_if_enabled!("Found {} playlists in {}", playlists.len(), root.display());
    Ok(playlists)
}

/// Placeholder listed when the library can not be read and nothing was cached before.
pub fn default_playlist_record(library: &LibraryConfig, filename: &str) -> Option<PlaylistFileRecord> {
    let relative = PathBuf::from(filename);
    let url = playlist_url(&relative)?;
    let now = SystemTime::now();
    Some(PlaylistFileRecord {
        name: DEFAULT_PLAYLIST_NAME.to_string(),
        url,
        filename: relative_filename(&relative),
        size: 0,
        modified: DateTime::<Local>::from(now).to_rfc3339(),
        path: PathBuf::from(&library.dir).join(relative),
        modified_ts: 0,
    })
}

/// Maps a requested relative path onto a playlist file inside the library root.
pub fn resolve_playlist_path(library: &LibraryConfig, requested: &str) -> Result<PathBuf, HarvestError> {
    let requested_path = Path::new(requested);
    let is_plain = !requested.is_empty()
        && requested_path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !is_plain {
        return create_harvest_error_result!(HarvestErrorKind::PathSecurity, "Rejected playlist path outside of playlist directory: {}", requested);
    }
    if !library.is_playlist_file(requested_path) {
        return create_harvest_error_result!(HarvestErrorKind::NotFound, "Not a playlist: {}", requested);
    }
    let Ok(root) = PathBuf::from(&library.dir).canonicalize() else {
        return create_harvest_error_result!(HarvestErrorKind::NotFound, "Playlist directory not available for {}", requested);
    };
    let Ok(canonical) = root.join(requested_path).canonicalize() else {
        return create_harvest_error_result!(HarvestErrorKind::NotFound, "Playlist not found: {}", requested);
    };
    if !canonical.starts_with(&root) {
        return create_harvest_error_result!(HarvestErrorKind::PathSecurity, "Rejected playlist path outside of playlist directory: {}", requested);
    }
    if !canonical.is_file() {
        return create_harvest_error_result!(HarvestErrorKind::NotFound, "Playlist not found: {}", requested);
    }
    Ok(canonical)
}
