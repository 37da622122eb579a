use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::harvest_error::{scan_err, HarvestError};
use crate::model::config::LibraryConfig;
use crate::model::playlist::PlaylistFileRecord;
use crate::repository::playlist_repository::{default_playlist_record, scan_playlist_dir};
use crate::utils::debug_if_enabled;

pub type PlaylistList = Arc<Vec<PlaylistFileRecord>>;

#[derive(Default)]
struct ScanCache {
    playlists: PlaylistList,
    last_scan: Option<Instant>,
}

/// Cached listing of the playlist library.
///
/// The list is only ever replaced as a whole, readers either get the previous or
/// the new `Arc`. Scans are serialized through `refresh_lock`.
pub struct PlaylistCache {
    library: LibraryConfig,
    rescan_interval: Duration,
    state: RwLock<ScanCache>,
    refresh_lock: Mutex<()>,
}

impl PlaylistCache {
    pub fn new(library: LibraryConfig) -> Self {
        let rescan_interval = Duration::from_secs(library.rescan_interval_secs);
        Self {
            library,
            rescan_interval,
            state: RwLock::new(ScanCache::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn library(&self) -> &LibraryConfig {
        &self.library
    }

    fn fresh_playlists(&self, state: &ScanCache) -> Option<PlaylistList> {
        state.last_scan
            .filter(|ts| ts.elapsed() <= self.rescan_interval)
            .map(|_| Arc::clone(&state.playlists))
    }

    /// Returns the cached list, scanning the library first when it is stale.
    pub async fn get(&self) -> Result<PlaylistList, HarvestError> {
        if let Some(playlists) = self.fresh_playlists(&*self.state.read().await) {
            return Ok(playlists);
        }
        let _guard = self.refresh_lock.lock().await;
        // another request may have refreshed while we waited
        if let Some(playlists) = self.fresh_playlists(&*self.state.read().await) {
            return Ok(playlists);
        }
        self.refresh().await
    }

    /// Scans the library regardless of the age of the cached list.
    pub async fn invalidate(&self) -> Result<PlaylistList, HarvestError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh().await
    }

    async fn refresh(&self) -> Result<PlaylistList, HarvestError> {
        let library = self.library.clone();
        let scan_result = tokio::task::spawn_blocking(move || scan_playlist_dir(&library))
            .await
            .unwrap_or_else(|err| Err(scan_err!("Playlist scan aborted: {err}")));

        match scan_result {
            Ok(playlists) => {
                let playlists = Arc::new(playlists);
                let mut state = self.state.write().await;
                state.playlists = Arc::clone(&playlists);
                state.last_scan = Some(Instant::now());
                debug_if_enabled!("Playlist cache refreshed with {} entries", playlists.len());
                Ok(playlists)
            }
            Err(err) => self.fallback(err).await,
        }
    }

    async fn fallback(&self, err: HarvestError) -> Result<PlaylistList, HarvestError> {
        {
            let state = self.state.read().await;
            if !state.playlists.is_empty() {
                error!("{err}, serving {} cached playlists", state.playlists.len());
                return Ok(Arc::clone(&state.playlists));
            }
        }
        match self.library.default_playlist.as_deref().and_then(|filename| default_playlist_record(&self.library, filename)) {
            Some(record) => {
                warn!("{err}, serving default playlist {}", record.url);
                Ok(Arc::new(vec![record]))
            }
            None => Err(err),
        }
    }
}

/// First scan before the server accepts requests.
pub async fn warm_up(cache: &PlaylistCache) {
    match cache.invalidate().await {
        Ok(playlists) => info!("Found {} playlists in {}", playlists.len(), cache.library().dir),
        Err(err) => error!("Initial playlist scan failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use crate::api::model::playlist_cache::PlaylistCache;
    use crate::harvest_error::HarvestErrorKind;
    use crate::model::config::LibraryConfig;

    fn library_for(dir: &Path, rescan_interval_secs: u64) -> LibraryConfig {
        LibraryConfig {
            dir: dir.to_string_lossy().to_string(),
            rescan_interval_secs,
            ..LibraryConfig::default()
        }
    }

    fn write_playlist(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), format!("#PLAYLIST:{name}\nhttp://x/a.mp4\n")).unwrap();
    }

    #[tokio::test]
    async fn test_get_caches_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        write_playlist(dir.path(), "one.m3u");
        let cache = PlaylistCache::new(library_for(dir.path(), 3600));

        assert_eq!(cache.get().await.unwrap().len(), 1);
        write_playlist(dir.path(), "two.m3u");
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(cache.invalidate().await.unwrap().len(), 2);
        assert_eq!(cache.get().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_rescans_when_stale() {
        let dir = tempfile::tempdir().unwrap();
        write_playlist(dir.path(), "one.m3u");
        let cache = PlaylistCache::new(library_for(dir.path(), 0));

        assert_eq!(cache.get().await.unwrap().len(), 1);
        write_playlist(dir.path(), "two.m3u");
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_serves_stale_list_when_dir_removed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("lists");
        std::fs::create_dir(&root).unwrap();
        write_playlist(&root, "one.m3u");
        let cache = PlaylistCache::new(library_for(&root, 0));

        let before = cache.get().await.unwrap();
        std::fs::remove_dir_all(&root).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let after = cache.get().await.unwrap();
        assert_eq!(before, after);
        assert_eq!(cache.invalidate().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_without_previous_list() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlaylistCache::new(library_for(&dir.path().join("gone"), 30));
        let err = cache.get().await.unwrap_err();
        assert_eq!(err.kind, HarvestErrorKind::Scan);
    }

    #[tokio::test]
    async fn test_default_playlist_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = library_for(&dir.path().join("gone"), 30);
        library.default_playlist = Some("play.m3u8".to_string());
        let cache = PlaylistCache::new(library);
        let playlists = cache.get().await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "Default Playlist");
        assert_eq!(playlists[0].url, "/playlists/play.m3u8");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_and_rescans() {
        const PLAYLISTS: usize = 20;
        let dir = tempfile::tempdir().unwrap();
        for i in 0..PLAYLISTS {
            write_playlist(dir.path(), &format!("list_{i:02}.m3u8"));
        }
        let cache = Arc::new(PlaylistCache::new(library_for(dir.path(), 0)));

        let mut tasks = vec![];
        for worker in 0..12 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move {
                for _ in 0..40 {
                    let playlists = if worker % 3 == 0 {
                        cache.invalidate().await.unwrap()
                    } else {
                        cache.get().await.unwrap()
                    };
                    assert_eq!(playlists.len(), PLAYLISTS);
                    assert!(playlists.iter().all(|p| p.name.starts_with("list_")));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
