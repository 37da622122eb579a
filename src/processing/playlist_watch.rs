use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::model::playlist_cache::PlaylistCache;
use crate::model::config::LibraryConfig;
use crate::utils::file::file_utils::traverse_dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryChangeKind {
    Created,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryChange {
    pub path: PathBuf,
    pub kind: LibraryChangeKind,
}

type LibrarySnapshot = BTreeMap<PathBuf, SystemTime>;

fn snapshot_library(library: &LibraryConfig) -> std::io::Result<LibrarySnapshot> {
    let mut snapshot = BTreeMap::new();
    traverse_dir(Path::new(&library.dir), &mut |entry, metadata| {
        let path = entry.path();
        if library.is_playlist_file(&path) {
            snapshot.insert(path, metadata.modified().unwrap_or(UNIX_EPOCH));
        }
    })?;
    Ok(snapshot)
}

fn diff_snapshots(old: &LibrarySnapshot, new: &LibrarySnapshot) -> Vec<LibraryChange> {
    let mut changes = vec![];
    for (path, modified) in new {
        match old.get(path) {
            None => changes.push(LibraryChange { path: path.clone(), kind: LibraryChangeKind::Created }),
            Some(previous) if previous != modified => changes.push(LibraryChange { path: path.clone(), kind: LibraryChangeKind::Modified }),
            Some(_) => {}
        }
    }
    for path in old.keys().filter(|path| !new.contains_key(*path)) {
        changes.push(LibraryChange { path: path.clone(), kind: LibraryChangeKind::Removed });
    }
    changes
}

async fn take_snapshot(library: &LibraryConfig) -> LibrarySnapshot {
    let library = library.clone();
    match tokio::task::spawn_blocking(move || snapshot_library(&library)).await {
        Ok(Ok(snapshot)) => snapshot,
        Ok(Err(err)) => {
            debug!("Could not watch playlist directory: {err}");
            LibrarySnapshot::new()
        }
        Err(err) => {
            error!("Playlist directory watch aborted: {err}");
            LibrarySnapshot::new()
        }
    }
}

/// Polls the library directory and reports every playlist file change.
/// Stops when the receiving side is dropped.
pub fn spawn_library_poller(library: LibraryConfig, poll_interval: Duration, tx: mpsc::Sender<LibraryChange>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut known = take_snapshot(&library).await;
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let current = take_snapshot(&library).await;
            for change in diff_snapshots(&known, &current) {
                if tx.send(change).await.is_err() {
                    return;
                }
            }
            known = current;
        }
    })
}

fn describe_changes(changes: &[LibraryChange]) -> String {
    changes.iter()
        .map(|change| format!("{:?}: {}", change.kind, change.path.display()))
        .collect::<Vec<String>>()
        .join("\n\t")
}

/// Rescans the cache for every burst of relevant changes.
pub fn spawn_invalidation_listener(cache: Arc<PlaylistCache>, mut rx: mpsc::Receiver<LibraryChange>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(change) = rx.recv().await {
            let mut changes = vec![change];
            while let Ok(more) = rx.try_recv() {
                changes.push(more);
            }
            changes.retain(|change| cache.library().is_playlist_file(&change.path));
            if changes.is_empty() {
                continue;
            }
            info!("Playlist directory changed [\n\t{}\n]", describe_changes(&changes));
            if let Err(err) = cache.invalidate().await {
                error!("Failed to rescan playlists after change: {err}");
            }
        }
    })
}

/// Wires the poller to the cache, returns `None` when watching is disabled.
pub fn start_library_watch(cache: &Arc<PlaylistCache>) -> Option<(JoinHandle<()>, JoinHandle<()>)> {
    let library = cache.library();
    if !library.watch {
        return None;
    }
    let (tx, rx) = mpsc::channel(256);
    let poller = spawn_library_poller(library.clone(), Duration::from_secs(library.watch_interval_secs), tx);
    let listener = spawn_invalidation_listener(Arc::clone(cache), rx);
    Some((poller, listener))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tokio::sync::mpsc;
    use crate::api::model::playlist_cache::PlaylistCache;
    use crate::model::config::LibraryConfig;
    use crate::processing::playlist_watch::{diff_snapshots, spawn_invalidation_listener, spawn_library_poller, LibraryChange, LibraryChangeKind};

    fn library_for(dir: &Path) -> LibraryConfig {
        LibraryConfig { dir: dir.to_string_lossy().to_string(), rescan_interval_secs: 3600, ..LibraryConfig::default() }
    }

    async fn wait_for_playlists(cache: &PlaylistCache, expected: usize) -> bool {
        for _ in 0..100 {
            if cache.get().await.map(|p| p.len()).unwrap_or(0) == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[test]
    fn test_diff_snapshots() {
        let t1 = UNIX_EPOCH + Duration::from_secs(1);
        let t2 = UNIX_EPOCH + Duration::from_secs(2);
        let old: BTreeMap<PathBuf, SystemTime> = BTreeMap::from([
            (PathBuf::from("a.m3u"), t1),
            (PathBuf::from("b.m3u"), t1),
        ]);
        let new = BTreeMap::from([
            (PathBuf::from("a.m3u"), t2),
            (PathBuf::from("c.m3u"), t1),
        ]);
        let changes = diff_snapshots(&old, &new);
        assert_eq!(changes, vec![
            LibraryChange { path: PathBuf::from("a.m3u"), kind: LibraryChangeKind::Modified },
            LibraryChange { path: PathBuf::from("c.m3u"), kind: LibraryChangeKind::Created },
            LibraryChange { path: PathBuf::from("b.m3u"), kind: LibraryChangeKind::Removed },
        ]);
        assert!(diff_snapshots(&new, &new).is_empty());
    }

    #[tokio::test]
    async fn test_listener_ignores_foreign_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.m3u"), "#EXTM3U\n").unwrap();
        let cache = Arc::new(PlaylistCache::new(library_for(dir.path())));
        assert_eq!(cache.get().await.unwrap().len(), 1);

        let (tx, rx) = mpsc::channel(8);
        let listener = spawn_invalidation_listener(Arc::clone(&cache), rx);
        std::fs::write(dir.path().join("two.m3u"), "#EXTM3U\n").unwrap();

        tx.send(LibraryChange { path: dir.path().join("notes.txt"), kind: LibraryChangeKind::Created }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get().await.unwrap().len(), 1);

        tx.send(LibraryChange { path: dir.path().join("two.m3u"), kind: LibraryChangeKind::Created }).await.unwrap();
        assert!(wait_for_playlists(&cache, 2).await);

        drop(tx);
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn test_poller_triggers_rescan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.m3u8"), "#EXTM3U\n").unwrap();
        let library = library_for(dir.path());
        let cache = Arc::new(PlaylistCache::new(library.clone()));
        assert_eq!(cache.get().await.unwrap().len(), 1);

        let (tx, rx) = mpsc::channel(8);
        let poller = spawn_library_poller(library, Duration::from_millis(20), tx);
        let listener = spawn_invalidation_listener(Arc::clone(&cache), rx);
        tokio::time::sleep(Duration::from_millis(50)).await;

        std::fs::write(dir.path().join("two.m3u8"), "#EXTM3U\n").unwrap();
        assert!(wait_for_playlists(&cache, 2).await);

        std::fs::remove_file(dir.path().join("one.m3u8")).unwrap();
        assert!(wait_for_playlists(&cache, 1).await);

        poller.abort();
        listener.abort();
    }
}
