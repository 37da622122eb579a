use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{error, warn};
use path_clean::PathClean;

const CONFIG_PATH: &str = "config";
const CONFIG_FILE: &str = "config.yml";

pub fn file_writer<W>(w: W) -> BufWriter<W>
where
    W: Write,
{
    BufWriter::with_capacity(131_072, w)
}

pub fn file_reader<R>(r: R) -> BufReader<R>
where
    R: Read,
{
    BufReader::with_capacity(8192, r)
}

pub fn get_exe_path() -> PathBuf {
    let default_path = std::path::PathBuf::from("./");
    let current_exe = std::env::current_exe();
    match current_exe {
        Ok(exe) => {
            match fs::read_link(&exe) {
                Ok(f) => f.parent().map_or(default_path, std::path::Path::to_path_buf),
                Err(_) => exe.parent().map_or(default_path, std::path::Path::to_path_buf)
            }
        }
        Err(_) => default_path
    }
}

/// Prefers `config/config.yml` beside the executable, falls back to the relative path.
pub fn get_default_config_file_path() -> String {
    let relative: PathBuf = [CONFIG_PATH, CONFIG_FILE].iter().collect();
    let beside_exe = get_exe_path().join(&relative);
    if beside_exe.exists() {
        beside_exe.to_string_lossy().to_string()
    } else {
        relative.to_string_lossy().to_string()
    }
}

pub fn get_working_path(wd: &str) -> String {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if wd.is_empty() {
        return current_dir.to_string_lossy().to_string();
    }
    let work_path = PathBuf::from(wd);
    let work_path = if work_path.is_relative() { current_dir.join(work_path) } else { work_path };
    if let Err(err) = fs::create_dir_all(&work_path) {
        error!("Could not create working dir {}: {err}", work_path.to_string_lossy());
    }
    work_path.canonicalize().map_or_else(|_| {
        error!("Path not found {:?}", &work_path);
        work_path.clean().to_string_lossy().to_string()
    }, |ap| ap.to_string_lossy().to_string())
}

pub fn get_file_path(wd: &str, path: Option<PathBuf>) -> Option<PathBuf> {
    path.map(|p| if p.is_relative() {
        let pb = PathBuf::from(wd);
        pb.join(&p).clean()
    } else {
        p
    })
}

#[inline]
pub fn create_new_file_for_write(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[inline]
pub fn open_readonly_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().read(true).write(false).truncate(false).create(false).open(path)
}

/// Returns the first line without the line terminator, `None` for an empty file.
pub fn read_first_line(path: &Path) -> std::io::Result<Option<String>> {
    let mut reader = file_reader(open_readonly_file(path)?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(Some(trimmed.trim_start_matches('\u{feff}').to_string()))
}

/// Visits every file below `path`. Only an unreadable `path` itself is an error,
/// unreadable entries and sub directories below it are logged and skipped.
pub fn traverse_dir<F>(path: &Path, visit: &mut F) -> std::io::Result<()>
where
    F: FnMut(&std::fs::DirEntry, &std::fs::Metadata),
{
    visit_dir_entries(fs::read_dir(path)?, visit);
    Ok(())
}

fn visit_dir_entries<F>(entries: fs::ReadDir, visit: &mut F)
where
    F: FnMut(&std::fs::DirEntry, &std::fs::Metadata),
{
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable directory entry: {err}");
                continue;
            }
        };
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Skipping {}: {err}", entry.path().display());
                continue;
            }
        };
        if metadata.is_dir() {
            match fs::read_dir(entry.path()) {
                Ok(sub_entries) => visit_dir_entries(sub_entries, visit),
                Err(err) => warn!("Skipping directory {}: {err}", entry.path().display()),
            }
        } else {
            visit(&entry, &metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use crate::utils::file::file_utils::{get_file_path, read_first_line, traverse_dir};

    #[test]
    fn test_read_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.m3u");
        std::fs::write(&file, "\u{feff}#EXTINF:5,My Title\r\nhttp://x/a.mp4\n").unwrap();
        assert_eq!(read_first_line(&file).unwrap().as_deref(), Some("#EXTINF:5,My Title"));

        let empty = dir.path().join("empty.m3u");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(read_first_line(&empty).unwrap(), None);

        assert!(read_first_line(&dir.path().join("missing.m3u")).is_err());
    }

    #[test]
    fn test_traverse_dir_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.m3u"), "").unwrap();
        std::fs::write(dir.path().join("a/b/deep.m3u8"), "").unwrap();
        let mut found = vec![];
        traverse_dir(dir.path(), &mut |entry, _| found.push(entry.file_name().to_string_lossy().to_string())).unwrap();
        found.sort();
        assert_eq!(found, vec!["deep.m3u8".to_string(), "top.m3u".to_string()]);
    }

    #[test]
    fn test_traverse_dir_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(traverse_dir(&dir.path().join("gone"), &mut |_, _| {}).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_traverse_dir_skips_unreadable_sub_dir() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.m3u8"), "").unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("hidden.m3u8"), "").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let mut found = vec![];
        let result = traverse_dir(dir.path(), &mut |entry, _| found.push(entry.file_name().to_string_lossy().to_string()));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.is_ok());
        assert!(found.contains(&"good.m3u8".to_string()));
    }

    #[test]
    fn test_get_file_path() {
        assert_eq!(get_file_path("/data", Some(PathBuf::from("out/../list.m3u8"))), Some(PathBuf::from("/data/list.m3u8")));
        assert_eq!(get_file_path("/data", Some(PathBuf::from("/tmp/x.m3u8"))), Some(PathBuf::from("/tmp/x.m3u8")));
        assert_eq!(get_file_path("/data", None), None);
    }
}
