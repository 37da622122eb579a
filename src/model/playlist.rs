use std::path::PathBuf;

use serde::Serialize;
use url::Url;

pub const VIDEO_EXTENSIONS: [&str; 4] = [".mkv", ".mp4", ".avi", ".webm"];

/// A resolved link to a video file found on a directory listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    pub url: Url,
    pub file_name: String,
}

impl VideoLink {
    pub fn new(url: Url) -> Self {
        let file_name = url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map_or_else(String::new, ToString::to_string);
        Self { url, file_name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: String,
    pub url: String,
}

impl From<&VideoLink> for PlaylistEntry {
    fn from(link: &VideoLink) -> Self {
        Self {
            title: link.file_name.clone(),
            url: link.url.to_string(),
        }
    }
}

/// A playlist file found below the library directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlaylistFileRecord {
    pub name: String,
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub modified: String,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(skip)]
    pub modified_ts: i64,
}

#[cfg(test)]
mod tests {
    use url::Url;
    use crate::model::playlist::{PlaylistEntry, VideoLink};

    #[test]
    fn test_video_link_file_name() {
        let link = VideoLink::new(Url::parse("http://x/series/s01/ep%201.mkv").unwrap());
        assert_eq!(link.file_name, "ep%201.mkv");
        let entry = PlaylistEntry::from(&link);
        assert_eq!(entry.title, "ep%201.mkv");
        assert_eq!(entry.url, "http://x/series/s01/ep%201.mkv");
    }

    #[test]
    fn test_video_link_equality_by_url() {
        let a = VideoLink::new(Url::parse("http://x/a.mp4").unwrap());
        let b = VideoLink::new(Url::parse("http://x/a.mp4").unwrap());
        assert_eq!(a, b);
    }
}
