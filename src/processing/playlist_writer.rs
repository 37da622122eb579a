use std::io::Write;
use std::path::Path;

use log::info;

use crate::harvest_error::{write_err, HarvestError};
use crate::model::playlist::{PlaylistEntry, VideoLink};
use crate::utils::file::file_utils::{create_new_file_for_write, file_writer};

pub const M3U_HEADER: &str = "#EXTM3U";
/// Placeholder, the media is never probed for its real length.
pub const DEFAULT_DURATION: u32 = 10;

pub fn write_m3u<W: Write>(links: &[VideoLink], writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "{M3U_HEADER}")?;
    for entry in links.iter().map(PlaylistEntry::from) {
        writeln!(writer, "#EXTINF:{DEFAULT_DURATION}, {}", entry.title)?;
        writeln!(writer, "{}", entry.url)?;
    }
    Ok(())
}

pub fn write_m3u_playlist(links: &[VideoLink], output_file: &Path) -> Result<(), HarvestError> {
    let filename = output_file.to_string_lossy();
    info!("Generating m3u8 playlist in {filename}");
    let file = create_new_file_for_write(output_file)
        .map_err(|err| write_err!("Failed to create playlist file {filename}: {err}"))?;
    let mut writer = file_writer(file);
    write_m3u(links, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|err| write_err!("Failed to write playlist file {filename}: {err}"))?;
    info!("m3u8 playlist with {} entries generated successfully", links.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use url::Url;
    use crate::harvest_error::HarvestErrorKind;
    use crate::model::playlist::VideoLink;
    use crate::processing::playlist_writer::write_m3u_playlist;

    fn video_links() -> Vec<VideoLink> {
        ["http://x/a.mp4", "http://x/b.mkv"].iter().map(|u| VideoLink::new(Url::parse(u).unwrap())).collect()
    }

    #[test]
    fn test_write_m3u_playlist_format() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final_playlist.m3u8");
        write_m3u_playlist(&video_links(), &output).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content, "#EXTM3U\n#EXTINF:10, a.mp4\nhttp://x/a.mp4\n#EXTINF:10, b.mkv\nhttp://x/b.mkv\n");
    }

    #[test]
    fn test_write_m3u_playlist_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("list.m3u8");
        write_m3u_playlist(&video_links(), &output).unwrap();
        let first = std::fs::read(&output).unwrap();
        write_m3u_playlist(&video_links(), &output).unwrap();
        assert_eq!(first, std::fs::read(&output).unwrap());
    }

    #[test]
    fn test_write_m3u_playlist_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("list.m3u8");
        std::fs::write(&output, "x".repeat(4096)).unwrap();
        write_m3u_playlist(&[], &output).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "#EXTM3U\n");
    }

    #[test]
    fn test_write_m3u_playlist_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("list.m3u8");
        let err = write_m3u_playlist(&video_links(), &output).unwrap_err();
        assert_eq!(err.kind, HarvestErrorKind::Write);
    }
}
