use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

use crate::harvest_error::{create_harvest_error_result, HarvestError, HarvestErrorKind};
use crate::model::config_log::LogConfig;
use crate::utils::file::file_utils::get_working_path;
use crate::utils::{default_api_host, default_api_port, default_as_empty_map, default_as_true,
                   default_library_dir, default_library_extensions, default_playlist_output,
                   default_rescan_interval_secs, default_scraper_timeout_secs, default_scraper_workers,
                   default_watch_interval_secs};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigApi {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default)]
    pub web_root: String,
}

impl Default for ConfigApi {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            web_root: String::new(),
        }
    }
}

impl ConfigApi {
    pub fn prepare(&mut self, working_dir: &str) {
        if !self.web_root.is_empty() {
            self.web_root = make_dir_absolute(&self.web_root, working_dir);
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScraperConfig {
    #[serde(default = "default_scraper_workers")]
    pub workers: usize,
    #[serde(default = "default_scraper_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_as_empty_map")]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_playlist_output")]
    pub output: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            workers: default_scraper_workers(),
            timeout_secs: default_scraper_timeout_secs(),
            headers: HashMap::new(),
            output: default_playlist_output(),
        }
    }
}

impl ScraperConfig {
    pub fn prepare(&mut self) -> Result<(), HarvestError> {
        if self.workers == 0 {
            self.workers = 1;
        }
        if self.timeout_secs == 0 {
            return create_harvest_error_result!(HarvestErrorKind::Config, "scraper.timeout_secs must be greater than 0");
        }
        if self.output.trim().is_empty() {
            self.output = default_playlist_output();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    #[serde(default = "default_library_dir")]
    pub dir: String,
    #[serde(default = "default_library_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_rescan_interval_secs")]
    pub rescan_interval_secs: u64,
    #[serde(default = "default_as_true")]
    pub watch: bool,
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_playlist: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            dir: default_library_dir(),
            extensions: default_library_extensions(),
            rescan_interval_secs: default_rescan_interval_secs(),
            watch: true,
            watch_interval_secs: default_watch_interval_secs(),
            default_playlist: None,
        }
    }
}

impl LibraryConfig {
    pub fn prepare(&mut self, working_dir: &str) -> Result<(), HarvestError> {
        if self.dir.trim().is_empty() {
            self.dir = default_library_dir();
        }
        self.dir = make_dir_absolute(&self.dir, working_dir);

        self.extensions = self.extensions.iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if self.extensions.is_empty() {
            return create_harvest_error_result!(HarvestErrorKind::Config, "library.extensions must not be empty");
        }
        if self.watch_interval_secs == 0 {
            self.watch_interval_secs = default_watch_interval_secs();
        }
        if let Some(default_playlist) = self.default_playlist.as_deref() {
            let is_relative_file = !default_playlist.is_empty()
                && Path::new(default_playlist).components().all(|c| matches!(c, Component::Normal(_)));
            if !is_relative_file {
                return create_harvest_error_result!(HarvestErrorKind::Config, "library.default_playlist must be a relative path below library.dir: {}", default_playlist);
            }
        }
        Ok(())
    }

    pub fn is_playlist_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub working_dir: String,
    #[serde(default)]
    pub api: ConfigApi,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
}

impl Config {
    pub fn prepare(&mut self) -> Result<(), HarvestError> {
        self.working_dir = get_working_path(&self.working_dir);
        self.api.prepare(&self.working_dir);
        self.scraper.prepare()?;
        self.library.prepare(&self.working_dir)
    }
}

fn make_dir_absolute(dir: &str, working_dir: &str) -> String {
    let path = PathBuf::from(dir);
    if path.is_relative() {
        PathBuf::from(working_dir).join(path).clean().to_string_lossy().to_string()
    } else {
        path.clean().to_string_lossy().to_string()
    }
}
