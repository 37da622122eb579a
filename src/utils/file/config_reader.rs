use std::path::PathBuf;

use crate::harvest_error::{create_harvest_error_result, HarvestError, HarvestErrorKind};
use crate::model::config::Config;
use crate::utils::file::file_utils;

/// Parses the config file, a missing file yields the defaults.
/// The result still needs `Config::prepare` before use.
pub fn read_config(config_file: &str) -> Result<Config, HarvestError> {
    let path = PathBuf::from(config_file);
    let config = if path.exists() {
        match file_utils::open_readonly_file(&path) {
            Ok(file) => match serde_yaml::from_reader::<_, Config>(file_utils::file_reader(file)) {
                Ok(cfg) => cfg,
                Err(err) => return create_harvest_error_result!(HarvestErrorKind::Config, "cant read config file {}: {}", config_file, err),
            },
            Err(err) => return create_harvest_error_result!(HarvestErrorKind::Config, "cant open config file {}: {}", config_file, err),
        }
    } else {
        Config::default()
    };
    Ok(config)
}
