use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use env_logger::Builder;
use log::{error, info, warn};

use crate::model::config::Config;
use crate::processing::playlist_writer::write_m3u_playlist;
use crate::processing::listing::fetch_coordinator::fetch_video_links_concurrently;
use crate::utils::file::config_reader::read_config;
use crate::utils::file::file_utils::{get_default_config_file_path, get_file_path};
use crate::utils::network::request::{create_client, parse_listing_url};

mod api;
mod harvest_error;
mod model;
mod processing;
mod repository;
mod utils;

const LOG_ENV_VAR: &str = "M3U_HARVEST_LOG";
const EXIT_NO_LINKS: i32 = 2;

#[derive(Parser)]
#[command(name = "m3u-harvest")]
#[command(version, about = "Builds M3U playlists from video directory listings and serves playlist folders", long_about = None)]
struct Args {
    /// The config file
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// Directory listing url to scrape for video links, can be repeated
    #[arg(short = 'u', long = "url")]
    urls: Vec<String>,

    /// Output playlist file, overrides the config
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Serve the playlist directory over http
    #[arg(short = 's', long, default_value_t = false, default_missing_value = "true")]
    server: bool,

    /// log level, e.g. `debug` or `m3u_harvest=debug,hyper=warn`
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config_file = args.config_file.clone().unwrap_or_else(get_default_config_file_path);
    let mut cfg = match read_config(&config_file) {
        Ok(cfg) => {
            init_logger(args.log_level.as_deref(), cfg.log.as_ref().and_then(|log| log.log_level.as_deref()));
            cfg
        }
        Err(err) => {
            init_logger(args.log_level.as_deref(), None);
            utils::exit!("{err}")
        }
    };
    if let Err(err) = cfg.prepare() {
        utils::exit!("{err}");
    }

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(build_time) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        info!("Build time: {build_time}");
    }
    if Path::new(&config_file).exists() {
        info!("Config file: {config_file}");
    } else {
        warn!("Config file {config_file} not found, using defaults");
    }
    info!("Working dir: {}", &cfg.working_dir);

    if args.server {
        start_in_server_mode(Arc::new(cfg)).await;
    } else if args.urls.is_empty() {
        error!("Either --server or at least one --url is required");
        let _ = Args::command().print_help();
        std::process::exit(1);
    } else {
        let code = start_in_scrape_mode(&cfg, &args.urls, args.output.as_deref()).await;
        if code != 0 {
            std::process::exit(code);
        }
    }
}

async fn start_in_server_mode(cfg: Arc<Config>) {
    info!("Playlist dir: {}", cfg.library.dir);
    if let Err(err) = api::main_api::start_server(cfg).await {
        utils::exit!("Can't start server: {err}");
    }
}

async fn start_in_scrape_mode(cfg: &Config, urls: &[String], output: Option<&str>) -> i32 {
    info!("Starting the video link fetch and playlist generation process");
    let mut listing_urls = Vec::with_capacity(urls.len());
    for url in urls {
        match parse_listing_url(url) {
            Ok(listing_url) => listing_urls.push(listing_url),
            Err(err) => {
                error!("{err}");
                return 1;
            }
        }
    }

    let client = match create_client(&cfg.scraper) {
        Ok(client) => client,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    let video_links = fetch_video_links_concurrently(&client, &listing_urls, cfg.scraper.workers).await;
    if video_links.is_empty() {
        error!("No video links found");
        return EXIT_NO_LINKS;
    }

    let output_file = output.unwrap_or(cfg.scraper.output.as_str());
    let Some(output_path) = get_file_path(&cfg.working_dir, Some(PathBuf::from(output_file))) else {
        return 1;
    };
    match write_m3u_playlist(&video_links, &output_path) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            1
        }
    }
}

fn init_logger(user_log_level: Option<&str>, config_log_level: Option<&str>) {
    let env_log_level = std::env::var(LOG_ENV_VAR).ok();
    let log_level = user_log_level
        .or(env_log_level.as_deref())
        .or(config_log_level)
        .unwrap_or("info");

    let mut log_builder = Builder::from_default_env();
    log_builder.format_timestamp_millis();
    log_builder.parse_filters(log_level);
    log_builder.init();
}
