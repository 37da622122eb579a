use std::sync::LazyLock;

use log::{debug, info};
use scraper::{Html, Selector};
use url::Url;

use crate::harvest_error::{create_harvest_error, fetch_err, HarvestError, HarvestErrorKind};
use crate::model::playlist::{VideoLink, VIDEO_EXTENSIONS};

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// The raw href has to end with a video extension, links carrying a query or fragment
/// after the extension are not taken.
pub fn is_video_href(href: &str) -> bool {
    VIDEO_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
}

/// Collects all video links of a listing page in document order.
pub fn extract_video_links(html: &str, base_url: &Url) -> Vec<VideoLink> {
    let document = Html::parse_document(html);
    document.select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_video_href(href))
        .filter_map(|href| match base_url.join(href) {
            Ok(url) => Some(VideoLink::new(url)),
            Err(err) => {
                let parse_error = create_harvest_error!(HarvestErrorKind::Parse, "Skipping link {href} on {base_url}: {err}");
                debug!("{parse_error}");
                None
            }
        })
        .collect()
}

pub async fn fetch_video_links(client: &reqwest::Client, url: &Url) -> Result<Vec<VideoLink>, HarvestError> {
    info!("Sending request to {url}");
    let response = client.get(url.clone()).send().await
        .map_err(|err| fetch_err!("Error fetching url {url}: {err}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_err!("Error fetching url {url}: status {status}"));
    }
    let body = response.text().await
        .map_err(|err| fetch_err!("Error reading response from {url}: {err}"))?;
    let links = extract_video_links(&body, url);
    info!("Found {} video links on {url}", links.len());
    Ok(links)
}
