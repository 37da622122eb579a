use std::future::Future;

use futures::StreamExt;
use log::{error, info};
use url::Url;

use crate::harvest_error::HarvestError;
use crate::model::playlist::VideoLink;
use crate::processing::listing::link_fetcher::fetch_video_links;

type FetchResult = (Url, Result<Vec<VideoLink>, HarvestError>);

/// Runs `fetch` for every url with at most `workers` requests in flight.
/// Results arrive in completion order.
pub async fn collect_fetch_results<F, Fut>(urls: &[Url], workers: usize, fetch: F) -> Vec<FetchResult>
where
    F: Fn(Url) -> Fut,
    Fut: Future<Output=Result<Vec<VideoLink>, HarvestError>>,
{
    futures::stream::iter(urls.iter().cloned())
        .map(|url| {
            let request = fetch(url.clone());
            async move { (url, request.await) }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

/// Drops failed urls after logging them and concatenates the rest.
pub fn merge_fetch_results(results: Vec<FetchResult>) -> Vec<VideoLink> {
    let mut video_links = vec![];
    for (url, result) in results {
        match result {
            Ok(links) => video_links.extend(links),
            Err(err) => error!("Error processing {url}: {err}"),
        }
    }
    video_links
}

pub async fn fetch_video_links_concurrently(client: &reqwest::Client, urls: &[Url], workers: usize) -> Vec<VideoLink> {
    info!("Fetching video links from {} url(s) with {} worker(s)", urls.len(), workers.max(1));
    let results = collect_fetch_results(urls, workers, |url| async move {
        fetch_video_links(client, &url).await
    }).await;
    merge_fetch_results(results)
}
