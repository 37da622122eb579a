use std::collections::HashMap;
use std::time::Duration;

use log::{error, log_enabled, trace, Level};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::harvest_error::{create_harvest_error_result, HarvestError, HarvestErrorKind};
use crate::model::config::ScraperConfig;

const BROWSER_HEADERS: [(&str, &str); 4] = [
    ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36"),
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"),
    ("accept-language", "en-US,en;q=0.9"),
    ("connection", "keep-alive"),
];

pub fn create_client(cfg: &ScraperConfig) -> Result<reqwest::Client, HarvestError> {
    reqwest::Client::builder()
        .default_headers(get_request_headers(Some(&cfg.headers)))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .or_else(|err| create_harvest_error_result!(HarvestErrorKind::Config, "failed to create http client: {}", err))
}

/// Browser headers overlaid with the configured ones, configured values win.
pub fn get_request_headers(defined_headers: Option<&HashMap<String, String>>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in BROWSER_HEADERS {
        headers.insert(HeaderName::from_static(key), HeaderValue::from_static(value));
    }
    if let Some(def_headers) = defined_headers {
        for (key, value) in def_headers {
            match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_bytes(value.as_bytes())) {
                (Ok(name), Ok(val)) => { headers.insert(name, val); }
                _ => error!("Ignoring invalid request header '{key}'"),
            }
        }
    }
    if log_enabled!(Level::Trace) {
        let he: HashMap<String, String> = headers.iter().map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).to_string())).collect();
        trace!("Request headers {:?}", he);
    }
    headers
}

/// Accepts only absolute `http` and `https` urls.
pub fn parse_listing_url(url_str: &str) -> Result<Url, HarvestError> {
    match Url::parse(url_str.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        Ok(url) => create_harvest_error_result!(HarvestErrorKind::Config, "Invalid url scheme {} for {}, expected http or https", url.scheme(), url_str),
        Err(err) => create_harvest_error_result!(HarvestErrorKind::Config, "Invalid url {}: {}", url_str, err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use reqwest::header::{ACCEPT, USER_AGENT};
    use crate::harvest_error::HarvestErrorKind;
    use crate::utils::network::request::{get_request_headers, parse_listing_url};

    #[test]
    fn test_request_headers_override() {
        let custom = HashMap::from([("User-Agent".to_string(), "harvest/1".to_string()),
            ("X-Token".to_string(), "abc".to_string())]);
        let headers = get_request_headers(Some(&custom));
        assert_eq!(headers.get(USER_AGENT).unwrap(), "harvest/1");
        assert_eq!(headers.get("x-token").unwrap(), "abc");
        assert!(headers.get(ACCEPT).unwrap().to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn test_parse_listing_url() {
        assert!(parse_listing_url("https://files.example.com/series/").is_ok());
        assert_eq!(parse_listing_url("ftp://files.example.com/").unwrap_err().kind, HarvestErrorKind::Config);
        assert_eq!(parse_listing_url("files.example.com/series").unwrap_err().kind, HarvestErrorKind::Config);
    }
}
