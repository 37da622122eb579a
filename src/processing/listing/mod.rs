pub mod fetch_coordinator;
pub mod link_fetcher;
