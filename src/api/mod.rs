pub mod api_utils;
pub mod main_api;
pub mod endpoints;
pub mod model;
