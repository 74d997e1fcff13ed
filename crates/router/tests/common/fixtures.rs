use jotpad_core::config::{RouterConfig, StorageConfig};
use jotpad_router::{Destination, Request};
use reqwest::Url;

#[allow(dead_code)]
pub const ORIGIN: &str = "http://app.test";

#[allow(dead_code)]
pub fn config(generation: &str) -> RouterConfig {
    RouterConfig {
        generation: generation.to_string(),
        origin: ORIGIN.to_string(),
        cache: StorageConfig::Memory {
            public_base_url: None,
        },
        ..RouterConfig::default()
    }
}

#[allow(dead_code)]
pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

#[allow(dead_code)]
pub fn navigate(path: &str) -> Request {
    Request::navigate(url(path))
}

#[allow(dead_code)]
pub fn asset(path: &str) -> Request {
    Request::asset(url(path), Destination::Other)
}
