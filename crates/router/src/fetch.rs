//! Network access.

use crate::error::{RouterError, RouterResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::time::Duration;

/// Issues requests to the network.
///
/// A non-2xx status is a successful fetch; only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &Request) -> RouterResult<Response>;
}

/// `reqwest`-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> RouterResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> RouterResult<Response> {
        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(RouterError::Http)?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
