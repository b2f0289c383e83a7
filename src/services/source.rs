use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::AppError;

pub const TRIP_INFO_RESOURCE: &str = "trip-info.json";
pub const ACTIVITIES_RESOURCE: &str = "activities.json";

const DATA_PREFIX: &str = "data/";

/// Raw response for one data document.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ResourceSource: Send + Sync {
    async fn fetch(&self, resource: &'static str) -> Result<Fetched, AppError>;
}

/// Fetches `data/<resource>` relative to a base URL.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Arc<Url>,
}

impl HttpSource {
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: Arc::new(base),
        }
    }

    pub fn resource_url(&self, resource: &str) -> Result<Url, AppError> {
        Ok(self.base.join(&format!("{DATA_PREFIX}{resource}"))?)
    }
}

#[async_trait]
impl ResourceSource for HttpSource {
    async fn fetch(&self, resource: &'static str) -> Result<Fetched, AppError> {
        let url = self.resource_url(resource)?;
        debug!(%url, "fetching trip resource");
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Fetched { status, body })
    }
}
