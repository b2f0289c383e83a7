use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    platform::PagePlatform,
    services::{clock::Clock, source::ResourceSource},
    view_model::{self, TripViewModel},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub view: Arc<RwLock<TripViewModel>>,
    pub source: Arc<dyn ResourceSource>,
}

impl AppState {
    pub fn new(config: AppConfig, source: Arc<dyn ResourceSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            view: Arc::new(RwLock::new(TripViewModel::new(clock))),
            source,
        }
    }

    /// Page host for the configured data origin.
    pub fn platform(&self) -> PagePlatform {
        PagePlatform::for_origin(self.config.data_base_url.clone())
    }

    pub async fn load(&self) {
        view_model::init(&self.view, &self.platform(), self.source.as_ref()).await;
    }
}
