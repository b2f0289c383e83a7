use std::{env, net::SocketAddr, path::PathBuf};

use chrono::NaiveDate;
use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Origin the `data/` documents are fetched from.
    pub data_base_url: Url,
    /// Directory served under `/data`.
    pub data_dir: PathBuf,
    pub today_override: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let raw_base =
            env::var("DATA_BASE_URL").unwrap_or_else(|_| format!("http://{listen_addr}/"));
        let data_base_url = parse_base_url(&raw_base)?;

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let today_override = match env::var("TRIP_TODAY") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|err| AppError::Config(format!("invalid TRIP_TODAY: {err}")))?,
            ),
            _ => None,
        };

        Ok(Self {
            listen_addr,
            data_base_url,
            data_dir,
            today_override,
        })
    }
}

/// Parses a base URL and makes sure relative joins stay below its path.
pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| AppError::Config(format!("invalid DATA_BASE_URL: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
