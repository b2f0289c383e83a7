use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("Failed to load {resource}. Status: {status}")]
    ResourceStatus { resource: &'static str, status: u16 },
    #[error("could not parse {resource}: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{resource} has no \"activities\" list")]
    MissingActivities { resource: &'static str },
    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Url(_)
            | AppError::Parse { .. }
            | AppError::MissingActivities { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Http(_) | AppError::ResourceStatus { .. } => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };

        (status, self.to_string()).into_response()
    }
}
