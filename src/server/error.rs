use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::export::ExportError;
use crate::repository::StoreError;
use crate::scrapers::ScrapeError;
use crate::search::SearchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Access denied")]
    Unauthorized,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Search(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::NotFound(_) | StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Store(_) | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Scrape(ScrapeError::NotConfigured | ScrapeError::InvalidUrl(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Scrape(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
