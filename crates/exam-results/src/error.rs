use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::catalog::{CatalogError, UploadError};
use crate::workflows::embargo::EmbargoError;
use crate::workflows::entries::EntryError;
use crate::workflows::results::ResultsImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Entries(EntryError),
    Import(ResultsImportError),
    Catalog(CatalogError),
    Upload(UploadError),
    Embargo(EmbargoError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Entries(err) => write!(f, "entries error: {}", err),
            AppError::Import(err) => write!(f, "results import error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Upload(err) => write!(f, "basedata upload error: {}", err),
            AppError::Embargo(err) => write!(f, "embargo error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Entries(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Upload(err) => Some(err),
            AppError::Embargo(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Entries(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Entries(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Catalog(CatalogError::SeriesNotFound(_))
            | AppError::Catalog(CatalogError::SyllabusNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Catalog(_) | AppError::Upload(_) | AppError::Embargo(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Import(ResultsImportError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Entries(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EntryError> for AppError {
    fn from(value: EntryError) -> Self {
        Self::Entries(value)
    }
}

impl From<ResultsImportError> for AppError {
    fn from(value: ResultsImportError) -> Self {
        Self::Import(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<UploadError> for AppError {
    fn from(value: UploadError) -> Self {
        Self::Upload(value)
    }
}

impl From<EmbargoError> for AppError {
    fn from(value: EmbargoError) -> Self {
        Self::Embargo(value)
    }
}
