use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::SubmitResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Date already exists")]
    DuplicateDate(String),
    #[error("Record not found")]
    NotFound(i64),
    #[error("Failed to insert record")]
    InsertFailed(#[source] sqlx::Error),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateDate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsertFailed(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InsertFailed(e) | AppError::Database(e) => {
                log::error!("{}: {:?}", self, e)
            }
            AppError::DuplicateDate(date) => log::info!("rejected duplicate date {}", date),
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(SubmitResponse {
            success: false,
            message: self.to_string(),
            id: None,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },
}
