use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::common::UseCaseError;
use thiserror::Error;

use crate::domain::a001_sales_order::repository::RepositoryError;
use crate::usecases::u501_import_sales_excel::ImportError;

/// Ошибки, которые обработчики возвращают клиенту
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[source] RepositoryError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateKey(order_id) => {
                AppError::Conflict(format!("Sales order with OrderID '{}' already exists", order_id))
            }
            other => AppError::Storage(other),
        }
    }
}

/// Malformed or mistyped JSON bodies are input errors like any other
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Import(ImportError::Storage { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::Import(ImportError::Parse(_)) => "PARSE_ERROR",
            AppError::Import(ImportError::Schema { .. }) => "SCHEMA_ERROR",
            AppError::Import(ImportError::NoValidData { .. }) => "NO_VALID_DATA",
            AppError::Import(ImportError::Storage { .. }) | AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Import(err) => err.details(),
            _ => None,
        }
    }

    pub fn to_body(&self) -> UseCaseError {
        let body = UseCaseError::new(self.code(), self.to_string());
        match self.details() {
            Some(details) => body.with_details(details),
            None => body,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_is_bad_request() {
        let err = AppError::from(ImportError::Schema {
            missing: vec!["Revenue".into(), "OrderDate".into()],
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.to_body();
        assert_eq!(body.code, "SCHEMA_ERROR");
        assert_eq!(body.message, "Missing required columns: Revenue, OrderDate");
        assert_eq!(
            body.details.unwrap()["missingColumns"],
            serde_json::json!(["Revenue", "OrderDate"])
        );
    }

    #[test]
    fn test_import_storage_error_keeps_partial_counts() {
        let err = AppError::from(ImportError::Storage {
            source: RepositoryError::Database(sea_orm::DbErr::Custom("disk full".into())),
            order_id: "SO-9".into(),
            inserted: 4,
            skipped: 2,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.to_body();
        assert_eq!(body.code, "STORAGE_ERROR");
        let details = body.details.unwrap();
        assert_eq!(details["insertedCount"], 4);
        assert_eq!(details["skippedCount"], 2);
        assert_eq!(details["orderId"], "SO-9");
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let err = AppError::from(RepositoryError::DuplicateKey("SO-1".into()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONFLICT");
    }
}
