use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::sampler::ConfigurationError;

/// Top-level error for HTTP handlers. Repositories return `anyhow::Result`
/// and are folded into `Internal`; domain errors map to their own statuses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self:#}");
        }

        let body = json!({
            "status": "error",
            "code": status.as_u16(),
            "message": self.to_string(),
            "data": null,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_maps_to_422() {
        let err = AppError::from(ConfigurationError::PercentageSum { total: 30 });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
