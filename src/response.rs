use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard JSON envelope: `{status, code, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(code: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "error",
            code: code.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::success("Devices retrieved", json!([1, 2, 3]));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["code"], 200);
        assert_eq!(value["message"], "Devices retrieved");
        assert_eq!(value["data"], json!([1, 2, 3]));
    }

    #[test]
    fn test_error_envelope_serializes_null_data() {
        let response =
            ApiResponse::<Value>::error(StatusCode::UNPROCESSABLE_ENTITY, "Validation errors", None);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], 422);
        assert_eq!(value["data"], Value::Null);
    }
}
