//! Response envelope and error mapping.
//!
//! Dashboard clients branch on the `success` flag, not only on status codes,
//! so every response (including failures) is well-formed envelope JSON.

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Serialize,
    serde_json::json,
};

use {perch_panel::PanelError, perch_whatsapp::SessionError};

/// `{"success": true, "data": ...}`
pub fn ok_data<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": true, "message": "..."}`
pub fn ok_message(message: &str) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": message }))
}

/// A failure already mapped to a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult = Result<Json<serde_json::Value>, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let status = match &err {
            SessionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::NotAGroup(_) => StatusCode::BAD_REQUEST,
            SessionError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_statuses() {
        let cases = [
            (SessionError::unavailable(), StatusCode::SERVICE_UNAVAILABLE),
            (
                SessionError::NotFound("x@c.us".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                SessionError::NotAGroup("x@g.us".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SessionError::Backend("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn panel_errors_are_internal() {
        let err = PanelError::Upstream {
            status: 403,
            detail: "denied".into(),
        };
        let mapped = ApiError::from(err);
        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(mapped.message.contains("denied"));
    }
}
