//! The `{"status", "data"}` JSON envelope used by mutations and failures.

use std::fmt::Display;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Response wrapper. `data` is omitted for a bare `{"status":"ok"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Envelope {
    /// `{"status":"ok"}`
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            status: "ok",
            data: None,
        }
    }

    /// `{"status":"ok","data":"<id>"}`, ids are sent as strings.
    #[must_use]
    pub fn created(id: impl Display) -> Self {
        Self {
            status: "ok",
            data: Some(id.to_string()),
        }
    }

    /// `{"status":"fail","data":"<message>"}`
    #[must_use]
    pub const fn fail(message: String) -> Self {
        Self {
            status: "fail",
            data: Some(message),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockroom_core::StoreId;

    use super::*;

    #[test]
    fn test_envelope_shapes() {
        assert_eq!(
            serde_json::to_value(Envelope::ok()).unwrap(),
            serde_json::json!({"status": "ok"})
        );
        assert_eq!(
            serde_json::to_value(Envelope::created(StoreId::new(3))).unwrap(),
            serde_json::json!({"status": "ok", "data": "3"})
        );
        assert_eq!(
            serde_json::to_value(Envelope::fail("not found".to_string())).unwrap(),
            serde_json::json!({"status": "fail", "data": "not found"})
        );
    }
}
