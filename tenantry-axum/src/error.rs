use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tenantry_core::MultiTenantError;

/// HTTP-facing wrapper over [`MultiTenantError`], used as the rejection of
/// the [`CurrentTenant`](crate::extract::CurrentTenant) extractor.
#[derive(Debug)]
pub struct TenantAxumError(pub MultiTenantError);

impl From<MultiTenantError> for TenantAxumError {
    fn from(e: MultiTenantError) -> Self {
        Self(e)
    }
}

impl IntoResponse for TenantAxumError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MultiTenantError::NotSupported { .. } => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_operations_map_to_501() {
        let response =
            TenantAxumError(MultiTenantError::not_supported("store", "get_all")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn everything_else_maps_to_500() {
        let response =
            TenantAxumError(MultiTenantError::config("bad template")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
