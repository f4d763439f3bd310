use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use remi_core::ServiceError;

pub fn service_error_to_response(err: &ServiceError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_error(status, err.message())
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_statuses() {
        let cases = [
            (ServiceError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (ServiceError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ServiceError::not_found("x"), StatusCode::NOT_FOUND),
            (ServiceError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(&err).status(), status);
        }
    }
}
