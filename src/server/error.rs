use super::types::ErrorResponse;
use crate::convert::ConvertError;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub const UNAUTHORIZED_DETAIL: &str = "Incorrect email or password";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{}", UNAUTHORIZED_DETAIL)]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    /// Reported as 404 so existing clients keep working.
    #[error("{0}")]
    ConversionFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ConvertError> for ApiError {
    fn from(error: ConvertError) -> Self {
        match error {
            ConvertError::EmptyInput => {
                Self::BadRequest("structure string must not be empty".to_string())
            }
            failed @ ConvertError::Failed { .. } => Self::ConversionFailed(failed.to_string()),
            ConvertError::Toolkit(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unauthorized => {
                let body = Json(ErrorResponse {
                    detail: UNAUTHORIZED_DETAIL.to_string(),
                });
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Basic")],
                    body,
                )
                    .into_response();
            }
            Self::BadRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            Self::ConversionFailed(detail) => (StatusCode::NOT_FOUND, detail),
            Self::Internal(cause) => {
                error!("Request failed inside the toolkit: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Chemistry toolkit unavailable".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Operation;
    use crate::toolkit::ToolkitError;

    #[test]
    fn convert_errors_map_to_api_errors() {
        let failed = ConvertError::Failed {
            operation: Operation::SmilesToImage,
            input: "xx".into(),
        };
        assert_eq!(
            ApiError::from(failed),
            ApiError::ConversionFailed("Conversion of SMILES failed: xx".into())
        );
        assert!(matches!(
            ApiError::from(ConvertError::EmptyInput),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ConvertError::Toolkit(ToolkitError::Unavailable("gone".into()))),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ConversionFailed("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_carries_basic_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic"
        );
    }
}
