use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<StoreError>() {
            Some(StoreError::AuthRequired) => StatusCode::UNAUTHORIZED,
            Some(StoreError::Denied) => StatusCode::FORBIDDEN,
            Some(StoreError::UsernameTaken) => StatusCode::CONFLICT,
            Some(StoreError::InvalidUsername) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // internal detail (row existence included) stays out of the body
            tracing::error!(error = ?self.0, "request failed");
            return (status, "internal error").into_response();
        }

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
