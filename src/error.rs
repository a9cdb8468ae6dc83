use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::forms::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request was turned away; the response (a redirect carrying a
    /// warning) has already been built.
    #[error("request refused")]
    Refused(Box<Response>),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn refused(response: impl IntoResponse) -> Self {
        Self::Refused(Box::new(response.into_response()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Refused(response) => return *response,
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred".to_string())
            },
            AppError::Other(err) => {
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred".to_string())
            },
        };
        (status, Html(crate::templates::error_page(status, &message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Outcome of a store write that may be rejected on field-level grounds.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("submitted data is invalid")]
    Invalid(FieldErrors),
    #[error(transparent)]
    App(#[from] AppError),
}

impl From<sea_orm::DbErr> for SaveError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::App(AppError::Db(err))
    }
}

impl From<FieldErrors> for SaveError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

pub type SaveResult<T> = Result<T, SaveError>;
