use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("score must be between 1 and 5, got {0}")]
    ScoreOutOfRange(i32),
    #[error("username is required")]
    EmptyUsername,
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    #[error("title is required")]
    EmptyTitle,
    #[error("movie {0} not found")]
    UnknownMovie(i32),
    #[error("user {0} not found")]
    UnknownUser(i32),
    #[error("genre {0} not found")]
    UnknownGenre(i32),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::ScoreOutOfRange(_)
            | RequestError::EmptyUsername
            | RequestError::EmptyTitle => StatusCode::BAD_REQUEST,
            RequestError::UsernameTaken(_) => StatusCode::CONFLICT,
            RequestError::UnknownMovie(_)
            | RequestError::UnknownUser(_)
            | RequestError::UnknownGenre(_) => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn request_error(&self) -> Option<&RequestError> {
        self.0.downcast_ref::<RequestError>()
    }

    pub fn status(&self) -> StatusCode {
        self.request_error().map_or(StatusCode::INTERNAL_SERVER_ERROR, RequestError::status)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<wreq::Error> for AppError {
    fn from(err: wreq::Error) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
