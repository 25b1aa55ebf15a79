use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Recommendation pipeline that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Content,
    Collaborative,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Content => write!(f, "content similarity"),
            Engine::Collaborative => write!(f, "collaborative filtering"),
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine used out of order (e.g. ranking before text features exist)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Snapshot provider error: {0}")]
    Snapshot(String),

    #[error("{engine} recommendation failed: {source}")]
    Engine {
        engine: Engine,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps an error with the engine that was running when it happened
    pub fn in_engine(self, engine: Engine) -> Self {
        match self {
            // Caller mistakes stay visible as-is
            AppError::InvalidInput(_) | AppError::Engine { .. } => self,
            other => AppError::Engine {
                engine,
                source: Box::new(other),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_)
            | AppError::Precondition(_)
            | AppError::Snapshot(_)
            | AppError::Engine { .. } => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
