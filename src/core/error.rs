use axum::BoxError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::types::response::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Key-value service error: {0}")]
    KeyValue(String),
    #[error("GitHub error: {0}")]
    Upstream(String),
    #[error("ADMIN_PASSWORD is not configured on the server")]
    MissingPassword,
    #[error("Missing ADMIN_SESSION_SECRET (recommended) or ADMIN_PASSWORD (fallback)")]
    MissingSecret,
    #[error("SESSION_TTL_SECONDS is out of range")]
    InvalidSessionTtl,
    #[error(
        "Approvals store is read-only: set KV_REST_API_TOKEN (or UPSTASH_REDIS_REST_TOKEN) to enable writes"
    )]
    ReadOnlyStore,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Missing action or repoName")]
    MissingField,
    #[error("Invalid action. Use 'approve' or 'disapprove'")]
    InvalidAction,
    #[error("Invalid repoName")]
    InvalidRepoName,
    #[error("Malformed payload")]
    MalformedPayload,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{:?}", self);

        let status = match &self {
            Error::HTTPClient(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::IncorrectPassword | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::MissingField
            | Error::InvalidAction
            | Error::InvalidRepoName
            | Error::MalformedPayload => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            Error::HTTPClient(_) => "Upstream request failed".to_owned(),
            Error::Redis(_) => "Redis error".to_owned(),
            Error::IO(_) => "IO error".to_owned(),
            Error::Serialize(_) => "Serialization error".to_owned(),
            Error::KeyValue(_) => "Key-value service error".to_owned(),
            Error::Upstream(message) => message,
            other => other.to_string(),
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> (StatusCode, Json<Envelope>) {
    tracing::error!("Unhandled error: {:?}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure("Internal Server Error".into())),
    )
}
