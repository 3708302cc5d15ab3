//! The REST contract the task board talks to.

use thiserror::Error;

use crate::model::{ApiResponse, CreateTaskDto, RawTask, TaskId};

pub mod endpoints {
    use super::TaskId;

    pub const CREATE: &str = "/add-list";
    pub const LIST_ALL: &str = "/list/all";

    pub fn update_status(id: TaskId) -> String {
        format!("/update/{}", id)
    }
}

/// Failure below the envelope: the request never produced a usable
/// `ApiResponse`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Http {
        status: u16,
        /// `message` field of the error body, when the server sent one.
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Transport for the three task endpoints. Implementations only move bytes
/// and decode envelopes; caching and error reporting belong to the caller.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
    /// `POST /add-list`
    async fn create(&self, dto: &CreateTaskDto) -> Result<ApiResponse<RawTask>, ApiError>;

    /// `GET /list/all`
    async fn list_all(&self) -> Result<ApiResponse<Vec<RawTask>>, ApiError>;

    /// `PUT /update/{id}` with an empty body. The server picks the next status.
    async fn update_status(&self, id: TaskId) -> Result<ApiResponse<RawTask>, ApiError>;
}
