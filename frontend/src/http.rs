use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::api::endpoints;
use shared::{ApiError, ApiResponse, CreateTaskDto, RawTask, TaskApi, TaskId};
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Request, RequestInit, RequestMode, Response};

use crate::config::AppConfig;

/// `TaskApi` over the browser's `fetch`.
#[derive(Debug, Clone)]
pub struct FetchApi {
    config: AppConfig,
}

/// Shape of an error body; only the message is of interest.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl FetchApi {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    async fn send<T>(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.config.endpoint(path);
        debug!(method, url = %url, "sending request");

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| ApiError::Transport(js_error("Failed to create request", &e)))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| ApiError::Transport(js_error("Failed to set header", &e)))?;
        }

        let promise = window()
            .ok_or_else(|| ApiError::Transport("no browser window".to_string()))?
            .fetch_with_request(&request);

        let response: Response = JsFuture::from(promise)
            .await
            .map_err(|e| ApiError::Transport(js_error("Failed to send request", &e)))?
            .into();

        let text_promise = response
            .text()
            .map_err(|e| ApiError::Transport(js_error("Failed to read response", &e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| ApiError::Transport(js_error("Failed to get text", &e)))?
            .as_string()
            .ok_or_else(|| ApiError::Decode("response body is not text".to_string()))?;

        let status = response.status();
        debug!(status, bytes = text.len(), "response received");

        if !response.ok() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message);
            return Err(ApiError::Http { status, message });
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("Failed to parse JSON: {}", e)))
    }
}

impl TaskApi for FetchApi {
    async fn create(&self, dto: &CreateTaskDto) -> Result<ApiResponse<RawTask>, ApiError> {
        let body = serde_json::to_string(dto)
            .map_err(|e| ApiError::Decode(format!("Failed to serialize request: {}", e)))?;
        self.send("POST", endpoints::CREATE, Some(body)).await
    }

    async fn list_all(&self) -> Result<ApiResponse<Vec<RawTask>>, ApiError> {
        self.send("GET", endpoints::LIST_ALL, None).await
    }

    async fn update_status(&self, id: TaskId) -> Result<ApiResponse<RawTask>, ApiError> {
        self.send("PUT", &endpoints::update_status(id), Some("{}".to_string()))
            .await
    }
}

fn js_error(context: &str, err: &JsValue) -> String {
    match err.as_string() {
        Some(detail) => format!("{}: {}", context, detail),
        None => format!("{}: {:?}", context, err),
    }
}
