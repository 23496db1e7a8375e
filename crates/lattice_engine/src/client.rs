use std::time::Duration;

use futures_util::StreamExt;
use lattice_core::{ExportRequest, ExportResult, SceneResponse, SelectedFile};
use lattice_logging::{lattice_debug, lattice_info, lattice_warn};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::disposition::filename_from_disposition;
use crate::{ApiError, FailureKind};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_EXPORT_MIME: &str = "application/octet-stream";
const MALFORMED_RESPONSE: &str = "Malformed response from server";
const PROMPT_UNAVAILABLE: &str = "Prompt generation not available yet";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit; `None` waits as long as the transport allows.
    pub request_timeout: Option<Duration>,
    pub max_export_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_export_bytes: 256 * 1024 * 1024,
        }
    }
}

/// The remote structure backend.
#[async_trait::async_trait]
pub trait StructureService: Send + Sync {
    /// `POST /api/scene` with the file as multipart field `file`.
    async fn upload_cif(&self, file: &SelectedFile) -> Result<SceneResponse, ApiError>;

    /// `POST /api/prompt-structure` with `{ "prompt": ... }`.
    async fn generate_from_prompt(&self, prompt: &str) -> Result<SceneResponse, ApiError>;

    /// `POST /api/export`; returns the artifact bytes and how to name them.
    async fn export(&self, request: &ExportRequest) -> Result<ExportResult, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestService {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestService {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, ApiError> {
        let raw = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        url::Url::parse(&raw).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StructureService for ReqwestService {
    async fn upload_cif(&self, file: &SelectedFile) -> Result<SceneResponse, ApiError> {
        let url = self.endpoint("/api/scene")?;
        let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
            ApiError::new(
                FailureKind::LocalFile,
                format!("Could not read {}: {err}", file.name),
            )
        })?;
        lattice_info!("Uploading {} ({} bytes) to {}", file.name, bytes.len(), url);

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file.name.clone()));
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(response, format!("Upload failed ({})", status.as_u16())).await);
        }
        read_scene(response).await
    }

    async fn generate_from_prompt(&self, prompt: &str) -> Result<SceneResponse, ApiError> {
        let url = self.endpoint("/api/prompt-structure")?;
        lattice_info!("Requesting generated structure (prompt_len={})", prompt.len());

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NOT_IMPLEMENTED {
            return Err(ApiError::new(FailureKind::Unavailable, PROMPT_UNAVAILABLE));
        }
        if !status.is_success() {
            return Err(
                failure(response, format!("Generation failed ({})", status.as_u16())).await,
            );
        }
        read_scene(response).await
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportResult, ApiError> {
        let url = self.endpoint("/api/export")?;
        lattice_info!(
            "Exporting format={} cif={} structure={} scene={}",
            request.format.code(),
            request.cif.is_some(),
            request.structure.is_some(),
            request.scene.is_some()
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(response, format!("Export failed ({})", status.as_u16())).await);
        }

        let filename = header_text(&response, CONTENT_DISPOSITION)
            .and_then(|value| filename_from_disposition(&value))
            .unwrap_or_else(|| request.format.default_filename());
        let mime_type =
            header_text(&response, CONTENT_TYPE).unwrap_or_else(|| DEFAULT_EXPORT_MIME.to_string());
        let content = read_limited(response, self.settings.max_export_bytes).await?;
        lattice_debug!("Export {} returned {} bytes", filename, content.len());

        Ok(ExportResult {
            content,
            filename,
            mime_type,
        })
    }
}

/// Picks the user-facing message out of an error body: the first non-empty
/// `message`, `detail` or `error` field of a JSON object, else the raw text.
pub fn message_from_body(text: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(text) else {
        return text.to_string();
    };
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| json.get(key).and_then(message_text))
        .unwrap_or_else(|| text.to_string())
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

async fn failure(response: Response, fallback: String) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(text) if !text.is_empty() => message_from_body(&text),
        _ => fallback,
    };
    lattice_warn!("Backend returned {}: {}", status, message);
    ApiError::new(FailureKind::HttpStatus(status), message)
}

async fn read_scene(response: Response) -> Result<SceneResponse, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        lattice_warn!("Scene response did not parse: {}", err);
        ApiError::new(FailureKind::MalformedResponse, MALFORMED_RESPONSE)
    })
}

async fn read_limited(response: Response, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn too_large(max_bytes: u64, actual: u64) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "Export too large",
    )
}

fn header_text(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::MalformedResponse, MALFORMED_RESPONSE);
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
