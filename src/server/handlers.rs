use super::types::{ErrorResponse, HealthResponse, RenderResponse};
use crate::{
    Error, Result,
    config::Config,
    render::{ImageClient, RenderRequest, Renderer},
    storage::{ResultStore, UploadStore},
};
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::Json,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const FIELD_PROMPT: &str = "prompt";
const FIELD_STRENGTH: &str = "strength";
const FIELD_IMAGE: &str = "roomImage";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub renderer: Arc<Renderer>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, client: Arc<dyn ImageClient>) -> Self {
        let results = ResultStore::new(&config.server.results_dir);
        let uploads = UploadStore::new(&config.server.uploads_dir);

        Self {
            renderer: Arc::new(Renderer::new(client, results)),
            uploads: Arc::new(uploads),
            config,
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        provider: "stability",
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<RenderResponse>, (StatusCode, Json<ErrorResponse>)> {
    if state.config.stability.api_key.is_none() {
        warn!("Rejecting render request: no API key configured");
        return Err(error_response(&Error::MissingApiKey));
    }

    let request = match multipart {
        Ok(multipart) => read_form(&state, multipart).await,
        // A declared form that cannot be parsed is a client error
        Err(rejection) if is_multipart(&headers) => {
            Err(Error::invalid_form(rejection.body_text()))
        }
        Err(rejection) => {
            // Requests without a form body render with defaults
            debug!("No multipart body: {}", rejection);
            Ok(RenderRequest::new(None, None, None))
        }
    }
    .map_err(|e| {
        warn!("Invalid render request: {}", e);
        error_response(&e)
    })?;

    // `_upload` is dropped when this function returns, removing the file
    let (job, _upload) = request.into_job();

    match state.renderer.render(&job).await {
        Ok(stored) => {
            info!("Render succeeded: {}", stored.url);
            Ok(Json(RenderResponse {
                image_url: stored.url,
            }))
        }
        Err(e) => {
            error!("Render failed: {}", e);
            Err(error_response(&e))
        }
    }
}

async fn read_form(state: &AppState, mut multipart: Multipart) -> Result<RenderRequest> {
    let limit = state.config.server.max_upload_bytes;
    let form_error = move |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::UploadTooLarge { limit }
        } else {
            Error::invalid_form(e.body_text())
        }
    };

    let mut prompt = None;
    let mut strength = None;
    let mut image = None;

    while let Some(mut field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FIELD_PROMPT) => prompt = Some(field.text().await.map_err(form_error)?),
            Some(FIELD_STRENGTH) => strength = Some(field.text().await.map_err(form_error)?),
            Some(FIELD_IMAGE) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = read_capped(&mut field, limit, form_error).await?;
                if bytes.is_empty() {
                    debug!("Ignoring empty {} part", FIELD_IMAGE);
                    continue;
                }
                image = Some(
                    state
                        .uploads
                        .persist(file_name.as_deref(), content_type.as_deref(), &bytes)
                        .await?,
                );
            }
            other => debug!("Ignoring form field: {:?}", other),
        }
    }

    Ok(RenderRequest::new(prompt, strength, image))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/"))
}

async fn read_capped<F>(field: &mut Field<'_>, limit: usize, form_error: F) -> Result<Vec<u8>>
where
    F: Fn(MultipartError) -> Error,
{
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(&form_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(Error::UploadTooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Maps an error onto the HTTP status and JSON body returned to the caller.
pub fn error_response(e: &Error) -> (StatusCode, Json<ErrorResponse>) {
    let (status, body) = match e {
        Error::MissingApiKey => (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())),
        Error::UploadTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse::new(e.to_string()),
        ),
        Error::InvalidForm(detail) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid form data").with_detail(detail.clone()),
        ),
        Error::Vendor { status, detail } => {
            let code = StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut body = ErrorResponse::new("Render failed").with_detail(detail.clone());
            body.status = Some(*status);
            (code, body)
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Render failed").with_detail(other.to_string()),
        ),
    };

    (status, Json(body))
}
