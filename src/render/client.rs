use super::types::*;
use crate::{Error, Result, config::StabilityConfig};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{
    Response,
    header::{ACCEPT, CONTENT_TYPE},
    multipart::{Form, Part},
};
use std::time::Duration;
use tracing::{debug, warn};

/// Outbound image operations. Each call returns the raw image bytes.
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn edit(&self, request: &EditRequest) -> Result<Vec<u8>>;

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>>;
}

pub struct StabilityClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    engine: String,
}

impl StabilityClient {
    pub fn new(config: &StabilityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            engine: config.engine.clone(),
        })
    }

    pub fn edit_url(&self) -> String {
        format!("{}/v2beta/stable-image/edit/{}", self.base_url, self.engine)
    }

    pub fn generate_url(&self) -> String {
        format!("{}/v2beta/stable-image/generate/core", self.base_url)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }
}

#[async_trait]
impl ImageClient for StabilityClient {
    async fn edit(&self, request: &EditRequest) -> Result<Vec<u8>> {
        let api_key = self.api_key()?;
        let url = self.edit_url();
        let image = tokio::fs::read(&request.image_path).await?;

        debug!("Sending edit request to {} ({} image bytes)", url, image.len());

        let form = Form::new()
            .text("prompt", request.prompt.clone())
            .text("output_format", OUTPUT_FORMAT)
            .text("strength", request.strength.clone())
            .text("mode", EDIT_MODE)
            .part(
                "image",
                Part::bytes(image)
                    .file_name(request.file_name.clone())
                    .mime_str(&request.content_type)?,
            );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        debug!("Edit returned {} bytes", bytes.len());

        Ok(bytes.to_vec())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        let api_key = self.api_key()?;
        let url = self.generate_url();

        debug!("Sending generate request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&GenerateBody::from(request))
            .send()
            .await?;
        let response = check_status(response).await?;

        let payload: GenerateResponse = response.json().await?;
        let encoded = payload.image.ok_or(Error::MissingImage)?;
        let bytes = BASE64.decode(encoded.trim())?;
        debug!("Generate returned {} decoded bytes", bytes.len());

        Ok(bytes)
    }
}

/// Turns a non-2xx vendor response into `Error::Vendor`, keeping the body text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    warn!("Vendor returned {}: {}", status, detail);

    Err(Error::vendor(status.as_u16(), detail))
}
