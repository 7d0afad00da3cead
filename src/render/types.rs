use crate::storage::UploadedFile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "modern interior, soft natural side light, photorealistic";
pub const DEFAULT_STRENGTH: &str = "0.45";
pub const MAX_PROMPT_CHARS: usize = 800;

pub const OUTPUT_FORMAT: &str = "png";
pub const EDIT_MODE: &str = "image-to-image";
pub const GENERATE_WIDTH: u32 = 1024;
pub const GENERATE_HEIGHT: u32 = 768;

/// A `/render` call after defaulting and truncation.
#[derive(Debug)]
pub struct RenderRequest {
    pub prompt: String,
    pub strength: String,
    pub image: Option<UploadedFile>,
}

impl RenderRequest {
    pub fn new(prompt: Option<String>, strength: Option<String>, image: Option<UploadedFile>) -> Self {
        let prompt = non_blank(prompt).unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        let strength = non_blank(strength).unwrap_or_else(|| DEFAULT_STRENGTH.to_string());

        Self {
            prompt: truncate_prompt(prompt),
            strength,
            image,
        }
    }

    /// Splits the request into the vendor job and the upload guard. The guard
    /// must outlive the job, since the edit call reads the file from disk.
    pub fn into_job(self) -> (RenderJob, Option<UploadedFile>) {
        match self.image {
            Some(upload) => {
                let job = RenderJob::Edit(EditRequest {
                    prompt: self.prompt,
                    strength: self.strength,
                    image_path: upload.path().to_path_buf(),
                    file_name: upload.file_name().to_string(),
                    content_type: upload.content_type().to_string(),
                });
                (job, Some(upload))
            }
            None => (RenderJob::Generate(GenerateRequest { prompt: self.prompt }), None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderJob {
    Edit(EditRequest),
    Generate(GenerateRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub prompt: String,
    pub strength: String,
    pub image_path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// JSON body for the text-to-image endpoint.
#[derive(Debug, Serialize)]
pub struct GenerateBody<'a> {
    pub prompt: &'a str,
    pub output_format: &'static str,
    pub width: u32,
    pub height: u32,
}

impl<'a> From<&'a GenerateRequest> for GenerateBody<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        Self {
            prompt: &request.prompt,
            output_format: OUTPUT_FORMAT,
            width: GENERATE_WIDTH,
            height: GENERATE_HEIGHT,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub image: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn truncate_prompt(prompt: String) -> String {
    match prompt.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((idx, _)) => prompt[..idx].to_string(),
        None => prompt,
    }
}
