use crate::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 64;

/// Writes inbound uploads to named files in the uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn persist(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadedFile> {
        let file_name = original_name
            .map(sanitize_file_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "image".to_string());
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| is_image_mime(ct))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| mime_from_file_name(&file_name).to_string());
        let path = self
            .dir
            .join(format!("upload_{}_{}", Uuid::new_v4().simple(), file_name));

        tokio::fs::write(&path, bytes).await?;
        debug!("Persisted upload {} ({} bytes)", path.display(), bytes.len());

        Ok(UploadedFile {
            path,
            file_name,
            content_type,
        })
    }
}

/// An upload owned by the current request. The file is removed when this
/// value is dropped, whichever way the request ends.
#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
    file_name: String,
    content_type: String,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        // Synchronous so the file is gone before the response is sent; a
        // single unlink. A failed unlink must never fail the request.
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Failed to remove upload {}: {}", self.path.display(), e);
        }
    }
}

/// Accepts `image/<subtype>` with no parameters.
fn is_image_mime(value: &str) -> bool {
    value
        .strip_prefix("image/")
        .is_some_and(|subtype| {
            !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        })
}

fn mime_from_file_name(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(MAX_NAME_LEN)
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
