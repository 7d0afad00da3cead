use crate::Result;
use chrono::Utc;
use std::path::PathBuf;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

/// URL prefix under which the results directory is served.
pub const RESULTS_URL_PREFIX: &str = "/results";

/// A rendered PNG written to the results directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

/// Append-only store for rendered images. Files are never rewritten or removed.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn save(&self, bytes: &[u8]) -> Result<StoredImage> {
        let file_name = result_file_name();
        let path = self.dir.join(&file_name);

        // create_new: an existing file is an error, never overwritten
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());

        Ok(StoredImage {
            url: format!("{}/{}", RESULTS_URL_PREFIX, file_name),
            file_name,
            path,
        })
    }
}

fn result_file_name() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("render_{}_{}.png", Utc::now().timestamp_millis(), &token[..8])
}
