mod client;
mod types;

pub use client::*;
pub use types::*;

use crate::{Result, storage::{ResultStore, StoredImage}};
use std::sync::Arc;
use tracing::info;

/// Runs a render job against the vendor and persists the returned image.
pub struct Renderer {
    client: Arc<dyn ImageClient>,
    results: ResultStore,
}

impl Renderer {
    pub fn new(client: Arc<dyn ImageClient>, results: ResultStore) -> Self {
        Self { client, results }
    }

    pub async fn render(&self, job: &RenderJob) -> Result<StoredImage> {
        let bytes = match job {
            RenderJob::Edit(request) => {
                info!("Rendering image edit for upload: {}", request.file_name);
                self.client.edit(request).await?
            }
            RenderJob::Generate(request) => {
                info!("Rendering text-to-image ({} prompt chars)", request.prompt.chars().count());
                self.client.generate(request).await?
            }
        };

        let stored = self.results.save(&bytes).await?;
        info!("Render stored as {}", stored.file_name);

        Ok(stored)
    }
}
