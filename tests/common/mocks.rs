use async_trait::async_trait;
use render_relay::{
    Error, Result,
    render::{EditRequest, GenerateRequest, ImageClient, RenderJob},
};
use std::sync::{Arc, Mutex};

/// Mock image client for testing. Records every job and returns fixed bytes.
#[derive(Debug)]
pub struct MockImageClient {
    pub jobs: Arc<Mutex<Vec<RenderJob>>>,
    pub image: Vec<u8>,
    pub error: Option<(u16, String)>,
}

impl MockImageClient {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(Vec::new())),
            image,
            error: None,
        }
    }

    pub fn with_vendor_error(mut self, status: u16, detail: &str) -> Self {
        self.error = Some((status, detail.to_string()));
        self
    }

    pub fn get_jobs(&self) -> Vec<RenderJob> {
        self.jobs.lock().unwrap().clone()
    }

    fn respond(&self, job: RenderJob) -> Result<Vec<u8>> {
        self.jobs.lock().unwrap().push(job);

        if let Some((status, ref detail)) = self.error {
            return Err(Error::vendor(status, detail.clone()));
        }

        Ok(self.image.clone())
    }
}

#[async_trait]
impl ImageClient for MockImageClient {
    async fn edit(&self, request: &EditRequest) -> Result<Vec<u8>> {
        // The upload must still be on disk while the vendor call runs
        assert!(
            request.image_path.exists(),
            "upload removed before edit call: {}",
            request.image_path.display()
        );
        self.respond(RenderJob::Edit(request.clone()))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        self.respond(RenderJob::Generate(request.clone()))
    }
}
