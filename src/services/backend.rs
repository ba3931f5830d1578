// src/services/backend.rs
use crate::errors::CreatorError;
use crate::models::{AnalysisRequest, GenerationRequest};
use async_trait::async_trait;

/// The generative service seen as an opaque call returning raw text.
/// Implementations own transport, authentication and timeouts; callers own
/// parsing and validation of what comes back.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn analyze_image(&self, request: &AnalysisRequest) -> Result<String, CreatorError>;
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CreatorError>;
    fn name(&self) -> &str;
}
