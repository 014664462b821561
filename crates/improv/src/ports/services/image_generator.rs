//! Image Generator Port
//!
//! Abstract interface for a diffusion model server.

use async_trait::async_trait;

use crate::domain::{errors::PipelineError, ImageRequest, ImageResult, ModelInfo};

/// Image generation service
///
/// Every call sends exactly one request. Implementations never retry:
/// connection failures surface as `ServiceUnavailable`, non-2xx answers
/// as `RequestRejected`, elapsed bounds as `Timeout`.
///
/// # Example
///
/// ```rust,ignore
/// use improv::ports::ImageGenerator;
///
/// let result = generator.txt2img(&request).await?;
/// println!("{} images, seed {:?}", result.images.len(), result.seed);
/// ```
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate images from a prompt
    async fn txt2img(&self, request: &ImageRequest) -> Result<ImageResult, PipelineError>;

    /// Generate variations of `init_image` (raw file bytes)
    ///
    /// `request.settings.denoising_strength` controls how much of the
    /// reference survives: 0 keeps it, 1 ignores it.
    async fn img2img(
        &self,
        request: &ImageRequest,
        init_image: &[u8],
    ) -> Result<ImageResult, PipelineError>;

    /// Checkpoints the server can load
    async fn list_models(&self) -> Result<Vec<ModelInfo>, PipelineError>;

    /// Checkpoint currently loaded
    async fn current_model(&self) -> Result<String, PipelineError>;

    /// Load a different checkpoint
    async fn set_model(&self, model: &str) -> Result<(), PipelineError>;

    /// Whether the server answers at all
    async fn health_check(&self) -> Result<bool, PipelineError> {
        Ok(true)
    }
}
