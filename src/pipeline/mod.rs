mod analysis;
mod selection;
mod workbench;

pub use analysis::{Analysis, Target};
pub use selection::Selection;
pub use workbench::{Settled, Ticket, Workbench};

use std::sync::Arc;

use image::RgbaImage;

use crate::error::ProviderError;
use crate::segmentation::MaskProvider;

/// Runs mask providers off the caller's thread and packages their output
/// into immutable [`Analysis`] values.
#[derive(Clone)]
pub struct Pipeline {
    provider: Arc<dyn MaskProvider>,
}

impl Pipeline {
    pub fn new<P: MaskProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn with_provider(provider: Arc<dyn MaskProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Detect subjects in `image`. The provider runs on the blocking pool so
    /// slow backends never stall the caller's executor thread.
    pub async fn analyze(
        &self,
        image: Arc<RgbaImage>,
        generation: u64,
    ) -> Result<Analysis, ProviderError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ProviderError::InvalidInput(format!(
                "image has no pixels ({width}x{height})"
            )));
        }

        tracing::info!(
            "Analyzing {}x{} image with {} provider (generation {})",
            width,
            height,
            self.provider.name(),
            generation
        );

        let provider = Arc::clone(&self.provider);
        let input = Arc::clone(&image);
        let instances = tokio::task::spawn_blocking(move || provider.analyze(&input))
            .await
            .map_err(|e| ProviderError::Backend(format!("analysis task failed: {e}")))??;

        if instances.is_empty() {
            tracing::info!("No subjects detected");
            return Err(ProviderError::NoInstancesDetected);
        }

        tracing::info!("Detected {} subjects", instances.len());

        Analysis::new(generation, image, instances).map_err(|id| {
            ProviderError::Backend(format!("provider returned subject {id} more than once"))
        })
    }
}
