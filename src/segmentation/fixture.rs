use std::time::Duration;

use image::RgbaImage;

use super::instances::InstanceSplitter;
use super::types::{Instance, MaskProvider};
use crate::error::ProviderError;
use crate::mask::Mask;

/// Deterministic provider returning canned instances, whatever the image
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    outcome: Result<Vec<Instance>, ProviderError>,
    delay: Option<Duration>,
}

impl FixtureProvider {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            outcome: Ok(instances),
            delay: None,
        }
    }

    /// Instances obtained by splitting a matte into connected regions
    pub fn from_matte(matte: &Mask, splitter: InstanceSplitter) -> Self {
        Self::new(splitter.split(matte))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Block for `delay` before answering, to stand in for a slow backend
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl MaskProvider for FixtureProvider {
    fn analyze(&self, image: &RgbaImage) -> Result<Vec<Instance>, ProviderError> {
        tracing::debug!(
            "Fixture analysis of {}x{} image",
            image.width(),
            image.height()
        );
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
