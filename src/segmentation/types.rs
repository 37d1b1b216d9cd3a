use std::fmt;

use image::RgbaImage;

use crate::error::ProviderError;
use crate::mask::{Bounds, Mask};

/// Identifier of a subject, unique within one analysis only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One detected foreground subject and its coverage mask
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    pub mask: Mask,
}

impl Instance {
    pub fn new(id: InstanceId, mask: Mask) -> Self {
        Self { id, mask }
    }

    /// Bounding rectangle of the subject, `None` when the mask is blank
    pub fn bounds(&self) -> Option<Bounds> {
        self.mask.bounds()
    }
}

/// Trait for mask providers
/// Allows swapping between backends (ONNX matting models, precomputed mattes, fixtures)
pub trait MaskProvider: Send + Sync {
    /// Detect foreground subjects in an image
    ///
    /// # Returns
    /// * One instance per subject, each mask aligned to the image's pixel grid
    ///   (or resampled by the caller when it is not). An empty list means no
    ///   subject was found.
    fn analyze(&self, image: &RgbaImage) -> Result<Vec<Instance>, ProviderError>;

    /// Short human-readable backend name for logs
    fn name(&self) -> &str;
}
