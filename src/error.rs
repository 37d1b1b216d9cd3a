use thiserror::Error;

use crate::segmentation::InstanceId;

/// Picked bytes did not decode to a usable image
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("The picked file is not a supported image: {0}")]
    Unsupported(#[from] image::ImageError),

    #[error("The picked image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No subjects were detected in the image.")]
    NoInstancesDetected,

    #[error("The image cannot be analyzed: {0}")]
    InvalidInput(String),

    #[error("Mask provider failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("Mask is {mask_width}x{mask_height} but the source image is {source_width}x{source_height}")]
    DimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        source_width: u32,
        source_height: u32,
    },

    #[error("Composite has an empty or unbounded extent")]
    InvalidExtent,

    #[error("Failed to render the composite image")]
    RenderFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("Mask data has {actual} samples, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Everything that can reach the user from one pipeline action
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error("No image has been analyzed yet")]
    NoAnalysis,

    #[error("Subject {0} is not part of the current analysis")]
    UnknownInstance(InstanceId),

    #[error("No subject is selected")]
    EmptySelection,
}

impl PipelineError {
    /// The single line shown to the user for this failure
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
