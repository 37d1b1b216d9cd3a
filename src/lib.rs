//! Subject lifting and background replacement over foreground masks.
//!
//! A [`segmentation::MaskProvider`] turns an image into subject instances,
//! [`compose`] colorizes and composites their masks, and [`pipeline`] ties
//! the two together for interactive callers.

pub mod compose;
pub mod error;
pub mod mask;
pub mod output;
pub mod pipeline;
pub mod segmentation;
pub mod source;

pub use compose::{Color, CompositeRequest};
pub use error::{CompositeError, DecodeError, MaskError, PipelineError, ProviderError};
pub use mask::{Bounds, Mask};
pub use pipeline::{Analysis, Pipeline, Selection, Target, Workbench};
pub use segmentation::{Instance, InstanceId, MaskProvider};
