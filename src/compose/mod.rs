mod color;
mod colorize;
mod compositor;
pub mod geometry;

pub use color::Color;
pub use colorize::colorize;
pub use compositor::{composite, extract_subject, CompositeRequest};
