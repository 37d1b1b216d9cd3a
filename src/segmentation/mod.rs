mod fixture;
mod instances;
mod matte_file;
#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
mod preprocess;
pub mod types;

pub use fixture::FixtureProvider;
pub use instances::InstanceSplitter;
pub use matte_file::MatteFileProvider;
#[cfg(feature = "onnx")]
pub use onnx::OnnxMatteProvider;
#[cfg(feature = "onnx")]
pub use preprocess::Preprocessor;
pub use types::{Instance, InstanceId, MaskProvider};
