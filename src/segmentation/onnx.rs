use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use image::RgbaImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::instances::InstanceSplitter;
use super::preprocess::Preprocessor;
use super::types::{Instance, MaskProvider};
use crate::error::ProviderError;

/// Salient-object matting model (U2-Net, ISNet, MODNet style) run through ONNX Runtime.
///
/// The model takes one `[1, 3, H, W]` image tensor and returns a
/// `[1, 1, H, W]` foreground matte as its first output. The matte is split
/// into one instance per connected region.
pub struct OnnxMatteProvider {
    session: Mutex<Session>,
    preprocessor: Preprocessor,
    splitter: InstanceSplitter,
}

fn backend_error<E: Display>(error: E) -> ProviderError {
    ProviderError::Backend(error.to_string())
}

impl OnnxMatteProvider {
    /// Create a provider from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `input_size` - Square input resolution the model was exported with (320 for U2-Net)
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        splitter: InstanceSplitter,
    ) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading matting model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Matting model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            preprocessor: Preprocessor::new(input_size, input_size),
            splitter,
        })
    }
}

impl MaskProvider for OnnxMatteProvider {
    fn analyze(&self, image: &RgbaImage) -> Result<Vec<Instance>, ProviderError> {
        let _span = tracing::debug_span!("onnx_analyze").entered();

        let input_tensor = self.preprocessor.preprocess(image).map_err(backend_error)?;

        let (matte, matte_width, matte_height) = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ProviderError::Backend("model session lock poisoned".to_string()))?;

            let _infer_span = tracing::debug_span!("inference").entered();
            let input = TensorRef::from_array_view(input_tensor.view()).map_err(backend_error)?;
            let outputs = session
                .run(ort::inputs![input])
                .map_err(backend_error)?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(backend_error)?;

            // Matte shape: [1, 1, H, W]
            let dims: &[i64] = shape;
            if dims.len() < 2 {
                return Err(ProviderError::Backend(format!(
                    "unexpected matte shape {:?}",
                    dims
                )));
            }
            let matte_height = dims[dims.len() - 2] as u32;
            let matte_width = dims[dims.len() - 1] as u32;
            (data.to_vec(), matte_width, matte_height)
        };

        let (width, height) = image.dimensions();
        let mask = Preprocessor::postprocess_matte(&matte, matte_width, matte_height, width, height)
            .map_err(backend_error)?;

        Ok(self.splitter.split(&mask))
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
