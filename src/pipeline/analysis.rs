use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use image::RgbaImage;

use crate::compose::{self, CompositeRequest};
use crate::error::PipelineError;
use crate::mask::Mask;
use crate::segmentation::{Instance, InstanceId};

/// Which subjects an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A single subject
    Instance(InstanceId),
    /// The union of the given highlighted subjects
    Highlighted,
}

/// Immutable result of analyzing one source image.
///
/// A newer analysis replaces an older one wholesale; nothing inside is ever
/// updated in place.
#[derive(Debug, Clone)]
pub struct Analysis {
    generation: u64,
    source: Arc<RgbaImage>,
    instances: Vec<Instance>,
}

impl Analysis {
    /// Fails when two instances share an identifier
    pub fn new(
        generation: u64,
        source: Arc<RgbaImage>,
        instances: Vec<Instance>,
    ) -> Result<Self, InstanceId> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = instances.iter().find(|i| !seen.insert(i.id)) {
            return Err(duplicate.id);
        }

        Ok(Self {
            generation,
            source,
            instances,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    /// Subjects ordered left to right by their bounds, blank masks last
    pub fn by_position(&self) -> Vec<&Instance> {
        let mut ordered: Vec<&Instance> = self.instances.iter().collect();
        ordered.sort_by_key(|i| (i.bounds().map_or(u32::MAX, |b| b.x), i.id));
        ordered
    }

    /// The subject covering a source pixel the most, if any covers it at all
    pub fn instance_at(&self, x: u32, y: u32) -> Option<&Instance> {
        let (width, height) = self.source.dimensions();
        self.instances
            .iter()
            .map(|i| {
                let coverage = if i.mask.dimensions() == (width, height) {
                    i.mask.coverage(x, y)
                } else {
                    let sx = x as u64 * i.mask.width() as u64 / width.max(1) as u64;
                    let sy = y as u64 * i.mask.height() as u64 / height.max(1) as u64;
                    i.mask.coverage(sx as u32, sy as u32)
                };
                (i, coverage)
            })
            .filter(|(_, coverage)| *coverage > 0.0)
            .fold(None, |best: Option<(&Instance, f32)>, (i, coverage)| match best {
                Some((_, best_coverage)) if best_coverage >= coverage => best,
                _ => Some((i, coverage)),
            })
            .map(|(i, _)| i)
    }

    /// Mask of one subject, resampled to the source image when needed
    pub fn aligned_mask(&self, id: InstanceId) -> Result<Cow<'_, Mask>, PipelineError> {
        let instance = self.instance(id).ok_or(PipelineError::UnknownInstance(id))?;
        let (width, height) = self.source.dimensions();
        if instance.mask.dimensions() == (width, height) {
            Ok(Cow::Borrowed(&instance.mask))
        } else {
            Ok(Cow::Owned(instance.mask.resample_to(width, height)))
        }
    }

    /// Aligned mask for a target; `highlighted` is only read for `Target::Highlighted`
    pub fn target_mask<'s, 'i, I>(
        &'s self,
        target: Target,
        highlighted: I,
    ) -> Result<Cow<'s, Mask>, PipelineError>
    where
        I: IntoIterator<Item = &'i InstanceId>,
    {
        match target {
            Target::Instance(id) => self.aligned_mask(id),
            Target::Highlighted => {
                let masks = highlighted
                    .into_iter()
                    .map(|&id| self.aligned_mask(id))
                    .collect::<Result<Vec<_>, _>>()?;
                Mask::union(masks.iter().map(|m| &**m))
                    .map(Cow::Owned)
                    .ok_or(PipelineError::EmptySelection)
            }
        }
    }

    /// Source composited through a mask, over `background` when given
    pub fn composite(
        &self,
        mask: &Mask,
        background: Option<&RgbaImage>,
    ) -> Result<RgbaImage, PipelineError> {
        let mut request = CompositeRequest::new(&self.source, mask);
        if let Some(background) = background {
            request = request.with_background(background);
        }
        Ok(compose::composite(&request)?)
    }

    /// Single subject cut out and cropped to its bounds
    pub fn extract(&self, id: InstanceId) -> Result<RgbaImage, PipelineError> {
        let mask = self.aligned_mask(id)?;
        Ok(compose::extract_subject(&self.source, &mask)?)
    }
}
