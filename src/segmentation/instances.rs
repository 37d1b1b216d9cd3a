use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::types::{Instance, InstanceId};
use crate::mask::Mask;

/// Splits a single foreground matte into one instance per connected region.
///
/// Pixels with coverage at or above `coverage_floor` take part in the
/// connectivity labelling; each region keeps the matte's soft coverage
/// values for its own pixels. Regions smaller than `min_area` pixels are
/// dropped as noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSplitter {
    pub coverage_floor: f32,
    pub min_area: u32,
}

impl Default for InstanceSplitter {
    fn default() -> Self {
        Self {
            coverage_floor: 0.05,
            min_area: 64,
        }
    }
}

impl InstanceSplitter {
    pub fn new(coverage_floor: f32, min_area: u32) -> Self {
        Self {
            coverage_floor,
            min_area,
        }
    }

    /// Label the matte and build instances ordered by first appearance in
    /// row-major scan, numbered from 1.
    pub fn split(&self, matte: &Mask) -> Vec<Instance> {
        let _span = tracing::debug_span!("split_instances").entered();

        let (width, height) = matte.dimensions();
        let binary = GrayImage::from_fn(width, height, |x, y| {
            if matte.coverage(x, y) >= self.coverage_floor {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let labeled = connected_components(&binary, Connectivity::Eight, Luma([0]));

        let mut areas: HashMap<u32, u32> = HashMap::new();
        let mut first_seen = Vec::new();
        for label in labeled.pixels() {
            if label[0] == 0 {
                continue;
            }
            let area = areas.entry(label[0]).or_insert_with(|| {
                first_seen.push(label[0]);
                0
            });
            *area += 1;
        }

        let kept: Vec<u32> = first_seen
            .into_iter()
            .filter(|label| areas[label] >= self.min_area)
            .collect();

        tracing::debug!(
            "Found {} regions, {} at or above {} pixels",
            areas.len(),
            kept.len(),
            self.min_area
        );

        kept.iter()
            .enumerate()
            .map(|(index, &label)| {
                let mask = Mask::from_fn(width, height, |x, y| {
                    if labeled.get_pixel(x, y)[0] == label {
                        matte.coverage(x, y)
                    } else {
                        0.0
                    }
                });
                Instance::new(InstanceId(index as u32 + 1), mask)
            })
            .collect()
    }
}
