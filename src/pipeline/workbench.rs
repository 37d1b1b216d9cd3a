use std::sync::Arc;

use image::RgbaImage;

use super::analysis::{Analysis, Target};
use super::selection::Selection;
use super::Pipeline;
use crate::compose::{self, Color};
use crate::error::{CompositeError, PipelineError};
use crate::segmentation::InstanceId;
use crate::source::decode_image;

/// Handle for one requested analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// What happened to a finished analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// It replaced the current analysis
    Applied,
    /// It failed; the prior state is untouched and the message is set
    Failed,
    /// A newer analysis was requested meanwhile; it was dropped
    Stale,
}

/// Caller-owned view state: the latest analysis, the selection within it and
/// the last message for the user.
///
/// Every failure lands in [`Workbench::message`] and leaves the previously
/// shown analysis and selection in place.
#[derive(Debug, Default)]
pub struct Workbench {
    analysis: Option<Analysis>,
    selection: Selection,
    message: Option<String>,
    issued: u64,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn dismiss_message(&mut self) -> Option<String> {
        self.message.take()
    }

    /// Start a new analysis; any analysis requested earlier becomes stale
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn settle(&mut self, ticket: Ticket, result: Result<Analysis, PipelineError>) -> Settled {
        if ticket.0 != self.issued {
            tracing::debug!(
                "Dropping analysis {} result, generation {} is newer",
                ticket.0,
                self.issued
            );
            return Settled::Stale;
        }

        match result {
            Ok(analysis) => {
                tracing::debug!(
                    "Applying analysis {} with {} subjects",
                    ticket.0,
                    analysis.instances().len()
                );
                self.analysis = Some(analysis);
                self.selection = Selection::default();
                self.message = None;
                Settled::Applied
            }
            Err(err) => {
                self.report(&err);
                Settled::Failed
            }
        }
    }

    /// Decode picked bytes and analyze them
    ///
    /// Holds the workbench for the whole analysis. Callers that keep several
    /// analyses in flight use [`Workbench::begin`], [`Pipeline::analyze`] and
    /// [`Workbench::settle`] directly; only the latest ticket is applied.
    pub async fn load(&mut self, pipeline: &Pipeline, bytes: &[u8]) -> Settled {
        let ticket = self.begin();
        let result = match decode_image(bytes) {
            Ok(image) => pipeline
                .analyze(Arc::new(image), ticket.generation())
                .await
                .map_err(PipelineError::from),
            Err(err) => Err(err.into()),
        };
        self.settle(ticket, result)
    }

    fn report(&mut self, err: &PipelineError) {
        tracing::warn!("{}", err);
        self.message = Some(err.user_message());
    }

    fn capture<T>(&mut self, result: Result<T, PipelineError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    fn known(&self, id: InstanceId) -> Result<(), PipelineError> {
        let analysis = self.analysis.as_ref().ok_or(PipelineError::NoAnalysis)?;
        analysis
            .instance(id)
            .map(|_| ())
            .ok_or(PipelineError::UnknownInstance(id))
    }

    pub fn highlight(&mut self, id: InstanceId) -> bool {
        let result = self.known(id);
        self.capture(result).is_some() && self.selection.highlight(id)
    }

    pub fn unhighlight(&mut self, id: InstanceId) -> bool {
        self.selection.unhighlight(id)
    }

    /// Toggle the highlight of whichever subject covers a source pixel
    pub fn toggle_at(&mut self, x: u32, y: u32) -> Option<InstanceId> {
        let id = self.analysis.as_ref()?.instance_at(x, y)?.id;
        self.selection.toggle(id);
        Some(id)
    }

    /// Choose the subject used for extraction and compositing
    pub fn select_for_extraction(&mut self, id: InstanceId) -> bool {
        let result = self.known(id);
        if self.capture(result).is_none() {
            return false;
        }
        self.selection.set_extracted(Some(id));
        true
    }

    pub fn preview(&mut self, color: Color) -> Option<RgbaImage> {
        let result = self.preview_inner(color);
        self.capture(result)
    }

    fn preview_inner(&self, color: Color) -> Result<RgbaImage, PipelineError> {
        let analysis = self.analysis.as_ref().ok_or(PipelineError::NoAnalysis)?;
        let target = self.selection.preview_target().ok_or(PipelineError::EmptySelection)?;
        let mask = analysis.target_mask(target, self.selection.highlighted())?;
        compose::colorize(&mask, color).ok_or(PipelineError::Composite(CompositeError::RenderFailed))
    }

    pub fn composite(&mut self, background: Option<&RgbaImage>) -> Option<RgbaImage> {
        let result = self.composite_inner(background);
        self.capture(result)
    }

    fn composite_inner(&self, background: Option<&RgbaImage>) -> Result<RgbaImage, PipelineError> {
        let analysis = self.analysis.as_ref().ok_or(PipelineError::NoAnalysis)?;
        let target = self.selection.composite_target().ok_or(PipelineError::EmptySelection)?;
        let mask = analysis.target_mask(target, self.selection.highlighted())?;
        analysis.composite(&mask, background)
    }

    /// Cut out the extraction subject
    pub fn extract(&mut self) -> Option<RgbaImage> {
        let result = self.extract_inner();
        self.capture(result)
    }

    fn extract_inner(&self) -> Result<RgbaImage, PipelineError> {
        let analysis = self.analysis.as_ref().ok_or(PipelineError::NoAnalysis)?;
        match self.selection.composite_target() {
            Some(Target::Instance(id)) => analysis.extract(id),
            _ => Err(PipelineError::EmptySelection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Mask;
    use crate::segmentation::Instance;
    use image::Rgba;

    fn analysis(generation: u64) -> Analysis {
        let source = Arc::new(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));
        let instance = Instance::new(InstanceId(1), Mask::filled(4, 4, 1.0));
        Analysis::new(generation, source, vec![instance]).unwrap()
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut bench = Workbench::new();
        let first = bench.begin();
        let second = bench.begin();

        assert_eq!(bench.settle(second, Ok(analysis(2))), Settled::Applied);
        assert_eq!(bench.settle(first, Ok(analysis(1))), Settled::Stale);
        assert_eq!(bench.analysis().map(Analysis::generation), Some(2));
    }

    #[test]
    fn stale_failure_does_not_set_message() {
        let mut bench = Workbench::new();
        let first = bench.begin();
        let _second = bench.begin();
        assert_eq!(bench.settle(first, Err(PipelineError::NoAnalysis)), Settled::Stale);
        assert!(bench.message().is_none());
    }

    #[test]
    fn new_analysis_clears_selection() {
        let mut bench = Workbench::new();
        let ticket = bench.begin();
        bench.settle(ticket, Ok(analysis(1)));
        assert!(bench.highlight(InstanceId(1)));

        let ticket = bench.begin();
        bench.settle(ticket, Ok(analysis(2)));
        assert!(bench.selection().is_empty());
    }

    #[test]
    fn unknown_subject_sets_message() {
        let mut bench = Workbench::new();
        assert!(!bench.highlight(InstanceId(1)));
        assert_eq!(bench.message(), Some("No image has been analyzed yet"));

        let ticket = bench.begin();
        bench.settle(ticket, Ok(analysis(1)));
        assert!(!bench.select_for_extraction(InstanceId(8)));
        assert_eq!(bench.message(), Some("Subject #8 is not part of the current analysis"));
    }

    #[test]
    fn toggle_at_flips_subject_under_point() {
        let mut bench = Workbench::new();
        assert_eq!(bench.toggle_at(0, 0), None);

        let ticket = bench.begin();
        bench.settle(ticket, Ok(analysis(1)));
        assert_eq!(bench.toggle_at(2, 2), Some(InstanceId(1)));
        assert!(bench.selection().highlighted().contains(&InstanceId(1)));
        bench.toggle_at(2, 2);
        assert!(bench.selection().highlighted().is_empty());
    }

    #[test]
    fn blank_preview_reports_render_failure() {
        let source = Arc::new(RgbaImage::new(0, 0));
        let instance = Instance::new(InstanceId(1), Mask::filled(0, 0, 1.0));
        let blank = Analysis::new(1, source, vec![instance]).unwrap();

        let mut bench = Workbench::new();
        let ticket = bench.begin();
        bench.settle(ticket, Ok(blank));
        assert!(bench.highlight(InstanceId(1)));

        assert!(bench.preview(Color::RED).is_none());
        assert_eq!(bench.message(), Some("Failed to render the composite image"));
    }

    #[test]
    fn empty_selection_cannot_composite() {
        let mut bench = Workbench::new();
        let ticket = bench.begin();
        bench.settle(ticket, Ok(analysis(1)));

        assert!(bench.composite(None).is_none());
        assert_eq!(bench.message(), Some("No subject is selected"));
    }
}
