use std::collections::BTreeSet;

use super::analysis::Target;
use crate::segmentation::InstanceId;

/// Caller's choice of subjects within one analysis.
///
/// `highlighted` is the multi-selection driving the combined preview;
/// `extracted` is the single subject used for extraction and compositing.
/// The two are independent: changing highlights never touches `extracted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    highlighted: BTreeSet<InstanceId>,
    extracted: Option<InstanceId>,
}

impl Selection {
    pub fn highlighted(&self) -> &BTreeSet<InstanceId> {
        &self.highlighted
    }

    pub fn extracted(&self) -> Option<InstanceId> {
        self.extracted
    }

    /// Returns false if it was already highlighted
    pub fn highlight(&mut self, id: InstanceId) -> bool {
        self.highlighted.insert(id)
    }

    /// Returns false if it was not highlighted
    pub fn unhighlight(&mut self, id: InstanceId) -> bool {
        self.highlighted.remove(&id)
    }

    /// Flip the highlight; returns whether the subject is now highlighted
    pub fn toggle(&mut self, id: InstanceId) -> bool {
        if self.highlighted.remove(&id) {
            false
        } else {
            self.highlighted.insert(id);
            true
        }
    }

    pub fn set_extracted(&mut self, id: Option<InstanceId>) {
        self.extracted = id;
    }

    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty() && self.extracted.is_none()
    }

    /// Combined highlights when there are any, else the extracted subject
    pub fn preview_target(&self) -> Option<Target> {
        if !self.highlighted.is_empty() {
            Some(Target::Highlighted)
        } else {
            self.extracted.map(Target::Instance)
        }
    }

    /// The extracted subject when set, else the combined highlights
    pub fn composite_target(&self) -> Option<Target> {
        match self.extracted {
            Some(id) => Some(Target::Instance(id)),
            None if !self.highlighted.is_empty() => Some(Target::Highlighted),
            None => None,
        }
    }
}
