use std::sync::Arc;

use directory::DirectoryStore;
use shared::domain::{CenterId, LearningCenter};
use thiserror::Error;
use tracing::warn;

use crate::region::{self, Framing, RegionError};

pub const CENTERED_VIEW_POSITION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown center {0}")]
    UnknownCenter(CenterId),
    #[error(transparent)]
    Region(#[from] RegionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Selected,
    /// The tapped center is not part of the current filter. The selection is
    /// still taken, as the mobile client does, but the list cannot follow.
    OutsideFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapEffects {
    pub outcome: TapOutcome,
    pub framing: Framing,
    pub scroll_to: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterEffects {
    pub framing: Option<Framing>,
    pub visible: usize,
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    directory: Arc<DirectoryStore>,
    selected_center: Option<CenterId>,
    selected_district: Option<String>,
    filtered: Vec<LearningCenter>,
}

impl SelectionState {
    pub fn new(directory: Arc<DirectoryStore>) -> Self {
        let filtered = directory.filter_by_district(None);
        Self {
            directory,
            selected_center: None,
            selected_district: None,
            filtered,
        }
    }

    pub fn selected_center(&self) -> Option<&CenterId> {
        self.selected_center.as_ref()
    }

    pub fn selected_district(&self) -> Option<&str> {
        self.selected_district.as_deref()
    }

    pub fn filtered_centers(&self) -> &[LearningCenter] {
        &self.filtered
    }

    pub fn is_selected(&self, id: &CenterId) -> bool {
        self.selected_center.as_ref() == Some(id)
    }

    pub fn index_of(&self, id: &CenterId) -> Option<usize> {
        self.filtered.iter().position(|center| &center.id == id)
    }

    pub fn select_center(&mut self, id: &CenterId) -> Result<TapEffects, SelectionError> {
        let center = self
            .directory
            .get(id)
            .ok_or_else(|| SelectionError::UnknownCenter(id.clone()))?;
        let framing = region::frame_single(center.coordinates)?;

        self.selected_center = Some(id.clone());
        let scroll_to = self.index_of(id);
        let outcome = if scroll_to.is_some() {
            TapOutcome::Selected
        } else {
            warn!(
                center_id = %id,
                district = ?self.selected_district,
                "center selected outside the active district filter"
            );
            TapOutcome::OutsideFilter
        };

        Ok(TapEffects {
            outcome,
            framing,
            scroll_to,
        })
    }

    pub fn select_district(&mut self, district: Option<String>) -> FilterEffects {
        self.filtered = self.directory.filter_by_district(district.as_deref());
        self.selected_district = district;
        self.selected_center = None;

        let framing = if self.filtered.is_empty() {
            None
        } else {
            region::frame_points(self.filtered.iter().map(|center| center.coordinates)).ok()
        };

        FilterEffects {
            framing,
            visible: self.filtered.len(),
        }
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
