use serde::{Deserialize, Serialize};

use crate::domain::{CameraDescriptor, CenterId, Region};

/// Input events the map screen reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MapEvent {
    MarkerTapped { center_id: CenterId },
    CardTapped { center_id: CenterId },
    DistrictSelected { district: Option<String> },
    LocateMe,
    AnimationFinished { generation: u64 },
}

/// Outbound commands issued to the map surface and the paired card list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MapCommand {
    AnimateToRegion {
        region: Region,
        duration_ms: u64,
        generation: u64,
    },
    AnimateCamera {
        camera: CameraDescriptor,
        duration_ms: u64,
        generation: u64,
    },
    ShowMarkers {
        markers: Vec<MarkerSummary>,
    },
    SetListItems {
        center_ids: Vec<CenterId>,
    },
    ScrollToIndex {
        index: usize,
        view_position: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSummary {
    pub center_id: CenterId,
    pub title: String,
    pub description: String,
    pub selected: bool,
}
