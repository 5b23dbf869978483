use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use directory::DirectoryStore;
use shared::{
    domain::{CameraDescriptor, CenterId, Coordinates, LearningCenter, Region},
    protocol::{MapCommand, MapEvent, MarkerSummary},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    animation_gate::{
        AnimationGate, AnimationTicket, GateDecision, DEFAULT_ANIMATION_DURATION, DEFAULT_SLACK,
    },
    location::{acquire_fix, LocationFix, LocationProvider, DEFAULT_LOCATION_TIMEOUT},
    region::{self, Framing},
    selection::{FilterEffects, SelectionError, SelectionState, TapOutcome, CENTERED_VIEW_POSITION},
};

pub trait MapSurface: Send {
    fn animate_to_region(&mut self, region: &Region, duration: Duration, ticket: AnimationTicket);
    fn animate_camera(
        &mut self,
        camera: &CameraDescriptor,
        duration: Duration,
        ticket: AnimationTicket,
    );
    fn show_markers(&mut self, markers: &[MarkerSummary]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScrollError {
    #[error("index {index} is outside the rendered list of {len} items")]
    OutOfRange { index: usize, len: usize },
}

pub trait PairedList: Send {
    fn set_items(&mut self, center_ids: &[CenterId]);
    fn scroll_to_index(&mut self, index: usize, view_position: f64) -> Result<(), ScrollError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub animation_duration: Duration,
    pub animation_slack: Duration,
    pub location_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            animation_duration: DEFAULT_ANIMATION_DURATION,
            animation_slack: DEFAULT_SLACK,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    Loading,
    Ready { notice: Option<String> },
}

/// Shared "view is still mounted" flag; results arriving after unmount are
/// discarded instead of applied.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl Default for MountGuard {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl MountGuard {
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct MapController {
    config: ControllerConfig,
    selection: SelectionState,
    gate: AnimationGate,
    region: Region,
    user_location: Option<Coordinates>,
    location_permission: Option<bool>,
    status: ScreenStatus,
    mount: MountGuard,
    surface: Box<dyn MapSurface>,
    list: Box<dyn PairedList>,
}

impl MapController {
    pub fn new(
        directory: Arc<DirectoryStore>,
        surface: Box<dyn MapSurface>,
        list: Box<dyn PairedList>,
        config: ControllerConfig,
    ) -> Self {
        let mut controller = Self {
            config,
            selection: SelectionState::new(directory),
            gate: AnimationGate::new(config.animation_slack),
            region: Region::DEFAULT,
            user_location: None,
            location_permission: None,
            status: ScreenStatus::Loading,
            mount: MountGuard::default(),
            surface,
            list,
        };
        controller.publish_markers();
        controller.publish_list_items();
        controller
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn status(&self) -> &ScreenStatus {
        &self.status
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn filtered_centers(&self) -> &[LearningCenter] {
        self.selection.filtered_centers()
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn location_permission(&self) -> Option<bool> {
        self.location_permission
    }

    pub fn is_animating(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn mount_guard(&self) -> MountGuard {
        self.mount.clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn markers(&self) -> Vec<MarkerSummary> {
        self.selection
            .filtered_centers()
            .iter()
            .map(|center| MarkerSummary {
                center_id: center.id.clone(),
                title: center.name.clone(),
                description: center.address.clone(),
                selected: self.selection.is_selected(&center.id),
            })
            .collect()
    }

    /// One-shot location fix. Denial keeps the default region silently;
    /// failure or timeout keeps it and surfaces a notice.
    pub async fn mount(&mut self, provider: &dyn LocationProvider) {
        if !self.mount.is_mounted() {
            return;
        }
        self.status = ScreenStatus::Loading;

        let fix = acquire_fix(provider, self.config.location_timeout).await;
        if !self.mount.is_mounted() {
            debug!("map unmounted before location fix arrived, discarding");
            return;
        }

        let notice = match fix {
            LocationFix::Acquired(point) => {
                self.location_permission = Some(true);
                self.user_location = Some(point);
                if let Ok(target) = region::user_fix_region(point) {
                    self.animate_region(target);
                }
                None
            }
            LocationFix::Denied => {
                self.location_permission = Some(false);
                None
            }
            LocationFix::Unavailable {
                permission_granted,
                notice,
            } => {
                if permission_granted {
                    self.location_permission = Some(true);
                }
                Some(notice)
            }
        };
        self.status = ScreenStatus::Ready { notice };
    }

    pub fn handle(&mut self, event: MapEvent) -> Result<(), SelectionError> {
        match event {
            MapEvent::MarkerTapped { center_id } => {
                self.on_marker_tap(&center_id)?;
            }
            MapEvent::CardTapped { center_id } => {
                self.on_card_tap(&center_id)?;
            }
            MapEvent::DistrictSelected { district } => {
                self.on_district_selected(district);
            }
            MapEvent::LocateMe => {
                self.go_to_user_location();
            }
            MapEvent::AnimationFinished { generation } => {
                self.on_animation_finished(AnimationTicket::from_generation(generation));
            }
        }
        Ok(())
    }

    pub fn on_marker_tap(&mut self, id: &CenterId) -> Result<TapOutcome, SelectionError> {
        self.select_center(id)
    }

    pub fn on_card_tap(&mut self, id: &CenterId) -> Result<TapOutcome, SelectionError> {
        self.select_center(id)
    }

    pub fn on_district_selected(&mut self, district: Option<String>) -> FilterEffects {
        let effects = self.selection.select_district(district);
        info!(
            district = ?self.selection.selected_district(),
            visible = effects.visible,
            "district filter changed"
        );
        self.publish_list_items();
        self.publish_markers();
        if let Some(framing) = effects.framing {
            self.animate_camera(framing);
        }
        effects
    }

    pub fn go_to_user_location(&mut self) -> Option<GateDecision> {
        let point = self.user_location?;
        let framing = region::frame_single(point).ok()?;
        Some(self.animate_camera(framing))
    }

    pub fn on_animation_finished(&mut self, ticket: AnimationTicket) -> bool {
        self.gate.complete(ticket)
    }

    fn select_center(&mut self, id: &CenterId) -> Result<TapOutcome, SelectionError> {
        let effects = self.selection.select_center(id)?;
        self.publish_markers();
        self.animate_camera(effects.framing);

        if let Some(index) = effects.scroll_to {
            if let Err(err) = self.list.scroll_to_index(index, CENTERED_VIEW_POSITION) {
                debug!(error = %err, center_id = %id, "list scroll skipped");
            }
        }
        Ok(effects.outcome)
    }

    fn animate_camera(&mut self, framing: Framing) -> GateDecision {
        let duration = self.config.animation_duration;
        let surface = &mut self.surface;
        let decision = self.gate.request(duration, |ticket| {
            surface.animate_camera(&framing.camera, duration, ticket);
        });
        if decision.is_admitted() {
            self.region = framing.region;
        }
        decision
    }

    fn animate_region(&mut self, target: Region) -> GateDecision {
        let duration = self.config.animation_duration;
        let surface = &mut self.surface;
        let decision = self.gate.request(duration, |ticket| {
            surface.animate_to_region(&target, duration, ticket);
        });
        if decision.is_admitted() {
            self.region = target;
        }
        decision
    }

    fn publish_markers(&mut self) {
        let markers = self.markers();
        self.surface.show_markers(&markers);
    }

    fn publish_list_items(&mut self) {
        let ids: Vec<CenterId> = self
            .selection
            .filtered_centers()
            .iter()
            .map(|center| center.id.clone())
            .collect();
        self.list.set_items(&ids);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Arc<Mutex<Vec<MapCommand>>>,
    list_len: Arc<Mutex<usize>>,
}

impl CommandRecorder {
    pub fn commands(&self) -> Vec<MapCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn drain(&self) -> Vec<MapCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, command: MapCommand) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

impl MapSurface for CommandRecorder {
    fn animate_to_region(&mut self, region: &Region, duration: Duration, ticket: AnimationTicket) {
        self.push(MapCommand::AnimateToRegion {
            region: *region,
            duration_ms: duration.as_millis() as u64,
            generation: ticket.generation(),
        });
    }

    fn animate_camera(
        &mut self,
        camera: &CameraDescriptor,
        duration: Duration,
        ticket: AnimationTicket,
    ) {
        self.push(MapCommand::AnimateCamera {
            camera: *camera,
            duration_ms: duration.as_millis() as u64,
            generation: ticket.generation(),
        });
    }

    fn show_markers(&mut self, markers: &[MarkerSummary]) {
        self.push(MapCommand::ShowMarkers {
            markers: markers.to_vec(),
        });
    }
}

impl PairedList for CommandRecorder {
    fn set_items(&mut self, center_ids: &[CenterId]) {
        *self.list_len.lock().unwrap_or_else(PoisonError::into_inner) = center_ids.len();
        self.push(MapCommand::SetListItems {
            center_ids: center_ids.to_vec(),
        });
    }

    fn scroll_to_index(&mut self, index: usize, view_position: f64) -> Result<(), ScrollError> {
        let len = *self.list_len.lock().unwrap_or_else(PoisonError::into_inner);
        if index >= len {
            return Err(ScrollError::OutOfRange { index, len });
        }
        self.push(MapCommand::ScrollToIndex {
            index,
            view_position,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/map_controller_tests.rs"]
mod tests;
