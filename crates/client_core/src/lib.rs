pub mod animation_gate;
pub mod auth;
pub mod blog;
pub mod links;
pub mod location;
pub mod map_controller;
pub mod region;
pub mod resources;
pub mod selection;

pub use animation_gate::{AnimationGate, AnimationTicket, GateDecision};
pub use auth::{AuthBackend, AuthError, AuthSession, MemorySessionStore, SessionStore};
pub use blog::{BlogAggregator, FeedError, FeedSource};
pub use location::{LocationFix, LocationProvider};
pub use map_controller::{
    CommandRecorder, ControllerConfig, MapController, MapSurface, MountGuard, PairedList,
    ScreenStatus,
};
pub use region::{Framing, RegionError};
pub use selection::{SelectionError, SelectionState, TapOutcome};
