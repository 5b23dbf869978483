use std::{future::Future, time::Duration};

use async_trait::async_trait;
use shared::domain::Coordinates;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const LOCATION_UNAVAILABLE_NOTICE: &str =
    "Unable to get your current location. Showing default map view.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location provider failed: {0}")]
    Provider(String),
    #[error("location fix timed out after {0:?}")]
    TimedOut(Duration),
    #[error("location fix has non-finite coordinates")]
    InvalidFix,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError>;
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(PermissionStatus::Granted)
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(PermissionStatus::Denied)
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Provider("permission not granted".into()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationFix {
    Acquired(Coordinates),
    Denied,
    /// `permission_granted` is true when only the position request failed.
    Unavailable {
        permission_granted: bool,
        notice: String,
    },
}

/// Permission request plus one-shot fix, bounded by `timeout` as a whole.
/// Never fails: every error degrades to `Denied` or `Unavailable`.
pub async fn acquire_fix(provider: &dyn LocationProvider, timeout: Duration) -> LocationFix {
    let deadline = Instant::now() + timeout;

    let permission = match bounded(deadline, timeout, provider.request_permission()).await {
        Ok(permission) => permission,
        Err(err) => return unavailable(false, err),
    };
    if permission == PermissionStatus::Denied {
        info!("location permission denied, keeping default region");
        return LocationFix::Denied;
    }

    let fix = bounded(deadline, timeout, provider.current_position())
        .await
        .and_then(|fix| {
            if fix.is_finite() {
                Ok(fix)
            } else {
                Err(LocationError::InvalidFix)
            }
        });
    match fix {
        Ok(fix) => {
            info!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                "location fix acquired"
            );
            LocationFix::Acquired(fix)
        }
        Err(err) => unavailable(true, err),
    }
}

async fn bounded<T, F>(deadline: Instant, timeout: Duration, request: F) -> Result<T, LocationError>
where
    F: Future<Output = Result<T, LocationError>>,
{
    tokio::time::timeout_at(deadline, request)
        .await
        .unwrap_or(Err(LocationError::TimedOut(timeout)))
}

fn unavailable(permission_granted: bool, err: LocationError) -> LocationFix {
    warn!(error = %err, permission_granted, "location unavailable, keeping default region");
    LocationFix::Unavailable {
        permission_granted,
        notice: LOCATION_UNAVAILABLE_NOTICE.to_string(),
    }
}
