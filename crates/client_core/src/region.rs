use shared::domain::{CameraDescriptor, Coordinates, Region};
use thiserror::Error;

pub const MIN_ZOOM: u8 = 10;
pub const MAX_ZOOM: u8 = 14;
pub const MIN_DELTA: f64 = 0.02;
pub const SPREAD_MARGIN: f64 = 1.5;

pub const CLOSE_UP_DELTA: f64 = 0.02;
pub const CLOSE_UP_ZOOM: u8 = 15;
pub const CLOSE_UP_PITCH: f64 = 25.0;

pub const USER_FIX_DELTA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("cannot frame an empty point set")]
    EmptyPointSet,
    #[error("point set contains non-finite coordinates")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub region: Region,
    pub camera: CameraDescriptor,
}

impl Framing {
    pub fn zoom(&self) -> u8 {
        self.camera.zoom
    }
}

/// Frames every point with margin. Fails on empty or non-finite input.
pub fn frame_points<I>(points: I) -> Result<Framing, RegionError>
where
    I: IntoIterator<Item = Coordinates>,
{
    let mut count = 0usize;
    let (mut lat_sum, mut lng_sum) = (0.0f64, 0.0f64);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);

    for point in points {
        if !point.is_finite() {
            return Err(RegionError::NonFinite);
        }
        count += 1;
        lat_sum += point.latitude;
        lng_sum += point.longitude;
        min_lat = min_lat.min(point.latitude);
        max_lat = max_lat.max(point.latitude);
        min_lng = min_lng.min(point.longitude);
        max_lng = max_lng.max(point.longitude);
    }

    if count == 0 {
        return Err(RegionError::EmptyPointSet);
    }

    let center = Coordinates::new(lat_sum / count as f64, lng_sum / count as f64);
    let lat_distance = max_lat - min_lat;
    let lng_distance = max_lng - min_lng;

    Ok(Framing {
        region: Region {
            latitude: center.latitude,
            longitude: center.longitude,
            latitude_delta: (lat_distance * SPREAD_MARGIN).max(MIN_DELTA),
            longitude_delta: (lng_distance * SPREAD_MARGIN).max(MIN_DELTA),
        },
        camera: CameraDescriptor {
            center,
            zoom: zoom_for_spread(lat_distance.max(lng_distance)),
            pitch: 0.0,
            heading: 0.0,
        },
    })
}

/// `clamp(floor(14 - log2(spread * 100)), 10, 14)`.
///
/// A zero spread gives `log2(0) = -inf`, which saturates to the ceiling.
pub fn zoom_for_spread(spread: f64) -> u8 {
    let raw = (f64::from(MAX_ZOOM) - (spread * 100.0).log2()).floor();
    if raw.is_nan() {
        return MAX_ZOOM;
    }
    raw.clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8
}

pub fn frame_single(point: Coordinates) -> Result<Framing, RegionError> {
    if !point.is_finite() {
        return Err(RegionError::NonFinite);
    }
    Ok(Framing {
        region: Region {
            latitude: point.latitude,
            longitude: point.longitude,
            latitude_delta: CLOSE_UP_DELTA,
            longitude_delta: CLOSE_UP_DELTA,
        },
        camera: CameraDescriptor {
            center: point,
            zoom: CLOSE_UP_ZOOM,
            pitch: CLOSE_UP_PITCH,
            heading: 0.0,
        },
    })
}

pub fn user_fix_region(point: Coordinates) -> Result<Region, RegionError> {
    if !point.is_finite() {
        return Err(RegionError::NonFinite);
    }
    Ok(Region {
        latitude: point.latitude,
        longitude: point.longitude,
        latitude_delta: USER_FIX_DELTA,
        longitude_delta: USER_FIX_DELTA,
    })
}

#[cfg(test)]
#[path = "tests/region_tests.rs"]
mod tests;
