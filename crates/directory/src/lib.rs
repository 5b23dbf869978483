use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use shared::domain::{CenterId, LearningCenter};
use thiserror::Error;
use tracing::debug;

const REFERENCE_DATASET: &str = include_str!("../data/learning_centers.json");

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read directory file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed directory data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("record {index} has an empty id")]
    MissingId { index: usize },
    #[error("duplicate center id {id}")]
    DuplicateId { id: CenterId },
    #[error("center {id} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        id: CenterId,
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    centers: Vec<LearningCenter>,
    districts: Vec<String>,
}

impl DirectoryStore {
    /// The dataset shipped with the application.
    pub fn reference() -> Result<Self, DirectoryError> {
        Self::from_json(REFERENCE_DATASET)
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DirectoryError> {
        let centers: Vec<LearningCenter> = serde_json::from_str(raw)?;
        Self::from_centers(centers)
    }

    pub fn from_centers(centers: Vec<LearningCenter>) -> Result<Self, DirectoryError> {
        let mut seen = HashSet::new();
        let mut districts: Vec<String> = Vec::new();
        let mut validated = Vec::with_capacity(centers.len());

        for (index, mut center) in centers.into_iter().enumerate() {
            if center.id.as_str().trim().is_empty() {
                return Err(DirectoryError::MissingId { index });
            }
            if !seen.insert(center.id.clone()) {
                return Err(DirectoryError::DuplicateId { id: center.id });
            }
            let coords = center.coordinates;
            if !coords.is_finite()
                || !(-90.0..=90.0).contains(&coords.latitude)
                || !(-180.0..=180.0).contains(&coords.longitude)
            {
                return Err(DirectoryError::InvalidCoordinates {
                    id: center.id,
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                });
            }
            center.contact = center.contact.normalized();
            if !districts.iter().any(|d| d == &center.district) {
                districts.push(center.district.clone());
            }
            validated.push(center);
        }

        debug!(
            centers = validated.len(),
            districts = districts.len(),
            "directory loaded"
        );
        Ok(Self {
            centers: validated,
            districts,
        })
    }

    pub fn all(&self) -> &[LearningCenter] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn get(&self, id: &CenterId) -> Option<&LearningCenter> {
        self.centers.iter().find(|center| &center.id == id)
    }

    /// Districts in first-appearance order.
    pub fn districts(&self) -> &[String] {
        &self.districts
    }

    pub fn has_district(&self, district: &str) -> bool {
        self.districts.iter().any(|d| d == district)
    }

    /// Centers in `district`, or every center when `district` is `None`.
    /// Keeps directory insertion order.
    pub fn filter_by_district(&self, district: Option<&str>) -> Vec<LearningCenter> {
        match district {
            Some(district) => self
                .centers
                .iter()
                .filter(|center| center.district == district)
                .cloned()
                .collect(),
            None => self.centers.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
