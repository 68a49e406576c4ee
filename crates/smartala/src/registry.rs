//! In-memory registry of saved places.
//!
//! Records are keyed by a short content-derived identifier, so saving the
//! same name at the same coordinate twice lands on the same key and the
//! later record replaces the earlier one. Every successful lookup bumps a
//! hit counter. All mutation goes through one mutex; each operation is a
//! single critical section, so concurrent increments are never lost.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::{Coordinate, RawCoordinate};

/// Name used when the client supplies none.
pub const DEFAULT_NAME: &str = "Unnamed location";

/// Category used when the client supplies none.
pub const DEFAULT_CATEGORY: &str = "general";

/// Length of a location identifier in hex characters.
pub const ID_LEN: usize = 8;

/// A saved, named place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    /// Content-derived identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Category such as `general`, `home`, `work`.
    pub category: String,
    /// Position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// When the record was saved.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Opaque client identifier, typically the peer address.
    pub created_by: String,
    /// Number of successful lookups.
    pub access_count: u64,
}

/// Listing view of a [`SavedLocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    /// Content-derived identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// When the record was saved.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Number of successful lookups.
    pub access_count: u64,
}

impl From<&SavedLocation> for LocationSummary {
    fn from(location: &SavedLocation) -> Self {
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
            description: location.description.clone(),
            category: location.category.clone(),
            coordinate: location.coordinate,
            created_at: location.created_at,
            access_count: location.access_count,
        }
    }
}

/// Input for [`LocationRegistry::save`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    /// Position as sent by the client.
    #[serde(default)]
    pub location: Option<RawCoordinate>,
    /// Display name; blank means [`DEFAULT_NAME`].
    #[serde(default)]
    pub name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category; blank means [`DEFAULT_CATEGORY`].
    #[serde(default)]
    pub category: Option<String>,
}

impl NewLocation {
    /// Convenience constructor for a named point.
    #[must_use]
    pub fn at(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            location: Some(RawCoordinate::from_degrees(lat, lng)),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Compute the identifier for a name at a coordinate.
///
/// First eight hex characters of the BLAKE3 digest of latitude, longitude
/// and name concatenated. A short opaque token, not a security boundary.
#[must_use]
pub fn location_id(coordinate: Coordinate, name: &str) -> String {
    let key = format!("{}{}{}", coordinate.latitude(), coordinate.longitude(), name);
    let mut hex = blake3::hash(key.as_bytes()).to_hex().to_string();
    hex.truncate(ID_LEN);
    hex
}

fn non_blank(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Thread-safe registry of saved locations.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    locations: Mutex<HashMap<String, SavedLocation>>,
}

impl LocationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SavedLocation>> {
        // each critical section is a single map operation, so a panic
        // elsewhere cannot leave a half-written record behind
        self.locations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and store a location, replacing any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the coordinate is missing or
    /// malformed. The registry is left untouched in that case.
    pub fn save(&self, request: &NewLocation, client_origin: &str) -> Result<SavedLocation> {
        let coordinate = request
            .location
            .as_ref()
            .ok_or_else(|| Error::validation("missing location"))?
            .validate()?;

        let name = non_blank(request.name.as_deref(), DEFAULT_NAME);
        let id = location_id(coordinate, &name);
        let record = SavedLocation {
            id: id.clone(),
            name,
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            category: non_blank(request.category.as_deref(), DEFAULT_CATEGORY),
            coordinate,
            created_at: Utc::now(),
            created_by: client_origin.to_string(),
            access_count: 0,
        };

        let replaced = self.lock().insert(id.clone(), record.clone()).is_some();
        info!(
            id = %id,
            name = %record.name,
            coordinate = %coordinate,
            replaced,
            "saved location"
        );
        Ok(record)
    }

    /// Look up a location and count the access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id.
    pub fn get(&self, id: &str) -> Result<SavedLocation> {
        let mut locations = self.lock();
        let location = locations.get_mut(id).ok_or_else(|| Error::not_found(id))?;
        location.access_count += 1;
        debug!(id, access_count = location.access_count, "resolved location");
        Ok(location.clone())
    }

    /// Look up a location without counting the access.
    #[must_use]
    pub fn peek(&self, id: &str) -> Option<SavedLocation> {
        self.lock().get(id).cloned()
    }

    /// All locations, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<LocationSummary> {
        let mut summaries: Vec<LocationSummary> =
            self.lock().values().map(LocationSummary::from).collect();
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    /// Number of saved locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
