//! Request-scoped value types shared by every pipeline stage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::StopError;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Key used to collapse points that agree to 5 decimal places (~1.1 m).
    pub fn rounded_key(&self) -> String {
        format!("{:.5},{:.5}", self.lat, self.lng)
    }
}

/// A named place on a route.
///
/// Identity is the provider's `place_id`: two stops with the same id are the
/// same place even if their names or coordinates differ slightly. Serializes
/// to `{name, lat, lng, placeId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStop", rename_all = "camelCase")]
pub struct Stop {
    name: String,
    lat: f64,
    lng: f64,
    place_id: String,
}

impl Stop {
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        place_id: impl Into<String>,
    ) -> Result<Self, StopError> {
        let name = name.into();
        let place_id = place_id.into();

        if name.trim().is_empty() {
            return Err(StopError::EmptyName);
        }
        if place_id.trim().is_empty() {
            return Err(StopError::EmptyPlaceId);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(StopError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(StopError::LongitudeOutOfRange(lng));
        }

        Ok(Self {
            name,
            lat,
            lng,
            place_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn place_id(&self) -> &str {
        &self.place_id
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStop {
    name: String,
    lat: f64,
    lng: f64,
    place_id: String,
}

impl TryFrom<RawStop> for Stop {
    type Error = StopError;

    fn try_from(raw: RawStop) -> Result<Self, Self::Error> {
        Stop::new(raw.name, raw.lat, raw.lng, raw.place_id)
    }
}

/// A point of interest returned by a nearby search, pending selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub stop: Stop,
    /// Provider category tags, e.g. `bus_station`, `park`.
    pub types: BTreeSet<String>,
    pub rating: Option<f64>,
    /// Neighbourhood or street label.
    pub vicinity: Option<String>,
}

impl Candidate {
    pub fn new(stop: Stop) -> Self {
        Self {
            stop,
            types: BTreeSet::new(),
            rating: None,
            vicinity: None,
        }
    }

    pub fn place_id(&self) -> &str {
        self.stop.place_id()
    }

    pub fn location(&self) -> GeoPoint {
        self.stop.location()
    }
}

/// One leg of a routed trip between two consecutive visited places.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

/// Result of a routing request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteGeometry {
    /// Overview geometry in the 5-digit polyline format, when the provider sent one.
    pub encoded_path: Option<String>,
    pub legs: Vec<RouteLeg>,
    /// `waypoint_order[i]` is the requested-waypoint index visited at position `i`.
    pub waypoint_order: Option<Vec<usize>>,
}
