//! Google Maps adapter: Directions for routing, Places Nearby Search for candidates.

use serde::Deserialize;
use tracing::warn;

use crate::config::GOOGLE_MAPS_API_KEY;
use crate::error::{ConfigError, GatewayError};
use crate::model::{Candidate, GeoPoint, RouteGeometry, RouteLeg, Stop};
use crate::traits::RoutingGateway;

#[derive(Clone)]
pub struct GoogleMapsConfig {
    pub api_key: String,
    pub base_url: String,
    /// ccTLD region bias for directions, e.g. "VE".
    pub region: String,
    pub timeout_secs: u64,
}

impl GoogleMapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://maps.googleapis.com".to_string(),
            region: "VE".to_string(),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::Missing(GOOGLE_MAPS_API_KEY));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn directions(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<DirectionsResponse, GatewayError> {
        let url = format!("{}/maps/api/directions/json", self.config.base_url);

        let mut query = vec![
            ("origin", place_param(origin)),
            ("destination", place_param(destination)),
            ("key", self.config.api_key.clone()),
            ("region", self.config.region.clone()),
        ];
        if let Some(waypoints) = waypoints_param(waypoints) {
            query.push(("waypoints", waypoints));
        }

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())?
            .json::<DirectionsResponse>()?;

        Ok(response)
    }

    fn nearby_search(
        &self,
        point: GeoPoint,
        radius_m: f64,
        keywords: &str,
    ) -> Result<Vec<Candidate>, GatewayError> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.config.base_url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("location", format!("{},{}", point.lat, point.lng)),
                ("radius", format!("{:.0}", radius_m)),
                ("keyword", keywords.to_string()),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())?
            .json::<NearbyResponse>()?;

        response.into_candidates()
    }
}

impl RoutingGateway for GoogleMapsClient {
    #[tracing::instrument(skip_all, fields(origin = origin.name(), destination = destination.name(), waypoints = waypoints.len()))]
    fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteGeometry, GatewayError> {
        self.directions(origin, destination, waypoints)?.into_geometry()
    }

    fn find_nearby(&self, point: GeoPoint, radius_m: f64, keywords: &str) -> Vec<Candidate> {
        match self.nearby_search(point, radius_m, keywords) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    "nearby search at ({:.5},{:.5}) failed, treating as no results: {}",
                    point.lat, point.lng, err
                );
                Vec::new()
            }
        }
    }
}

fn place_param(stop: &Stop) -> String {
    format!("place_id:{}", stop.place_id())
}

fn waypoints_param(waypoints: &[Stop]) -> Option<String> {
    if waypoints.is_empty() {
        return None;
    }
    let places = waypoints.iter().map(place_param).collect::<Vec<_>>().join("|");
    Some(format!("optimize:true|{}", places))
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: Option<EncodedPolyline>,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    waypoint_order: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    start_location: LatLng,
    end_location: LatLng,
    distance: Option<Measured>,
    duration: Option<Measured>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(value: LatLng) -> Self {
        GeoPoint::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
struct Measured {
    value: f64,
}

impl DirectionsResponse {
    fn into_geometry(self) -> Result<RouteGeometry, GatewayError> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => {
                return Err(GatewayError::RouteNotFound {
                    status: self.status.clone(),
                });
            }
            _ => {
                return Err(GatewayError::Upstream(format!(
                    "Directions API status {}: {}",
                    self.status,
                    self.error_message.unwrap_or_default()
                )));
            }
        }

        let Some(route) = self.routes.into_iter().next() else {
            return Err(GatewayError::RouteNotFound { status: self.status });
        };

        Ok(RouteGeometry {
            encoded_path: route
                .overview_polyline
                .map(|polyline| polyline.points)
                .filter(|points| !points.is_empty()),
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    start: leg.start_location.into(),
                    end: leg.end_location.into(),
                    distance_m: leg.distance.map(|d| d.value),
                    duration_s: leg.duration.map(|d| d.value),
                })
                .collect(),
            waypoint_order: route.waypoint_order,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: Option<String>,
    place_id: Option<String>,
    geometry: Option<PlaceGeometry>,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f64>,
    vicinity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

impl NearbyResponse {
    fn into_candidates(self) -> Result<Vec<Candidate>, GatewayError> {
        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().filter_map(PlaceResult::into_candidate).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(GatewayError::Upstream(format!(
                "Places API status {}: {}",
                self.status,
                self.error_message.unwrap_or_default()
            ))),
        }
    }
}

impl PlaceResult {
    fn into_candidate(self) -> Option<Candidate> {
        let location = self.geometry?.location;
        let stop = Stop::new(self.name?, location.lat, location.lng, self.place_id?).ok()?;
        Some(Candidate {
            stop,
            types: self.types.into_iter().collect(),
            rating: self.rating,
            vicinity: self.vicinity,
        })
    }
}
