//! Contracts for the external collaborators of the stop pipeline.
//!
//! The pipeline only talks to providers through these traits so that tests
//! can swap in deterministic fakes for the mapping service and for the
//! (non-deterministic) AI selection step.

use crate::error::GatewayError;
use crate::model::{Candidate, GeoPoint, RouteGeometry, Stop};

/// Road routing and place search.
pub trait RoutingGateway {
    /// Route from `origin` to `destination` through `waypoints`.
    ///
    /// With a non-empty `waypoints` slice the provider is asked to optimize
    /// the visiting order and may report it in
    /// [`RouteGeometry::waypoint_order`].
    fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteGeometry, GatewayError>;

    /// Places matching `keywords` within `radius_m` of `point`.
    ///
    /// Must not fail: provider errors are reported by the implementation and
    /// surface here as an empty list.
    fn find_nearby(&self, point: GeoPoint, radius_m: f64, keywords: &str) -> Vec<Candidate>;
}

/// Picks the stops worth serving out of the gathered candidates.
pub trait StopSelector {
    /// Returns a subset of `candidates` as plain stops, expected to hold
    /// between the configured minimum and maximum count. Any failure of the
    /// selection mechanism yields an empty list.
    fn select(&self, origin: &Stop, destination: &Stop, candidates: &[Candidate]) -> Vec<Stop>;
}
