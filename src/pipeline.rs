//! Route stop generation: from an origin/destination pair to an ordered,
//! well-spaced list of bus stops.
//!
//! Stages, in order:
//!
//! 1. fetch the road route and decode its overview polyline (fatal on failure)
//! 2. sample search points along the path, prefixed with the origin
//! 3. gather nearby candidates around every search point in parallel
//! 4. let the [`StopSelector`] choose among them
//! 5. order the picks with the provider's waypoint optimization
//! 6. enforce the minimum spacing between consecutive stops
//!
//! Only stage 1 can fail. Later stages degrade to fewer (possibly zero)
//! intermediate stops, so a successful run always starts with the origin and
//! ends with the destination.

use tracing::{error, info};

use crate::config::PlannerOptions;
use crate::error::{ConfigError, PipelineError};
use crate::gather::gather_candidates;
use crate::model::{GeoPoint, Stop};
use crate::order::order_stops;
use crate::polyline::Polyline;
use crate::sampler::sample_along;
use crate::separation::filter_by_separation;
use crate::traits::{RoutingGateway, StopSelector};

#[derive(Debug, Clone)]
pub struct RouteStopPlanner<G, S> {
    gateway: G,
    selector: S,
    options: PlannerOptions,
}

impl<G, S> RouteStopPlanner<G, S>
where
    G: RoutingGateway + Sync,
    S: StopSelector,
{
    /// Rejects `options` that fail [`PlannerOptions::validate`].
    pub fn new(gateway: G, selector: S, options: PlannerOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            gateway,
            selector,
            options,
        })
    }

    /// Generates `[origin, ..intermediate stops.., destination]`.
    #[tracing::instrument(skip_all, fields(origin = origin.name(), destination = destination.name()))]
    pub fn generate(&self, origin: &Stop, destination: &Stop) -> Result<Vec<Stop>, PipelineError> {
        info!("starting route stop generation");

        let path = self.decoded_route(origin, destination)?;
        let search_points = self.search_points(&path, origin);

        let candidates =
            gather_candidates(&self.gateway, &search_points, origin, destination, &self.options);

        info!("requesting stop selection");
        let picks = self.selector.select(origin, destination, &candidates);
        info!("selection returned {} picks", picks.len());

        let ordered = order_stops(&self.gateway, picks, origin, destination);
        let intermediate =
            filter_by_separation(ordered, origin, destination, self.options.min_separation_m);

        let mut stops = Vec::with_capacity(intermediate.len() + 2);
        stops.push(origin.clone());
        stops.extend(intermediate);
        stops.push(destination.clone());

        info!("final stop list has {} stops", stops.len());
        for (i, stop) in stops.iter().enumerate() {
            let location = stop.location();
            info!(
                "  {}. {} ({:.6}, {:.6})",
                i + 1,
                stop.name(),
                location.lat,
                location.lng
            );
        }

        Ok(stops)
    }

    fn decoded_route(&self, origin: &Stop, destination: &Stop) -> Result<Polyline, PipelineError> {
        info!("fetching initial route");
        let geometry = self.gateway.route(origin, destination, &[]).map_err(|err| {
            error!("could not fetch initial route: {}", err);
            PipelineError::from(err)
        })?;

        let Some(encoded) = geometry.encoded_path else {
            error!("route has no overview polyline");
            return Err(PipelineError::MissingGeometry);
        };
        info!("route polyline received ({} chars), decoding", encoded.len());

        let path = Polyline::decode(&encoded).map_err(|err| {
            error!("failed to decode route polyline: {}", err);
            PipelineError::from(err)
        })?;
        if path.is_empty() {
            error!("decoded route polyline has no points");
            return Err(PipelineError::EmptyPath);
        }

        info!("polyline decoded into {} points", path.len());
        Ok(path)
    }

    fn search_points(&self, path: &Polyline, origin: &Stop) -> Vec<GeoPoint> {
        info!("sampling route every {}m", self.options.sample_interval_m);
        let mut points = vec![origin.location()];
        points.extend(sample_along(path, self.options.sample_interval_m));
        points
    }
}
