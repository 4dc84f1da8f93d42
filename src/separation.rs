//! Minimum spacing between consecutive stops.

use tracing::{debug, info};

use crate::haversine::distance_m;
use crate::model::Stop;

/// Greedy forward scan over `ordered`.
///
/// A stop is kept when it is at least `min_separation_m` from the last kept
/// position (initially the origin) and from the destination. Discarded stops
/// are never reconsidered, so the result depends on the incoming order.
pub fn filter_by_separation(
    ordered: Vec<Stop>,
    origin: &Stop,
    destination: &Stop,
    min_separation_m: f64,
) -> Vec<Stop> {
    if ordered.is_empty() {
        return ordered;
    }

    let destination_point = destination.location();
    let mut last_kept = origin.location();
    let mut kept = Vec::with_capacity(ordered.len());

    for stop in ordered {
        let point = stop.location();
        let from_last = distance_m(last_kept, point);
        let to_destination = distance_m(point, destination_point);

        if from_last >= min_separation_m && to_destination >= min_separation_m {
            debug!(
                "keeping stop {:?} ({:.0}m from last kept, {:.0}m to destination)",
                stop.name(),
                from_last,
                to_destination
            );
            last_kept = point;
            kept.push(stop);
        } else {
            info!(
                "filtering out stop {:?}: {:.0}m from last kept, {:.0}m to destination, minimum {:.0}m",
                stop.name(),
                from_last,
                to_destination,
                min_separation_m
            );
        }
    }

    info!("kept {} intermediate stops after spacing filter", kept.len());
    kept
}
