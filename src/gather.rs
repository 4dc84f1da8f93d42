//! Candidate gathering: nearby searches fanned out over route sample points.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::PlannerOptions;
use crate::haversine::distance_m;
use crate::model::{Candidate, GeoPoint, Stop};
use crate::traits::RoutingGateway;

/// Drops search points that coincide to 5 decimal places, keeping the first.
pub fn unique_search_points(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut seen = HashSet::new();
    points
        .iter()
        .filter(|point| seen.insert(point.rounded_key()))
        .copied()
        .collect()
}

/// Runs one nearby search per unique search point and merges the results.
///
/// Searches run in parallel on the rayon pool and are all joined before any
/// merging happens. A candidate is kept the first time its place id is seen,
/// provided it lies strictly farther than `min_separation_m` from both the
/// origin and the destination. The origin and destination ids are never
/// returned.
pub fn gather_candidates<G>(
    gateway: &G,
    search_points: &[GeoPoint],
    origin: &Stop,
    destination: &Stop,
    options: &PlannerOptions,
) -> Vec<Candidate>
where
    G: RoutingGateway + Sync,
{
    let points = unique_search_points(search_points);
    info!(
        "gathering candidates around {} unique search points ({} requested)",
        points.len(),
        search_points.len()
    );

    let per_point: Vec<Vec<Candidate>> = points
        .par_iter()
        .enumerate()
        .map(|(index, point)| {
            let results =
                gateway.find_nearby(*point, options.search_radius_m, &options.category_keywords);
            debug!(
                "search point {}/{} ({:.4},{:.4}) yielded {} raw candidates",
                index + 1,
                points.len(),
                point.lat,
                point.lng,
                results.len()
            );
            results
        })
        .collect();

    let kept = merge_candidates(per_point, origin, destination, options.min_separation_m);
    info!("collected {} unique, pre-filtered candidates", kept.len());
    kept
}

fn merge_candidates(
    per_point: Vec<Vec<Candidate>>,
    origin: &Stop,
    destination: &Stop,
    min_separation_m: f64,
) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(origin.place_id().to_string());
    seen.insert(destination.place_id().to_string());

    let mut kept = Vec::new();
    for candidate in per_point.into_iter().flatten() {
        if seen.contains(candidate.place_id()) {
            continue;
        }

        let from_origin = distance_m(origin.location(), candidate.location());
        let from_destination = distance_m(destination.location(), candidate.location());
        if from_origin > min_separation_m && from_destination > min_separation_m {
            seen.insert(candidate.place_id().to_string());
            kept.push(candidate);
        } else {
            debug!(
                "dropping candidate {:?} ({}): {:.0}m from origin, {:.0}m from destination",
                candidate.stop.name(),
                candidate.place_id(),
                from_origin,
                from_destination
            );
        }
    }

    kept
}
