//! Visiting order for the selected stops.

use tracing::{info, warn};

use crate::model::Stop;
use crate::traits::RoutingGateway;

/// Orders `picks` using the provider's waypoint optimization.
///
/// Falls back to the input order when the routing call fails or the
/// returned permutation is missing or not a permutation of `0..picks.len()`.
pub fn order_stops<G>(gateway: &G, picks: Vec<Stop>, origin: &Stop, destination: &Stop) -> Vec<Stop>
where
    G: RoutingGateway,
{
    if picks.is_empty() {
        info!("no selected stops to order");
        return picks;
    }

    info!("requesting optimized route through {} waypoints", picks.len());
    let waypoint_order = match gateway.route(origin, destination, &picks) {
        Ok(geometry) => geometry.waypoint_order,
        Err(err) => {
            warn!("waypoint optimization failed, keeping selection order: {}", err);
            return picks;
        }
    };

    match waypoint_order {
        Some(order) if is_permutation(&order, picks.len()) => {
            let ordered: Vec<Stop> = order.iter().map(|&index| picks[index].clone()).collect();
            info!(
                "waypoints ordered by provider: [{}]",
                ordered.iter().map(Stop::name).collect::<Vec<_>>().join(" -> ")
            );
            ordered
        }
        other => {
            warn!(
                "provider returned no usable waypoint order ({:?}), keeping selection order",
                other
            );
            picks
        }
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
