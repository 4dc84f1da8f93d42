//! Deterministic stop selection without an AI provider.

use crate::model::{Candidate, Stop};
use crate::traits::StopSelector;

/// Picks the best-rated candidates, up to `max_stops`.
///
/// Unrated candidates rank below every rated one; ties keep gathering order.
#[derive(Debug, Clone)]
pub struct RatedSelector {
    pub max_stops: usize,
}

impl RatedSelector {
    pub fn new(max_stops: usize) -> Self {
        Self { max_stops }
    }
}

impl StopSelector for RatedSelector {
    fn select(&self, _origin: &Stop, _destination: &Stop, candidates: &[Candidate]) -> Vec<Stop> {
        let mut ranked: Vec<&Candidate> = candidates.iter().collect();
        // Stable sort keeps input order among equal ratings.
        ranked.sort_by(|a, b| {
            let a = a.rating.unwrap_or(f64::NEG_INFINITY);
            let b = b.rating.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });

        ranked
            .into_iter()
            .take(self.max_stops)
            .map(|candidate| candidate.stop.clone())
            .collect()
    }
}
