//! Uniform arc-length sampling along a decoded route.

use crate::haversine::distance_m;
use crate::model::GeoPoint;
use crate::polyline::Polyline;

/// Samples closer than this fraction of the interval to the previous one are dropped.
const MIN_SPACING_FRACTION: f64 = 0.1;

/// Walks `path` and emits a point every `interval_m` meters of travelled
/// distance, starting with the first path point.
///
/// Points are linearly interpolated in lat/lng within each segment, which is
/// accurate enough for the short segments of a road polyline. A sample that
/// lands within `0.1 * interval_m` of the previously emitted one is skipped so
/// that segment-boundary rounding does not produce near-duplicates.
pub fn sample_along(path: &Polyline, interval_m: f64) -> Vec<GeoPoint> {
    let points = path.points();
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if points.len() == 1 || !(interval_m > 0.0) {
        return vec![first];
    }

    let min_spacing = interval_m * MIN_SPACING_FRACTION;
    let mut samples = vec![first];
    let mut last_sample = first;
    let mut accumulated = 0.0;

    for pair in points.windows(2) {
        let mut start = pair[0];
        let end = pair[1];
        let mut remaining_segment = distance_m(start, end);

        while accumulated + remaining_segment >= interval_m {
            let needed = interval_m - accumulated;
            let fraction = if remaining_segment == 0.0 {
                0.0
            } else {
                needed / remaining_segment
            };
            let sample = interpolate(start, end, fraction);

            if distance_m(last_sample, sample) > min_spacing {
                samples.push(sample);
                last_sample = sample;
            }

            remaining_segment -= needed;
            accumulated = 0.0;
            start = sample;
        }

        accumulated += remaining_segment;
    }

    samples
}

fn interpolate(from: GeoPoint, to: GeoPoint, fraction: f64) -> GeoPoint {
    GeoPoint::new(
        from.lat + (to.lat - from.lat) * fraction,
        from.lng + (to.lng - from.lng) * fraction,
    )
}
