//! End-to-end pipeline tests against deterministic fake providers.

mod fixtures;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use route_stops::config::PlannerOptions;
use route_stops::haversine::distance_m;
use route_stops::polyline::Polyline;
use route_stops::selector::RatedSelector;
use route_stops::traits::{RoutingGateway, StopSelector};
use route_stops::{Candidate, GatewayError, GeoPoint, PipelineError, RouteGeometry, RouteStopPlanner, Stop};

use fixtures::{CORRIDOR, PETARE, PLAZA_BOLIVAR, Place, corridor_path};

// ============================================================================
// Fake providers
// ============================================================================

/// How the fake answers a waypoint-optimized routing request.
#[derive(Clone)]
enum WaypointReply {
    /// Route found, no visiting order reported.
    NoOrder,
    /// Visit waypoints from west to east.
    WestToEast,
    /// Fixed permutation, whatever the waypoints are.
    Fixed(Vec<usize>),
    Fail,
}

struct FakeGateway {
    initial: Result<RouteGeometry, GatewayError>,
    waypoints: WaypointReply,
    /// Places the nearby search can find, filtered by radius unless `everywhere`.
    catalog: Vec<Candidate>,
    everywhere: bool,
    route_calls: Mutex<Vec<Vec<String>>>,
    nearby_calls: AtomicUsize,
}

impl FakeGateway {
    fn with_path(path: &Polyline) -> Self {
        Self {
            initial: Ok(RouteGeometry {
                encoded_path: Some(path.encode()),
                ..RouteGeometry::default()
            }),
            waypoints: WaypointReply::NoOrder,
            catalog: Vec::new(),
            everywhere: false,
            route_calls: Mutex::new(Vec::new()),
            nearby_calls: AtomicUsize::new(0),
        }
    }

    fn failing(err: GatewayError) -> Self {
        Self {
            initial: Err(err),
            ..Self::with_path(&Polyline::new(vec![]))
        }
    }

    fn catalog(mut self, places: &[Place]) -> Self {
        self.catalog = places.iter().map(Place::candidate).collect();
        self
    }

    fn candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.catalog = candidates;
        self.everywhere = true;
        self
    }

    fn waypoints(mut self, reply: WaypointReply) -> Self {
        self.waypoints = reply;
        self
    }

    fn route_call_count(&self) -> usize {
        self.route_calls.lock().unwrap().len()
    }

    fn nearby_call_count(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }
}

impl RoutingGateway for FakeGateway {
    fn route(
        &self,
        _origin: &Stop,
        _destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteGeometry, GatewayError> {
        self.route_calls
            .lock()
            .unwrap()
            .push(waypoints.iter().map(|s| s.place_id().to_string()).collect());

        if waypoints.is_empty() {
            return self.initial.clone();
        }

        let waypoint_order = match &self.waypoints {
            WaypointReply::NoOrder => None,
            WaypointReply::WestToEast => {
                let mut order: Vec<usize> = (0..waypoints.len()).collect();
                order.sort_by(|&a, &b| {
                    waypoints[a]
                        .location()
                        .lng
                        .total_cmp(&waypoints[b].location().lng)
                });
                Some(order)
            }
            WaypointReply::Fixed(order) => Some(order.clone()),
            WaypointReply::Fail => {
                return Err(GatewayError::Upstream("MAX_WAYPOINTS_EXCEEDED".to_string()));
            }
        };

        Ok(RouteGeometry {
            encoded_path: Some(corridor_path().encode()),
            legs: Vec::new(),
            waypoint_order,
        })
    }

    fn find_nearby(&self, point: GeoPoint, radius_m: f64, _keywords: &str) -> Vec<Candidate> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        self.catalog
            .iter()
            .filter(|c| self.everywhere || distance_m(point, c.location()) <= radius_m)
            .cloned()
            .collect()
    }
}

/// Returns every candidate, in the order received.
struct TakeAll;

impl StopSelector for TakeAll {
    fn select(&self, _: &Stop, _: &Stop, candidates: &[Candidate]) -> Vec<Stop> {
        candidates.iter().map(|c| c.stop.clone()).collect()
    }
}

/// Returns a fixed list and counts invocations.
struct Scripted {
    picks: Vec<Stop>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(picks: Vec<Stop>) -> Self {
        Self {
            picks,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StopSelector for Scripted {
    fn select(&self, _: &Stop, _: &Stop, _: &[Candidate]) -> Vec<Stop> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.picks.clone()
    }
}

impl StopSelector for &Scripted {
    fn select(&self, origin: &Stop, destination: &Stop, candidates: &[Candidate]) -> Vec<Stop> {
        (**self).select(origin, destination, candidates)
    }
}

impl RoutingGateway for &FakeGateway {
    fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteGeometry, GatewayError> {
        (**self).route(origin, destination, waypoints)
    }

    fn find_nearby(&self, point: GeoPoint, radius_m: f64, keywords: &str) -> Vec<Candidate> {
        (**self).find_nearby(point, radius_m, keywords)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn stop(name: &str, lat: f64, lng: f64) -> Stop {
    Stop::new(name, lat, lng, format!("id-{}", name)).unwrap()
}

fn ids(stops: &[Stop]) -> Vec<&str> {
    stops.iter().map(Stop::place_id).collect()
}

fn assert_well_formed(stops: &[Stop], origin: &Stop, destination: &Stop, min_separation_m: f64) {
    assert!(stops.len() >= 2);
    assert_eq!(stops.first(), Some(origin));
    assert_eq!(stops.last(), Some(destination));

    let intermediate = &stops[1..stops.len() - 1];
    for (i, pair) in stops[..stops.len() - 1].windows(2).enumerate() {
        let gap = distance_m(pair[0].location(), pair[1].location());
        assert!(gap >= min_separation_m, "stops {} and {} only {:.0}m apart", i, i + 1, gap);
    }
    for s in intermediate {
        assert!(distance_m(s.location(), destination.location()) >= min_separation_m);
    }

    let mut seen = std::collections::HashSet::new();
    for s in stops {
        assert!(seen.insert(s.place_id()), "duplicate stop {}", s.place_id());
    }
}

/// Origin A and destination B roughly 7.7 km apart, with a 3-point geometry.
fn short_trip() -> (Stop, Stop, Polyline) {
    let a = stop("A", 10.0, -66.0);
    let b = stop("B", 10.05, -66.05);
    let path = Polyline::new(vec![a.location(), GeoPoint::new(10.025, -66.02), b.location()]);
    (a, b, path)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn two_spaced_candidates_survive_in_input_order() {
    let (a, b, path) = short_trip();
    let first = Candidate::new(stop("C1", 10.02, -66.02));
    let second = Candidate::new(stop("C2", 10.03, -66.03));
    let gateway = FakeGateway::with_path(&path).candidates(vec![first, second]);
    let planner = RouteStopPlanner::new(&gateway, TakeAll, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&a, &b).unwrap();

    assert_eq!(ids(&stops), vec!["id-A", "id-C1", "id-C2", "id-B"]);
    // Origin plus at least one sampled point were searched.
    assert!(gateway.nearby_call_count() >= 2);
    assert_well_formed(&stops, &a, &b, 500.0);
}

#[test]
fn close_candidates_keep_only_the_first() {
    let (a, b, path) = short_trip();
    let first = Candidate::new(stop("C1", 10.02, -66.02));
    let near_first = Candidate::new(stop("C2", 10.022, -66.022));
    let gateway = FakeGateway::with_path(&path).candidates(vec![first, near_first]);
    let planner = RouteStopPlanner::new(&gateway, TakeAll, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&a, &b).unwrap();

    assert_eq!(ids(&stops), vec!["id-A", "id-C1", "id-B"]);
}

#[test]
fn empty_selection_yields_origin_and_destination() {
    let (a, b, path) = short_trip();
    let gateway = FakeGateway::with_path(&path).candidates(vec![Candidate::new(stop("C1", 10.02, -66.02))]);
    let selector = Scripted::new(Vec::new());
    let planner = RouteStopPlanner::new(&gateway, &selector, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&a, &b).unwrap();

    assert_eq!(stops, vec![a, b]);
    assert_eq!(selector.calls.load(Ordering::SeqCst), 1);
    // Only the initial route: nothing to optimize.
    assert_eq!(gateway.route_call_count(), 1);
}

#[test]
fn route_not_found_aborts_before_any_search() {
    let (a, b, _) = short_trip();
    let gateway = FakeGateway::failing(GatewayError::RouteNotFound {
        status: "ZERO_RESULTS".to_string(),
    });
    let selector = Scripted::new(vec![stop("C1", 10.02, -66.02)]);
    let planner = RouteStopPlanner::new(&gateway, &selector, PlannerOptions::default()).unwrap();

    let err = planner.generate(&a, &b).unwrap_err();

    assert!(err.is_route_not_found());
    assert_eq!(gateway.nearby_call_count(), 0);
    assert_eq!(selector.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn provider_failure_is_distinct_from_missing_route() {
    let (a, b, _) = short_trip();
    let gateway = FakeGateway::failing(GatewayError::Upstream("connection reset".to_string()));
    let planner = RouteStopPlanner::new(&gateway, TakeAll, PlannerOptions::default()).unwrap();

    let err = planner.generate(&a, &b).unwrap_err();

    assert!(!err.is_route_not_found());
    assert!(matches!(err, PipelineError::Routing(GatewayError::Upstream(_))));
    assert_eq!(gateway.nearby_call_count(), 0);
}

#[test]
fn corridor_stops_follow_optimized_order() {
    let origin = PLAZA_BOLIVAR.stop();
    let destination = PETARE.stop();
    let gateway = FakeGateway::with_path(&corridor_path())
        .catalog(CORRIDOR)
        .waypoints(WaypointReply::WestToEast);
    // Deliberately scrambled east/west.
    let picks = vec![CORRIDOR[5].stop(), CORRIDOR[1].stop(), CORRIDOR[4].stop(), CORRIDOR[0].stop()];
    let selector = Scripted::new(picks);
    let planner = RouteStopPlanner::new(&gateway, &selector, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&origin, &destination).unwrap();

    assert_eq!(
        ids(&stops),
        vec![
            PLAZA_BOLIVAR.place_id,
            CORRIDOR[0].place_id,
            CORRIDOR[1].place_id,
            CORRIDOR[4].place_id,
            CORRIDOR[5].place_id,
            PETARE.place_id,
        ]
    );
    assert_well_formed(&stops, &origin, &destination, 500.0);
}

#[test]
fn failed_optimization_keeps_selection_order() {
    let origin = PLAZA_BOLIVAR.stop();
    let destination = PETARE.stop();
    let gateway = FakeGateway::with_path(&corridor_path())
        .catalog(CORRIDOR)
        .waypoints(WaypointReply::Fail);
    let picks = vec![CORRIDOR[4].stop(), CORRIDOR[1].stop()];
    let selector = Scripted::new(picks);
    let planner = RouteStopPlanner::new(&gateway, &selector, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&origin, &destination).unwrap();

    assert_eq!(
        ids(&stops),
        vec![PLAZA_BOLIVAR.place_id, CORRIDOR[4].place_id, CORRIDOR[1].place_id, PETARE.place_id]
    );
    assert_eq!(gateway.route_call_count(), 2);
}

#[test]
fn malformed_permutation_keeps_selection_order() {
    let origin = PLAZA_BOLIVAR.stop();
    let destination = PETARE.stop();
    let gateway = FakeGateway::with_path(&corridor_path())
        .catalog(CORRIDOR)
        .waypoints(WaypointReply::Fixed(vec![0]));
    let picks = vec![CORRIDOR[5].stop(), CORRIDOR[0].stop()];
    let selector = Scripted::new(picks);
    let planner = RouteStopPlanner::new(&gateway, &selector, PlannerOptions::default()).unwrap();

    let stops = planner.generate(&origin, &destination).unwrap();

    assert_eq!(
        ids(&stops),
        vec![PLAZA_BOLIVAR.place_id, CORRIDOR[5].place_id, CORRIDOR[0].place_id, PETARE.place_id]
    );
}

#[test]
fn rated_selector_over_corridor_is_well_formed() {
    let origin = PLAZA_BOLIVAR.stop();
    let destination = PETARE.stop();
    let gateway = FakeGateway::with_path(&corridor_path())
        .catalog(CORRIDOR)
        .waypoints(WaypointReply::WestToEast);
    let options = PlannerOptions::default();
    let planner = RouteStopPlanner::new(&gateway, RatedSelector::new(options.max_stops), options).unwrap();

    let stops = planner.generate(&origin, &destination).unwrap();

    assert!(stops.len() > 2, "expected intermediate stops, got {:?}", ids(&stops));
    assert!(stops.len() <= 7);
    assert_well_formed(&stops, &origin, &destination, 500.0);

    // Stops progress eastwards once ordered.
    for pair in stops.windows(2) {
        assert!(pair[0].location().lng < pair[1].location().lng);
    }
}

#[test]
fn wider_spacing_drops_more_stops() {
    let origin = PLAZA_BOLIVAR.stop();
    let destination = PETARE.stop();
    let run = |min_separation_m: f64| {
        let gateway = FakeGateway::with_path(&corridor_path())
            .catalog(CORRIDOR)
            .waypoints(WaypointReply::WestToEast);
        let options = PlannerOptions {
            min_separation_m,
            max_stops: CORRIDOR.len(),
            ..PlannerOptions::default()
        };
        let planner = RouteStopPlanner::new(&gateway, TakeAll, options).unwrap();
        planner.generate(&origin, &destination).unwrap()
    };

    let tight = run(500.0);
    let loose = run(2_500.0);

    assert!(loose.len() < tight.len(), "{} vs {}", loose.len(), tight.len());
    assert_well_formed(&tight, &origin, &destination, 500.0);
    assert_well_formed(&loose, &origin, &destination, 2_500.0);
}
