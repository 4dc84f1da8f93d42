//! Caracas landmarks along the Libertador / Francisco de Miranda corridor.

use route_stops::polyline::Polyline;
use route_stops::{Candidate, GeoPoint, Stop};

/// A named place with a provider id and coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub place_id: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
}

impl Place {
    pub const fn new(name: &'static str, place_id: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            place_id,
            lat,
            lng,
            rating: None,
        }
    }

    pub const fn rated(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn stop(&self) -> Stop {
        Stop::new(self.name, self.lat, self.lng, self.place_id).unwrap()
    }

    pub fn candidate(&self) -> Candidate {
        let mut candidate = Candidate::new(self.stop());
        candidate.rating = self.rating;
        candidate.types.insert("point_of_interest".to_string());
        candidate.vicinity = Some("Caracas".to_string());
        candidate
    }
}

pub const PLAZA_BOLIVAR: Place = Place::new("Plaza Bolívar", "ChIJ-plaza-bolivar", 10.5061, -66.9146);
pub const PETARE: Place = Place::new("Petare", "ChIJ-petare", 10.4769, -66.8086);

/// Candidate stops between Plaza Bolívar and Petare, west to east.
pub const CORRIDOR: &[Place] = &[
    Place::new("Parque Central", "ChIJ-parque-central", 10.5003, -66.9023).rated(4.3),
    Place::new("Plaza Venezuela", "ChIJ-plaza-venezuela", 10.4996, -66.8833).rated(4.5),
    Place::new("Sabana Grande", "ChIJ-sabana-grande", 10.4960, -66.8760).rated(4.1),
    Place::new("Metro Chacaíto", "ChIJ-chacaito", 10.4913, -66.8693).rated(4.0),
    Place::new("Plaza Francia", "ChIJ-plaza-francia", 10.4964, -66.8490).rated(4.6),
    Place::new("Parque del Este", "ChIJ-parque-del-este", 10.4928, -66.8366).rated(4.7),
    Place::new("Los Dos Caminos", "ChIJ-dos-caminos", 10.4944, -66.8295).rated(3.9),
];

/// A coarse road path following the corridor.
pub fn corridor_path() -> Polyline {
    let mut points = vec![PLAZA_BOLIVAR.point()];
    points.extend([
        GeoPoint::new(10.5030, -66.9080),
        GeoPoint::new(10.5000, -66.8950),
        GeoPoint::new(10.4990, -66.8800),
        GeoPoint::new(10.4940, -66.8700),
        GeoPoint::new(10.4960, -66.8500),
        GeoPoint::new(10.4935, -66.8350),
        GeoPoint::new(10.4880, -66.8200),
    ]);
    points.push(PETARE.point());
    Polyline::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corridor_in_caracas() {
        for place in CORRIDOR {
            assert!(place.lat > 10.4 && place.lat < 10.6, "{} lat out of range", place.name);
            assert!(place.lng > -67.0 && place.lng < -66.7, "{} lng out of range", place.name);
        }
    }
}
