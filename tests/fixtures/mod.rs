//! Test fixtures for route-stops.
//!
//! Provides real Caracas places (approximate coordinates from OpenStreetMap)
//! and a road-like path across the city from Plaza Bolívar to Petare.

pub mod caracas_places;

pub use caracas_places::*;
