//! route-stops: bus stop generation between an origin and a destination.
//!
//! Combines a road route, nearby place searches along it, a pluggable stop
//! selector and waypoint ordering into one spaced list of stops. Providers are
//! reached only through the traits in [`traits`], so the pipeline runs
//! unchanged against Google Maps and OpenAI or against test fakes.

pub mod config;
pub mod error;
pub mod gather;
pub mod google;
pub mod haversine;
pub mod model;
pub mod openai;
pub mod order;
pub mod pipeline;
pub mod polyline;
pub mod sampler;
pub mod selector;
pub mod separation;
pub mod traits;

pub use error::{ConfigError, DecodeError, GatewayError, PipelineError, StopError};
pub use model::{Candidate, GeoPoint, RouteGeometry, RouteLeg, Stop};
pub use pipeline::RouteStopPlanner;
