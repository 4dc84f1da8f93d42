//! Error types for the stop generation pipeline and its adapters.

/// Failure to decode an encoded polyline string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },

    #[error("polyline ends inside a coordinate at offset {offset}")]
    Truncated { offset: usize },

    #[error("polyline value at offset {offset} does not fit in 32 bits")]
    Overflow { offset: usize },
}

/// Failure reported by a routing provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The provider answered but knows no path between the two places.
    #[error("no route found (provider status {status})")]
    RouteNotFound { status: String },

    /// Transport failure or an unexpected provider reply.
    #[error("routing provider error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for GatewayError {
    /// The request URL is dropped: provider keys travel in its query string.
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.without_url().to_string())
    }
}

/// Fatal pipeline failures. Everything else degrades inside its stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to fetch route geometry: {0}")]
    Routing(#[from] GatewayError),

    #[error("route has no encoded geometry")]
    MissingGeometry,

    #[error("route geometry is malformed: {0}")]
    MalformedGeometry(#[from] DecodeError),

    #[error("decoded route geometry has no points")]
    EmptyPath,
}

impl PipelineError {
    /// True when the provider reported that no route exists.
    pub fn is_route_not_found(&self) -> bool {
        matches!(self, PipelineError::Routing(GatewayError::RouteNotFound { .. }))
    }
}

/// Startup configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// A stop that violates the data model invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StopError {
    #[error("stop name is empty")]
    EmptyName,

    #[error("stop place id is empty")]
    EmptyPlaceId,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
