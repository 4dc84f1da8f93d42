//! Startup configuration: pipeline tunables and provider credentials.
//!
//! Everything here is read once when the process starts. Missing credentials
//! and unparsable overrides are fatal [`ConfigError`]s; nothing is re-read
//! per request.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const MIN_SEPARATION_VAR: &str = "ROUTE_STOPS_MIN_SEPARATION_M";
const SAMPLE_INTERVAL_VAR: &str = "ROUTE_STOPS_SAMPLE_INTERVAL_M";
const SEARCH_RADIUS_VAR: &str = "ROUTE_STOPS_SEARCH_RADIUS_M";
const KEYWORDS_VAR: &str = "ROUTE_STOPS_KEYWORDS";
const MIN_STOPS_VAR: &str = "ROUTE_STOPS_MIN_STOPS";
const MAX_STOPS_VAR: &str = "ROUTE_STOPS_MAX_STOPS";

/// Smallest accepted sampling interval in meters.
pub const MIN_SAMPLE_INTERVAL_M: f64 = 1.0;

/// Nearby-search keywords tuned for Venezuelan transit landmarks.
pub const DEFAULT_CATEGORY_KEYWORDS: &str = "bus stop|parada|station|terminal|landmark|park|plaza|shopping|market|centro comercial|avenida principal|calle principal";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOptions {
    /// Minimum straight-line spacing between consecutive stops, and between
    /// any candidate and the route endpoints.
    pub min_separation_m: f64,
    /// Arc-length step used when sampling search points along the route.
    pub sample_interval_m: f64,
    /// Radius of each nearby search.
    pub search_radius_m: f64,
    /// `|`-separated keywords passed to the nearby search.
    pub category_keywords: String,
    /// Lower bound on the number of stops the selector is asked for.
    pub min_stops: usize,
    /// Upper bound on the number of stops the selector is asked for.
    pub max_stops: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            min_separation_m: 500.0,
            sample_interval_m: 1000.0,
            search_radius_m: 750.0,
            category_keywords: DEFAULT_CATEGORY_KEYWORDS.to_string(),
            min_stops: 2,
            max_stops: 5,
        }
    }
}

impl PlannerOptions {
    /// Reads overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds options from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let options = Self {
            min_separation_m: parse_or(&lookup, MIN_SEPARATION_VAR, defaults.min_separation_m)?,
            sample_interval_m: parse_or(&lookup, SAMPLE_INTERVAL_VAR, defaults.sample_interval_m)?,
            search_radius_m: parse_or(&lookup, SEARCH_RADIUS_VAR, defaults.search_radius_m)?,
            category_keywords: lookup(KEYWORDS_VAR).unwrap_or(defaults.category_keywords),
            min_stops: parse_or(&lookup, MIN_STOPS_VAR, defaults.min_stops)?,
            max_stops: parse_or(&lookup, MAX_STOPS_VAR, defaults.max_stops)?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_distance(MIN_SEPARATION_VAR, self.min_separation_m)?;
        positive_distance(SAMPLE_INTERVAL_VAR, self.sample_interval_m)?;
        if self.sample_interval_m < MIN_SAMPLE_INTERVAL_M {
            return Err(ConfigError::Invalid {
                name: SAMPLE_INTERVAL_VAR,
                reason: format!("must be at least {}m", MIN_SAMPLE_INTERVAL_M),
            });
        }
        positive_distance(SEARCH_RADIUS_VAR, self.search_radius_m)?;

        if self.category_keywords.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: KEYWORDS_VAR,
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_stops == 0 {
            return Err(ConfigError::Invalid {
                name: MAX_STOPS_VAR,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_stops > self.max_stops {
            return Err(ConfigError::Invalid {
                name: MIN_STOPS_VAR,
                reason: format!("{} exceeds maximum {}", self.min_stops, self.max_stops),
            });
        }

        Ok(())
    }
}

/// Provider API keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub google_maps_api_key: String,
    /// Only required when the AI selector is in use.
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_maps_api_key", &"<redacted>")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn from_env(require_openai: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok(), require_openai)
    }

    pub fn from_lookup<F>(lookup: F, require_openai: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_maps_api_key = required(&lookup, GOOGLE_MAPS_API_KEY)?;
        let openai_api_key = if require_openai {
            Some(required(&lookup, OPENAI_API_KEY)?)
        } else {
            lookup(OPENAI_API_KEY).filter(|key| !key.trim().is_empty())
        };

        Ok(Self {
            google_maps_api_key,
            openai_api_key,
        })
    }
}

/// Loads a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!("loaded environment from {}", path.display());
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{:?}: {}", raw, err),
        }),
    }
}

fn positive_distance(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("{} is not a positive distance in meters", value),
        })
    }
}
