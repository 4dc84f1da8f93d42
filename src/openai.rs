//! AI stop selection over an OpenAI-compatible chat completions endpoint.
//!
//! The model is shown the origin, the destination and every gathered
//! candidate, and answers with a JSON object `{"stops": [...]}`. Whatever
//! goes wrong (transport, empty reply, malformed JSON) the selector answers
//! with an empty list and the pipeline continues without intermediate stops.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::OPENAI_API_KEY;
use crate::error::ConfigError;
use crate::model::{Candidate, Stop};
use crate::traits::StopSelector;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// ISO country code the prompt is biased towards.
    pub country: String,
    pub timeout_secs: u64,
    pub min_stops: usize,
    pub max_stops: usize,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            country: "VE".to_string(),
            timeout_secs: 30,
            min_stops: 2,
            max_stops: 5,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("country", &self.country)
            .field("timeout_secs", &self.timeout_secs)
            .field("min_stops", &self.min_stops)
            .field("max_stops", &self.max_stops)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
enum SelectionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned no content")]
    EmptyContent,

    #[error("model reply is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model reply has no \"stops\" array")]
    MissingStops,
}

#[derive(Debug, Clone)]
pub struct OpenAiSelector {
    config: OpenAiConfig,
    client: reqwest::blocking::Client,
}

impl OpenAiSelector {
    pub fn new(config: OpenAiConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::Missing(OPENAI_API_KEY));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn try_select(
        &self,
        origin: &Stop,
        destination: &Stop,
        candidates: &[Candidate],
    ) -> Result<Vec<Stop>, SelectionError> {
        let payload = json!({
            "origin": { "name": origin.name(), "lat": origin.location().lat, "lng": origin.location().lng },
            "destination": {
                "name": destination.name(),
                "lat": destination.location().lat,
                "lng": destination.location().lng,
            },
            "candidates": candidates,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(&self.config),
                },
                ChatMessage {
                    role: "user",
                    content: payload.to_string(),
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())?
            .json::<ChatResponse>()?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SelectionError::EmptyContent)?;

        let picks = parse_selection(&content)?;
        Ok(reconcile_picks(picks, candidates))
    }
}

impl StopSelector for OpenAiSelector {
    fn select(&self, origin: &Stop, destination: &Stop, candidates: &[Candidate]) -> Vec<Stop> {
        if candidates.is_empty() {
            return Vec::new();
        }

        info!("asking {} to choose among {} candidates", self.config.model, candidates.len());
        match self.try_select(origin, destination, candidates) {
            Ok(picks) => {
                if picks.len() < self.config.min_stops || picks.len() > self.config.max_stops {
                    warn!(
                        "model picked {} stops, outside the requested {}..={}",
                        picks.len(),
                        self.config.min_stops,
                        self.config.max_stops
                    );
                }
                picks
            }
            Err(err) => {
                warn!("AI stop selection failed, continuing without intermediate stops: {}", err);
                Vec::new()
            }
        }
    }
}

fn system_prompt(config: &OpenAiConfig) -> String {
    format!(
        "You are an expert urban transit planner creating a bus route in country {country}. \
         Your task is to select between {min} and {max} relevant and geographically sensible bus stops \
         from the provided candidate list to connect the origin and destination. \
         Prioritize locations that are logical stopping points for a public bus: major transit points \
         (existing bus stops, metro stations), significant landmarks, public parks/plazas, \
         shopping centers/markets, and key intersections along the likely path. \
         Ensure the selected stops make sense sequentially between the origin and destination. \
         Respond ONLY with a valid JSON object containing a single key \"stops\". \
         The value of \"stops\" must be an array of the selected stop objects. \
         Each stop object in the array must include these exact keys: \"name\" (string), \
         \"lat\" (number), \"lng\" (number), and \"placeId\" (string). \
         If no candidates are suitable, return an empty \"stops\" array.",
        country = config.country,
        min = config.min_stops,
        max = config.max_stops,
    )
}

/// Extracts well-formed stops from the model's JSON reply.
///
/// Items that are not `{name: string, lat: number, lng: number, placeId: string}`
/// (or that violate the stop invariants) are dropped individually.
fn parse_selection(content: &str) -> Result<Vec<Stop>, SelectionError> {
    let reply: Value = serde_json::from_str(content)?;
    let items = reply
        .get("stops")
        .and_then(Value::as_array)
        .ok_or(SelectionError::MissingStops)?;

    Ok(items
        .iter()
        .filter_map(|item| match Stop::deserialize(item) {
            Ok(stop) => Some(stop),
            Err(err) => {
                debug!("dropping malformed pick {}: {}", item, err);
                None
            }
        })
        .collect())
}

/// Maps picks back onto the candidates they name, dropping ids the model
/// invented and repeated picks. The candidate's own stop is returned so names
/// and coordinates match what the provider reported.
fn reconcile_picks(picks: Vec<Stop>, candidates: &[Candidate]) -> Vec<Stop> {
    let by_id: HashMap<&str, &Candidate> = candidates
        .iter()
        .map(|candidate| (candidate.place_id(), candidate))
        .collect();
    let mut seen = HashSet::new();

    picks
        .into_iter()
        .filter_map(|pick| {
            let Some(candidate) = by_id.get(pick.place_id()) else {
                debug!("dropping pick {:?}: not among the candidates", pick.place_id());
                return None;
            };
            if !seen.insert(pick.place_id().to_string()) {
                return None;
            }
            Some(candidate.stop.clone())
        })
        .collect()
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
