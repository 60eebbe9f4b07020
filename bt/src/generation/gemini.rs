//! Gemini API client implementation
//!
//! Implements the GenerationClient trait over the Gemini
//! `generateContent` endpoint. Responses are requested as JSON but the
//! parser tolerates extraneous prose around the payload by extracting
//! the bracketed array.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::domain::{Category, Coordinates, ItineraryItem, PointOfInterest, QuizQuestion};

use super::{GenerationClient, GenerationError};

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable the config names.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config
            .resolve_api_key()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(GenerationError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        })
    }

    /// Send one prompt and return the concatenated candidate text
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.endpoint();
        let body = self.build_request_body(prompt);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate_text: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate_text: network error");
                    last_error = Some(GenerationError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("generate_text: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(GenerationError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate_text: retryable error");
                last_error = Some(GenerationError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "generate_text: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(GenerationError::ApiError { status, message: text });
            }

            let api_response: GenerateContentResponse = response.json().await?;
            let text = api_response
                .candidates
                .into_iter()
                .next()
                .map(|c| {
                    c.content
                        .parts
                        .into_iter()
                        .filter_map(|p| p.text)
                        .collect::<Vec<_>>()
                        .join("")
                })
                .unwrap_or_default();

            if text.is_empty() {
                return Err(GenerationError::InvalidResponse("Empty candidate text".to_string()));
            }
            debug!(text_len = text.len(), "generate_text: success");
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| GenerationError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_quiz(&self, city: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
        debug!(%city, "generate_quiz: called");
        let prompt = format!(
            "Generate a fun, engaging trivia quiz about {} with 5 questions. \
             Return ONLY a JSON array of objects with fields: text, options \
             (exactly 4 strings), correctIndex, relatedTopic, funFact.",
            city
        );
        let text = self.generate_text(&prompt).await?;
        parse_quiz(&text)
    }

    async fn generate_suggestions(
        &self,
        city: &str,
        topics: &[String],
        hotel: &str,
    ) -> Result<Vec<PointOfInterest>, GenerationError> {
        debug!(%city, %hotel, topic_count = topics.len(), "generate_suggestions: called");
        let start_point = if hotel.is_empty() { "City Center" } else { hotel };
        let prompt = format!(
            "Identify 6 places to visit in {} near {} related to {}. \
             Return ONLY a JSON array of objects with fields: title, \
             description, category (one of Sightseeing, Food, Culture, \
             Adventure), relatedQuizTopic, distanceText, travelTimeText, \
             googleMapsLink.",
            city,
            start_point,
            topics.join(", ")
        );
        let text = self.generate_text(&prompt).await?;
        parse_suggestions(&text)
    }

    async fn optimize_route(
        &self,
        city: &str,
        hotel: &str,
        items: &[ItineraryItem],
    ) -> Result<Vec<String>, GenerationError> {
        debug!(%city, item_count = items.len(), "optimize_route: called");
        let start_point = if hotel.is_empty() { "City Center" } else { hotel };
        let listing = items
            .iter()
            .map(|i| format!("- id: {} | {} | {}", i.id(), i.title(), i.poi.category))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "A traveler in {} starts from {}. Order these stops into the \
             most efficient visiting sequence:\n{}\n\
             Return ONLY a JSON array of the ids in visiting order.",
            city, start_point, listing
        );
        let text = self.generate_text(&prompt).await?;
        parse_route(&text)
    }

    async fn enrich_image(&self, title: &str, city: &str) -> Result<Option<String>, GenerationError> {
        debug!(%title, %city, "enrich_image: called");
        let prompt = format!(
            "Provide one publicly accessible https image URL that depicts \
             {} in {}. Respond with the URL alone, or the word none.",
            title, city
        );
        // Best effort: failures and non-URLs both mean "no image".
        match self.generate_text(&prompt).await {
            Ok(text) => Ok(parse_image_url(&text)),
            Err(e) => {
                debug!(error = %e, "enrich_image: generation failed, treating as absent");
                Ok(None)
            }
        }
    }
}

/// Extract the first bracketed JSON array from free-form text
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
    let payload = extract_json_array(text)
        .ok_or_else(|| GenerationError::InvalidResponse("No JSON array in quiz response".to_string()))?;
    let raw: Vec<RawQuestion> =
        serde_json::from_str(payload).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, q)| QuizQuestion {
            id: format!("q-{}", index),
            text: q.text,
            options: q.options,
            correct_index: q.correct_index,
            related_topic: q.related_topic,
            fun_fact: q.fun_fact,
        })
        .collect())
}

fn parse_suggestions(text: &str) -> Result<Vec<PointOfInterest>, GenerationError> {
    let payload = extract_json_array(text)
        .ok_or_else(|| GenerationError::InvalidResponse("No JSON array in suggestions response".to_string()))?;
    let raw: Vec<RawSuggestion> =
        serde_json::from_str(payload).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, s)| PointOfInterest {
            id: format!("s-{}", index),
            title: s.title,
            description: s.description,
            category: Category::from_label(&s.category),
            related_quiz_topic: s.related_quiz_topic.filter(|t| !t.is_empty()),
            nearby_interest: s.nearby_interest,
            nearby_interest_description: s.nearby_interest_description,
            distance_text: Some(s.distance_text.unwrap_or_else(|| "Unknown".to_string())),
            travel_time_text: Some(s.travel_time_text.unwrap_or_else(|| "Unknown".to_string())),
            coordinates: s.coordinates,
            maps_link: s.google_maps_link.filter(|l| !l.is_empty()),
            image_url: None,
        })
        .collect())
}

fn parse_route(text: &str) -> Result<Vec<String>, GenerationError> {
    let payload = extract_json_array(text)
        .ok_or_else(|| GenerationError::InvalidResponse("No JSON array in route response".to_string()))?;
    serde_json::from_str(payload).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}

fn parse_image_url(text: &str) -> Option<String> {
    let candidate = text.trim().trim_matches('"').trim();
    if candidate.starts_with("https://") || candidate.starts_with("http://") {
        Some(candidate.to_string())
    } else {
        None
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

// Payload shapes produced by the generation prompts

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    #[serde(default)]
    related_topic: String,
    #[serde(default)]
    fun_fact: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuggestion {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    related_quiz_topic: Option<String>,
    #[serde(default)]
    nearby_interest: Option<String>,
    #[serde(default)]
    nearby_interest_description: Option<String>,
    #[serde(default)]
    distance_text: Option<String>,
    #[serde(default)]
    travel_time_text: Option<String>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    #[serde(default)]
    google_maps_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_array_plain() {
        assert_eq!(extract_json_array("[1, 2, 3]"), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_extract_json_array_with_surrounding_prose() {
        let text = "Here is your quiz:\n```json\n[{\"a\": 1}]\n```\nEnjoy!";
        assert_eq!(extract_json_array(text), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn test_extract_json_array_missing() {
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_parse_quiz_assigns_batch_ids() {
        let text = r#"Sure! [
            {"text": "Q1?", "options": ["a","b","c","d"], "correctIndex": 2,
             "relatedTopic": "History", "funFact": "Fact 1"},
            {"text": "Q2?", "options": ["a","b","c","d"], "correctIndex": 0,
             "relatedTopic": "Food", "funFact": "Fact 2"}
        ]"#;
        let quiz = parse_quiz(text).unwrap();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].id, "q-0");
        assert_eq!(quiz[1].id, "q-1");
        assert_eq!(quiz[0].correct_index, 2);
        assert_eq!(quiz[1].related_topic, "Food");
    }

    #[test]
    fn test_parse_quiz_rejects_garbage() {
        assert!(parse_quiz("no payload at all").is_err());
        assert!(parse_quiz("[{\"text\": 42}]").is_err());
    }

    #[test]
    fn test_parse_suggestions_defaults_and_ids() {
        let text = r#"[
            {"title": "Old Bridge", "description": "A bridge", "category": "Sightseeing",
             "relatedQuizTopic": "Rivers", "distanceText": "1.2 km",
             "travelTimeText": "15 min", "googleMapsLink": "https://maps.example/x"},
            {"title": "Night Market", "description": "Snacks", "category": "Street Food"}
        ]"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 2);

        assert_eq!(suggestions[0].id, "s-0");
        assert_eq!(suggestions[0].category, Category::Sightseeing);
        assert_eq!(suggestions[0].distance_text.as_deref(), Some("1.2 km"));
        assert_eq!(suggestions[0].maps_link.as_deref(), Some("https://maps.example/x"));

        // Unknown category falls back, missing distance fields default.
        assert_eq!(suggestions[1].id, "s-1");
        assert_eq!(suggestions[1].category, Category::Sightseeing);
        assert_eq!(suggestions[1].distance_text.as_deref(), Some("Unknown"));
        assert_eq!(suggestions[1].travel_time_text.as_deref(), Some("Unknown"));
        assert!(suggestions[1].maps_link.is_none());
        assert!(suggestions[1].image_url.is_none());
    }

    #[test]
    fn test_parse_route() {
        let text = "Optimal order: [\"s-2\", \"s-0\", \"s-1\"]";
        assert_eq!(parse_route(text).unwrap(), vec!["s-2", "s-0", "s-1"]);
    }

    #[test]
    fn test_parse_image_url() {
        assert_eq!(
            parse_image_url(" \"https://example.com/a.jpg\" "),
            Some("https://example.com/a.jpg".to_string())
        );
        assert_eq!(parse_image_url("none"), None);
        assert_eq!(parse_image_url("I could not find one."), None);
    }
}
