//! Structured geographic data generation
//!
//! Selects the instruction template for a classified prompt, makes a single
//! model call, and turns the raw completion into a validated
//! `ProcessedQuery`. No retries and no caching: any failure is returned to
//! the caller as one `GenerationError`.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::clients::{ChatCompletionsClient, CompletionRequest, TextGenerator};
use crate::config::ModelConfig;
use crate::error::{GenerationError, Result};
use crate::prompts::PromptRegistry;
use crate::repair;
use crate::schemas::{ProcessedQuery, QueryAnalysis, QueryType};
use crate::validation;

pub struct StructuredDataGenerator {
    client: Arc<dyn TextGenerator>,
    prompts: PromptRegistry,
}

impl StructuredDataGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self::with_registry(client, PromptRegistry::new())
    }

    pub fn with_registry(client: Arc<dyn TextGenerator>, prompts: PromptRegistry) -> Self {
        Self { client, prompts }
    }

    /// Build a generator backed by a chat-completions endpoint
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let client = ChatCompletionsClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Generate structured data for a prompt and its classification
    pub async fn generate(&self, prompt: &str, analysis: &QueryAnalysis) -> Result<ProcessedQuery> {
        let expected = analysis.query_type.record_type();
        let template = self
            .prompts
            .for_type(analysis.query_type)
            .ok_or_else(|| GenerationError::Config {
                message: format!("no instruction template registered for {}", expected),
            })?;

        let rendered = template.render(prompt, analysis);
        info!(
            prompt_id = %rendered.prompt_id,
            query_type = %analysis.query_type,
            "requesting structured data"
        );

        let start = Instant::now();
        let raw = self
            .client
            .complete(&CompletionRequest::from(&rendered))
            .await?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = raw.len(),
            "model responded"
        );

        parse_response(&raw, expected)
    }
}

/// Extract, repair, parse, type-check and validate a raw model response
pub fn parse_response(raw: &str, expected: QueryType) -> Result<ProcessedQuery> {
    let cleaned = repair::extract_and_repair(raw)
        .ok_or_else(|| GenerationError::malformed("no JSON object in model response", raw.trim()))?;

    let mut value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        GenerationError::malformed(format!("invalid JSON after repair: {e}"), cleaned.as_str())
    })?;

    let Some(object) = value.as_object_mut() else {
        return Err(GenerationError::malformed(
            "response is not a JSON object",
            cleaned,
        ));
    };

    match object.get("type").and_then(Value::as_str) {
        Some(tag) if tag == expected.as_str() => {}
        Some(tag) => {
            return Err(GenerationError::malformed(
                format!("type mismatch: requested {expected}, model returned {tag}"),
                cleaned,
            ));
        }
        None => {
            debug!(%expected, "model omitted the type tag, using the requested type");
            object.insert("type".to_string(), Value::String(expected.as_str().to_string()));
        }
    }

    let mut query: ProcessedQuery = serde_json::from_value(value).map_err(|e| {
        GenerationError::malformed(format!("response does not match {expected} schema: {e}"), cleaned.as_str())
    })?;

    validation::validate(&mut query)
        .map_err(|e| GenerationError::malformed(format!("validation failed at {e}"), cleaned.as_str()))?;

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_object_keeps_raw_text() {
        let err = parse_response("I cannot help with that.", QueryType::Route).unwrap_err();
        assert_eq!(err.content(), Some("I cannot help with that."));
    }

    #[test]
    fn type_mismatch_is_malformed() {
        let raw = r#"{"type": "route", "origin": "a", "destination": "b", "mode": "walking", "waypoints": []}"#;
        let err = parse_response(raw, QueryType::GeographicFeature).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
    }

    #[test]
    fn missing_type_uses_requested_shape() {
        let raw = r#"{"feature": "Mount Fuji", "coordinates": [[138.73, 35.36]]}"#;
        let query = parse_response(raw, QueryType::GeographicFeature).unwrap();
        assert_eq!(query.query_type(), QueryType::GeographicFeature);
    }

    #[test]
    fn string_values_survive_repair() {
        let raw = r#"```json
{"type": "geographic-feature", "feature": "Karakoram", "coordinates": [[76.51, 35.88],],
 "properties": {"description": "Peaks: K2, Everest,]", "note": "see ```json"}}
```"#;
        let query = parse_response(raw, QueryType::GeographicFeature).unwrap();
        let ProcessedQuery::GeographicFeature(feature) = query else {
            panic!("expected a geographic feature");
        };
        assert_eq!(feature.properties["description"], "Peaks: K2, Everest,]");
        assert_eq!(feature.properties["note"], "see ```json");
        assert_eq!(feature.coordinates.len(), 1);
    }

    #[test]
    fn non_object_properties_are_malformed() {
        let raw = r#"{"type": "geographic-feature", "feature": "Nile", "coordinates": [[31.23, 30.04]], "properties": "river"}"#;
        let err = parse_response(raw, QueryType::GeographicFeature).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        assert!(err.to_string().contains("geographic-feature schema"));
    }

    #[test]
    fn schema_violation_is_malformed() {
        let raw = r#"{"type": "route", "origin": "a", "destination": "b", "mode": "teleport", "waypoints": []}"#;
        let err = parse_response(raw, QueryType::Route).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        assert!(err.content().unwrap().contains("teleport"));
    }
}
