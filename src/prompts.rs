//! Versioned instruction templates for structured geographic generation
//!
//! Each record shape has one prompt: a system instruction that pins down the
//! exact JSON shape and accuracy rules, and a user instruction carrying the
//! prompt itself. Templates are checksummed so a response can be traced back
//! to the exact instruction text that produced it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::schemas::{QueryAnalysis, QueryType};

/// Provenance of a template: content checksum and creation stamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptLineage {
    /// SHA1 checksum of system + user template text
    pub checksum: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
}

/// A (system, user) instruction pair for one record shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable identifier (format: geo-<shape>-v1)
    pub id: String,
    pub record_type: QueryType,
    pub one_liner: String,
    pub version: String,
    pub lineage: PromptLineage,
    pub system_template: String,
    /// User instruction; `{{prompt}}` and `{{entities}}` are substituted
    pub user_template: String,
}

/// Fully substituted instructions ready for the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub prompt_id: String,
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(
        id: impl Into<String>,
        record_type: QueryType,
        one_liner: impl Into<String>,
        system_template: impl Into<String>,
        user_template: impl Into<String>,
    ) -> Self {
        let system_template = system_template.into();
        let user_template = user_template.into();
        let checksum = sha1_checksum(&format!("{system_template}\n{user_template}"));

        Self {
            id: id.into(),
            record_type,
            one_liner: one_liner.into(),
            version: "1.0.0".to_string(),
            lineage: PromptLineage {
                checksum,
                created_at: chrono::Utc::now(),
                created_by: "geo-prompt".to_string(),
            },
            system_template,
            user_template,
        }
    }

    /// Substitute the user's prompt and extracted entities
    pub fn render(&self, prompt: &str, analysis: &QueryAnalysis) -> RenderedPrompt {
        let entities = if analysis.entities.is_empty() {
            "none".to_string()
        } else {
            analysis.entities.join(", ")
        };
        let user = self
            .user_template
            .replace("{{prompt}}", prompt.trim())
            .replace("{{entities}}", &entities);

        RenderedPrompt {
            prompt_id: self.id.clone(),
            system: format!("{}\n{}", self.system_template, JSON_RULES),
            user,
        }
    }
}

/// Generate a SHA1 checksum of prompt content
fn sha1_checksum(content: &str) -> String {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Registry of the instruction templates, keyed by record shape
#[derive(Debug, Default)]
pub struct PromptRegistry {
    prompts: HashMap<QueryType, Arc<Prompt>>,
}

impl PromptRegistry {
    /// Create new registry with the built-in templates
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_core_prompts();
        registry
    }

    /// Add or replace the template for a record shape
    pub fn register(&mut self, prompt: Prompt) {
        self.prompts.insert(prompt.record_type, Arc::new(prompt));
    }

    /// Template for a query type, resolved through its record shape
    pub fn for_type(&self, query_type: QueryType) -> Option<Arc<Prompt>> {
        self.prompts.get(&query_type.record_type()).cloned()
    }

    pub fn list(&self) -> Vec<Arc<Prompt>> {
        self.prompts.values().cloned().collect()
    }

    fn register_core_prompts(&mut self) {
        self.register(Prompt::new(
            "geo-route-v1",
            QueryType::Route,
            "Ordered waypoints between an origin and a destination",
            ROUTE_SYSTEM,
            ROUTE_USER,
        ));
        self.register(Prompt::new(
            "geo-historical-event-v1",
            QueryType::HistoricalEvent,
            "Phased historical event with optional military detail",
            HISTORICAL_SYSTEM,
            HISTORICAL_USER,
        ));
        self.register(Prompt::new(
            "geo-network-analysis-v1",
            QueryType::NetworkAnalysis,
            "Located nodes and named connections between them",
            NETWORK_SYSTEM,
            NETWORK_USER,
        ));
        self.register(Prompt::new(
            "geo-geographic-feature-v1",
            QueryType::GeographicFeature,
            "A single named feature as a coordinate sequence",
            FEATURE_SYSTEM,
            FEATURE_USER,
        ));
    }
}

/// Output rules appended to every system instruction
const JSON_RULES: &str = "Respond with a single JSON object only. No markdown, no code fences, no comments, no text before or after the object. \
All coordinates are [longitude, latitude] in decimal degrees, longitude first. Use real, verifiable locations.";

const ROUTE_SYSTEM: &str = r#"You are a geographic routing assistant that produces map-ready route data.

Return JSON with exactly this shape:
{
  "type": "route",
  "origin": "string",
  "destination": "string",
  "mode": "driving" | "walking" | "transit" | "cycling",
  "preferences": ["string"],
  "waypoints": [
    {"name": "string", "coordinates": [longitude, latitude], "description": "string"}
  ],
  "routeDescription": "string",
  "distance": "string, e.g. \"1,580 km\"",
  "duration": "string, e.g. \"15 hours\""
}

Accuracy rules:
- The first waypoint must be the origin and the last waypoint must be the destination.
- Waypoints follow the real road, rail, or trail alignment in travel order. Do not draw a straight line.
- Provide at least 8 waypoints for routes longer than 500 km.
- For long-distance trails and railways provide 15-25 waypoints at real towns, stations, or landmarks along the way.
- Choose the mode the user asked for; default to "driving".
"#;

const ROUTE_USER: &str = "Generate route data for: {{prompt}}\nDetected entities: {{entities}}";

const HISTORICAL_SYSTEM: &str = r#"You are a historical cartographer that produces map-ready data about historical events.

Return JSON with exactly this shape:
{
  "type": "historical-event",
  "event": "string",
  "timeRange": [startYear, endYear],
  "keyLocations": ["string"],
  "phases": [
    {"name": "string", "startYear": number, "endYear": number, "description": "string",
     "locations": ["string"], "coordinates": [[longitude, latitude]]}
  ],
  "summary": "string",
  "battles": [
    {"name": "string", "date": "string", "coordinates": [longitude, latitude],
     "outcome": "victory" | "defeat" | "draw", "side": "allied" | "enemy" | "neutral",
     "description": "string", "casualties": "string", "commanders": ["string"],
     "strategicImportance": "string", "battleType": "string"}
  ],
  "movements": [
    {"name": "string", "from": [longitude, latitude], "to": [longitude, latitude],
     "route": [[longitude, latitude]], "side": "allied" | "enemy", "description": "string",
     "year": number, "movementType": "string", "duration": "string"}
  ],
  "territories": [
    {"name": "string", "coordinates": [[longitude, latitude]], "side": "allied" | "enemy" | "neutral",
     "description": "string", "year": number, "controlType": "string"}
  ],
  "strategicLocations": [
    {"name": "string", "coordinates": [longitude, latitude], "type": "string",
     "side": "allied" | "enemy" | "neutral", "importance": "string", "description": "string", "year": number}
  ],
  "supplyLines": [
    {"name": "string", "coordinates": [[longitude, latitude]], "side": "allied" | "enemy",
     "description": "string", "year": number}
  ]
}

Accuracy rules:
- Always include at least one phase with coordinates, even when the other collections are filled.
- Years are integers; use negative numbers for BCE.
- Territories trace the real historical boundary with at least 8 points. Never return rectangles or bounding boxes.
- Battles sit at the actual battlefield, not the nearest modern city.
- Include battles, movements, territories, strategic locations, and supply lines for military conflicts; omit collections that do not apply.
"#;

const HISTORICAL_USER: &str =
    "Generate historical event data for: {{prompt}}\nDetected entities: {{entities}}";

const NETWORK_SYSTEM: &str = r#"You are a network analyst that produces map-ready data about geographic networks such as trade routes, supply chains, and infrastructure.

Return JSON with exactly this shape:
{
  "type": "network-analysis",
  "subject": "string",
  "nodes": [
    {"name": "string", "type": "string", "coordinates": [longitude, latitude],
     "importance": number between 0 and 1, "description": "string"}
  ],
  "connections": [
    {"from": "node name", "to": "node name", "strength": number between 0 and 1,
     "type": "string", "description": "string"}
  ],
  "summary": "string"
}

Accuracy rules:
- Provide 8-15 nodes at real cities, ports, or facilities.
- Every connection's "from" and "to" must exactly match the "name" of a node.
- Connections follow historically or physically plausible links; do not connect every node to every other node.
"#;

const NETWORK_USER: &str =
    "Generate network data for: {{prompt}}\nDetected entities: {{entities}}";

const FEATURE_SYSTEM: &str = r#"You are a physical geographer that produces map-ready data about geographic features.

Return JSON with exactly this shape:
{
  "type": "geographic-feature",
  "feature": "string",
  "coordinates": [[longitude, latitude]],
  "properties": {"description": "string", "...": "any additional facts"}
}

Accuracy rules:
- Coordinates trace the real feature in order: a river from source to mouth, a trail from start to end, a border along its actual line, a mountain range along its crest.
- Provide 15-25 coordinates for long linear features such as rivers, trails, and borders.
- A single point feature (a peak, a lake) may have one coordinate.
"#;

const FEATURE_USER: &str =
    "Generate geographic feature data for: {{prompt}}\nDetected entities: {{entities}}";
