//! Typed geographic records produced by the prompt pipeline
//!
//! `QueryAnalysis` is the classifier's output. `ProcessedQuery` is the tagged
//! union the generator hands to the rendering layer, discriminated on the wire
//! by its `type` field. All coordinates are `[longitude, latitude]` in decimal
//! degrees.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A `[longitude, latitude]` pair
pub type Coordinate = [f64; 2];

/// Query categories understood by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryType {
    Route,
    HistoricalEvent,
    NetworkAnalysis,
    GeographicFeature,
    DemographicData,
    EconomicData,
    EnvironmentalData,
    PoliticalBoundaries,
    MigrationPatterns,
    TradeRoutes,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Route => "route",
            QueryType::HistoricalEvent => "historical-event",
            QueryType::NetworkAnalysis => "network-analysis",
            QueryType::GeographicFeature => "geographic-feature",
            QueryType::DemographicData => "demographic-data",
            QueryType::EconomicData => "economic-data",
            QueryType::EnvironmentalData => "environmental-data",
            QueryType::PoliticalBoundaries => "political-boundaries",
            QueryType::MigrationPatterns => "migration-patterns",
            QueryType::TradeRoutes => "trade-routes",
        }
    }

    /// The record shape generated for this query type.
    ///
    /// Only four types have a dedicated shape; the rest are rendered as a
    /// geographic feature.
    pub fn record_type(&self) -> QueryType {
        match self {
            QueryType::Route => QueryType::Route,
            QueryType::HistoricalEvent => QueryType::HistoricalEvent,
            QueryType::NetworkAnalysis | QueryType::TradeRoutes => QueryType::NetworkAnalysis,
            _ => QueryType::GeographicFeature,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering hint attached to a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    Path,
    Timeline,
    Network,
    Heatmap,
    Boundaries,
    Points,
}

/// Result of classifying a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub confidence: f64,
    pub entities: Vec<String>,
    pub intent: String,
    pub suggested_visualization: Visualization,
}

/// Structured data returned for a prompt, one variant per record shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProcessedQuery {
    Route(RouteQuery),
    HistoricalEvent(HistoricalEventQuery),
    NetworkAnalysis(NetworkAnalysisQuery),
    GeographicFeature(GeographicFeatureQuery),
}

impl ProcessedQuery {
    pub fn query_type(&self) -> QueryType {
        match self {
            ProcessedQuery::Route(_) => QueryType::Route,
            ProcessedQuery::HistoricalEvent(_) => QueryType::HistoricalEvent,
            ProcessedQuery::NetworkAnalysis(_) => QueryType::NetworkAnalysis,
            ProcessedQuery::GeographicFeature(_) => QueryType::GeographicFeature,
        }
    }
}

/// How a route is travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Cycling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub coordinates: Coordinate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub route_description: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub duration: String,
}

/// Which side of a conflict a battle, movement or territory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Allied,
    Enemy,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub locations: Vec<String>,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub name: String,
    #[serde(default)]
    pub date: String,
    pub coordinates: Coordinate,
    pub outcome: BattleOutcome,
    pub side: Side,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casualties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commanders: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_importance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub name: String,
    pub from: Coordinate,
    pub to: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<Coordinate>>,
    pub side: Side,
    #[serde(default)]
    pub description: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    pub name: String,
    pub coordinates: Vec<Coordinate>,
    pub side: Side,
    #[serde(default)]
    pub description: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicLocation {
    pub name: String,
    pub coordinates: Coordinate,
    #[serde(rename = "type")]
    pub location_type: String,
    pub side: Side,
    #[serde(default)]
    pub importance: String,
    #[serde(default)]
    pub description: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyLine {
    pub name: String,
    pub coordinates: Vec<Coordinate>,
    pub side: Side,
    #[serde(default)]
    pub description: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEventQuery {
    pub event: String,
    pub time_range: [i32; 2],
    #[serde(default)]
    pub key_locations: Vec<String>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battles: Option<Vec<Battle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movements: Option<Vec<Movement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territories: Option<Vec<Territory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_locations: Option<Vec<StrategicLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_lines: Option<Vec<SupplyLine>>,
}

impl HistoricalEventQuery {
    /// True when any of the optional military collections carries data
    pub fn has_detail_collections(&self) -> bool {
        fn filled<T>(v: &Option<Vec<T>>) -> bool {
            v.as_ref().is_some_and(|items| !items.is_empty())
        }
        filled(&self.battles)
            || filled(&self.movements)
            || filled(&self.territories)
            || filled(&self.strategic_locations)
            || filled(&self.supply_lines)
    }
}

/// A place in a connectivity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub coordinates: Coordinate,
    pub importance: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConnection {
    pub from: String,
    pub to: String,
    pub strength: f64,
    #[serde(rename = "type", default)]
    pub connection_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAnalysisQuery {
    pub subject: String,
    pub nodes: Vec<NetworkNode>,
    #[serde(default)]
    pub connections: Vec<NetworkConnection>,
    #[serde(default)]
    pub summary: String,
}

impl NetworkAnalysisQuery {
    pub fn node(&self, name: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// A single mapped feature with free-form properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicFeatureQuery {
    pub feature: String,
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}
