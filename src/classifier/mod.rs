//! Rule-based prompt classification
//!
//! A prompt is matched against an ordered list of pattern tiers. The first
//! tier with a matching pattern decides the query type, confidence, intent
//! and visualization hint. Order is part of the contract: trade-route
//! phrasing is checked before the generic network and geographic tiers so
//! that "silk road" lands on network analysis.

pub mod entities;

use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::debug;

use crate::schemas::{QueryAnalysis, QueryType, Visualization};

pub use entities::extract_entities;

/// Confidence reported when no tier matches
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Declarative description of one classification tier
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub query_type: QueryType,
    pub confidence: f64,
    pub intent: &'static str,
    pub visualization: Visualization,
    pub patterns: &'static [&'static str],
}

pub const ROUTE_PATTERNS: &[&str] = &[
    r"(?i)from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)(\w+)\s+to\s+(\w+)",
    r"(?i)route\s+from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)directions?\s+from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)path\s+from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)drive\s+from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)travel\s+from\s+(\w+)\s+to\s+(\w+)",
    r"(?i)railway\s+route",
    r"(?i)rail\s+route",
    r"(?i)train\s+route",
    r"(?i)trans.*railway",
    r"(?i)trans.*rail",
];

pub const HISTORICAL_PATTERNS: &[&str] = &[
    r"(?i)war\s+of\s+(\d{4})",
    r"(?i)(\d{4})\s+war",
    r"(?i)battle\s+of\s+(\w+)",
    r"(?i)revolution",
    r"(?i)civil\s+war",
    r"(?i)world\s+war",
    r"(?i)cold\s+war",
    r"(?i)independence",
    r"(?i)reconstruction",
    r"(?i)great\s+depression",
    r"(?i)renaissance",
    r"(?i)medieval",
    r"(?i)ancient",
    r"(?i)timeline",
    r"(?i)history",
    r"(?i)empire\s+expansion",
    r"(?i)roman\s+empire",
    r"(?i)expansion",
    r"(?i)conquest",
    r"(?i)invasion",
];

pub const TRADE_ROUTE_PATTERNS: &[&str] = &[
    r"(?i)silk\s+road",
    r"(?i)trade\s+route",
    r"(?i)spice\s+route",
    r"(?i)amber\s+route",
    r"(?i)incense\s+route",
    r"(?i)trade\s+network",
    r"(?i)merchant\s+route",
    r"(?i)caravan\s+route",
];

pub const NETWORK_PATTERNS: &[&str] = &[
    r"(?i)network",
    r"(?i)trade\s+network",
    r"(?i)drug\s+trade",
    r"(?i)smuggling",
    r"(?i)trafficking",
    r"(?i)supply\s+chain",
    r"(?i)distribution",
    r"(?i)connections",
    r"(?i)relationships",
    r"(?i)infrastructure",
    r"(?i)pipeline",
    r"(?i)route\s+network",
];

pub const GEOGRAPHIC_PATTERNS: &[&str] = &[
    r"(?i)mountains?",
    r"(?i)rivers?",
    r"(?i)lakes?",
    r"(?i)oceans?",
    r"(?i)forests?",
    r"(?i)deserts?",
    r"(?i)plains?",
    r"(?i)valleys?",
    r"(?i)coastline",
    r"(?i)border",
    r"(?i)boundary",
    r"(?i)territory",
    r"(?i)region",
    r"(?i)trail",
    r"(?i)path",
];

/// Built-in tiers in priority order
pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "route",
        query_type: QueryType::Route,
        confidence: 0.9,
        intent: "Find optimal route between locations",
        visualization: Visualization::Path,
        patterns: ROUTE_PATTERNS,
    },
    ClassificationRule {
        name: "historical",
        query_type: QueryType::HistoricalEvent,
        confidence: 0.85,
        intent: "Visualize historical event progression",
        visualization: Visualization::Timeline,
        patterns: HISTORICAL_PATTERNS,
    },
    ClassificationRule {
        name: "trade-route",
        query_type: QueryType::NetworkAnalysis,
        confidence: 0.9,
        intent: "Visualize historical trade networks and routes",
        visualization: Visualization::Network,
        patterns: TRADE_ROUTE_PATTERNS,
    },
    ClassificationRule {
        name: "network",
        query_type: QueryType::NetworkAnalysis,
        confidence: 0.8,
        intent: "Analyze network connections and relationships",
        visualization: Visualization::Network,
        patterns: NETWORK_PATTERNS,
    },
    ClassificationRule {
        name: "geographic",
        query_type: QueryType::GeographicFeature,
        confidence: 0.75,
        intent: "Display geographic features and boundaries",
        visualization: Visualization::Boundaries,
        patterns: GEOGRAPHIC_PATTERNS,
    },
];

/// A compiled tier: a rule plus its pattern set
#[derive(Debug, Clone)]
pub struct Tier {
    rule: ClassificationRule,
    patterns: RegexSet,
}

impl Tier {
    pub fn new(rule: ClassificationRule) -> Result<Self, regex::Error> {
        let patterns = RegexSet::new(rule.patterns)?;
        Ok(Self { rule, patterns })
    }

    pub fn rule(&self) -> &ClassificationRule {
        &self.rule
    }

    pub fn matches(&self, prompt: &str) -> bool {
        self.patterns.is_match(prompt)
    }

    fn analysis(&self, entities: Vec<String>) -> QueryAnalysis {
        QueryAnalysis {
            query_type: self.rule.query_type,
            confidence: self.rule.confidence,
            entities,
            intent: self.rule.intent.to_string(),
            suggested_visualization: self.rule.visualization,
        }
    }
}

/// Ordered list of tiers evaluated top to bottom, first match wins
#[derive(Debug, Clone)]
pub struct Classifier {
    tiers: Vec<Tier>,
}

impl Classifier {
    pub fn with_rules(rules: &[ClassificationRule]) -> Result<Self, regex::Error> {
        let tiers = rules
            .iter()
            .copied()
            .map(Tier::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Classify a prompt. Total: unmatched input yields the fallback analysis.
    pub fn classify(&self, prompt: &str) -> QueryAnalysis {
        let text = prompt.trim();
        let entities = extract_entities(text);

        let analysis = match self.tiers.iter().find(|tier| tier.matches(text)) {
            Some(tier) => {
                debug!(tier = tier.rule.name, "prompt matched classification tier");
                tier.analysis(entities)
            }
            None => {
                debug!("no classification tier matched, using fallback");
                fallback_analysis(entities)
            }
        };

        debug!(
            query_type = %analysis.query_type,
            confidence = analysis.confidence,
            entities = analysis.entities.len(),
            "classified prompt"
        );
        analysis
    }
}

impl Default for Classifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> =
    Lazy::new(|| Classifier::with_rules(DEFAULT_RULES).unwrap());

/// Low-confidence result for prompts no tier recognizes
pub fn fallback_analysis(entities: Vec<String>) -> QueryAnalysis {
    QueryAnalysis {
        query_type: QueryType::GeographicFeature,
        confidence: FALLBACK_CONFIDENCE,
        entities,
        intent: "General geographic visualization".to_string(),
        suggested_visualization: Visualization::Points,
    }
}

/// Classify a prompt with the built-in tiers
pub fn classify(prompt: &str) -> QueryAnalysis {
    DEFAULT_CLASSIFIER.classify(prompt)
}
