use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use geo_prompt::clients::{CompletionRequest, TextGenerator};
use geo_prompt::schemas::Side;
use geo_prompt::{GenerationError, ProcessedQuery, QueryType, StructuredDataGenerator, classify, process_prompt};

/// Replays a canned completion and records every request it receives
struct ScriptedGenerator {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> geo_prompt::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GenerationError::UpstreamCall {
                message: message.clone(),
            }),
        }
    }
}

const ROUTE_REPLY: &str = r#"Sure! Here is the route:
```json
{
  "type": "route",
  "origin": "Boston",
  "destination": "Chicago",
  "mode": "driving",
  "waypoints": [
    {"name": "Boston", "coordinates": [-71.0589, 42.3601], "description": "Start"}
    {"name": "Cleveland", "coordinates": [-81.6944, 41.4993], "description": "Lake Erie"},
    {"name": "Chicago", "coordinates": [-87.6298, 41.8781], "description": "End"},
  ],
  "routeDescription": "Interstate 90 west",
  "distance": "983 miles",
  "duration": "15 hours"
}
```
Let me know if you need anything else."#;

const NETWORK_REPLY: &str = r#"{
  "type": "network-analysis",
  "subject": "Silk Road",
  "nodes": [
    {"name": "Chang'an", "type": "city", "coordinates": [108.94, 34.34], "importance": 1.0},
    {"name": "Samarkand", "type": "city", "coordinates": [66.97, 39.65], "importance": 0.8}
  ],
  "connections": [
    {"from": "Chang'an", "to": "Samarkand", "strength": 0.9, "type": "caravan"},
    {"from": "Samarkand", "to": "Atlantis", "strength": 0.2, "type": "caravan"}
  ]
}"#;

#[tokio::test]
async fn route_is_generated_from_fenced_prose() -> Result<()> {
    let client = ScriptedGenerator::replying(ROUTE_REPLY);
    let generator = StructuredDataGenerator::new(client.clone());

    let analysis = classify("route from Boston to Chicago");
    let query = generator.generate("route from Boston to Chicago", &analysis).await?;

    let ProcessedQuery::Route(route) = query else {
        panic!("expected a route record");
    };
    assert_eq!(route.waypoints.len(), 3);
    assert_eq!(route.waypoints[1].name, "Cleveland");
    assert_eq!(route.distance, "983 miles");

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].user.contains("route from Boston to Chicago"));
    assert!(calls[0].system.contains("waypoints"));
    Ok(())
}

#[tokio::test]
async fn unmatched_connections_are_dropped() -> Result<()> {
    let generator = StructuredDataGenerator::new(ScriptedGenerator::replying(NETWORK_REPLY));

    let analysis = classify("Silk Road trade network");
    assert_eq!(analysis.query_type, QueryType::NetworkAnalysis);
    let query = generator.generate("Silk Road trade network", &analysis).await?;

    let ProcessedQuery::NetworkAnalysis(network) = query else {
        panic!("expected a network record");
    };
    assert_eq!(network.nodes.len(), 2);
    assert_eq!(network.connections.len(), 1);
    assert_eq!(network.connections[0].to, "Samarkand");
    Ok(())
}

#[tokio::test]
async fn historical_event_keeps_optional_collections() -> Result<()> {
    let reply = r#"{
      "type": "historical-event",
      "event": "War of 1812",
      "timeRange": [1812, 1815],
      "keyLocations": ["Washington", "New Orleans"],
      "phases": [
        {"name": "Invasion of Canada", "startYear": 1812, "endYear": 1813, "locations": ["Detroit"], "coordinates": [[-83.05, 42.33]]}
      ],
      "battles": [
        {"name": "Battle of New Orleans", "date": "1815-01-08", "coordinates": [-89.99, 29.94], "outcome": "victory", "side": "allied"}
      ],
      "territories": [
        {"name": "Upper Canada", "side": "enemy", "year": 1812, "coordinates": [[-83.0, 42.0], [-76.0, 44.0], [-79.0, 46.0]]}
      ]
    }"#;
    let generator = StructuredDataGenerator::new(ScriptedGenerator::replying(reply));

    let analysis = classify("War of 1812");
    let query = generator.generate("War of 1812", &analysis).await?;

    let ProcessedQuery::HistoricalEvent(event) = query else {
        panic!("expected a historical record");
    };
    assert_eq!(event.time_range, [1812, 1815]);
    assert_eq!(event.battles.as_ref().map(Vec::len), Some(1));
    assert_eq!(event.territories.as_ref().unwrap()[0].side, Side::Enemy);
    assert!(event.movements.is_none());
    Ok(())
}

#[tokio::test]
async fn unparseable_reply_is_malformed_with_content() {
    let generator =
        StructuredDataGenerator::new(ScriptedGenerator::replying("{\"type\": \"route\", \"origin\": }"));

    let analysis = classify("route from Boston to Chicago");
    let err = generator
        .generate("route from Boston to Chicago", &analysis)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse { .. }));
    assert!(err.content().unwrap().contains("\"origin\""));
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let reply = r#"{"type": "geographic-feature", "feature": "Nowhere", "coordinates": [[42.0, 200.0]]}"#;
    let generator = StructuredDataGenerator::new(ScriptedGenerator::replying(reply));

    let analysis = classify("mountains of nowhere");
    let err = generator
        .generate("mountains of nowhere", &analysis)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("validation failed"));
}

#[tokio::test]
async fn upstream_failure_propagates_unchanged() {
    let client = ScriptedGenerator::failing("rate limited");
    let generator = StructuredDataGenerator::new(client.clone());

    let err = process_prompt(&generator, "longest rivers in Africa")
        .await
        .unwrap_err();

    match err {
        GenerationError::UpstreamCall { message } => assert_eq!(message, "rate limited"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn process_prompt_pairs_analysis_with_record() -> Result<()> {
    let generator = StructuredDataGenerator::new(ScriptedGenerator::replying(ROUTE_REPLY));

    let processed = process_prompt(&generator, "route from Boston to Chicago").await?;
    assert_eq!(processed.analysis.query_type, QueryType::Route);
    assert_eq!(processed.query.query_type(), QueryType::Route);

    let value = serde_json::to_value(&processed)?;
    assert_eq!(value["query"]["type"], "route");
    assert_eq!(value["analysis"]["confidence"], 0.9);
    Ok(())
}

#[tokio::test]
async fn concurrent_generations_share_one_generator() -> Result<()> {
    let generator = Arc::new(StructuredDataGenerator::new(ScriptedGenerator::replying(
        NETWORK_REPLY,
    )));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let generator = generator.clone();
        handles.push(tokio::spawn(async move {
            process_prompt(&generator, "Silk Road trade network").await
        }));
    }
    for handle in handles {
        let processed = handle.await??;
        assert_eq!(processed.query.query_type(), QueryType::NetworkAnalysis);
    }
    Ok(())
}
