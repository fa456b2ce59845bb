use geo_prompt::classifier::{Classifier, FALLBACK_CONFIDENCE};
use geo_prompt::schemas::Visualization;
use geo_prompt::{QueryType, classify};

#[test]
fn route_prompts_classify_as_path_routes() {
    for prompt in [
        "route from Boston to Chicago",
        "Show me directions from Seattle to Portland",
        "drive from Denver to Austin",
        "the Trans-Siberian Railway",
    ] {
        let analysis = classify(prompt);
        assert_eq!(analysis.query_type, QueryType::Route, "{prompt}");
        assert_eq!(analysis.confidence, 0.9, "{prompt}");
        assert_eq!(analysis.suggested_visualization, Visualization::Path, "{prompt}");
    }
}

#[test]
fn year_tokens_are_kept_verbatim() {
    let analysis = classify("Battle of 1812");
    assert!(analysis.entities.contains(&"1812".to_string()));

    let analysis = classify("what happened in 2029 and 999 and 2030");
    assert!(analysis.entities.contains(&"2029".to_string()));
    assert!(!analysis.entities.contains(&"999".to_string()));
    assert!(!analysis.entities.contains(&"2030".to_string()));
}

#[test]
fn trade_routes_classify_as_networks() {
    let analysis = classify("Silk Road trade network");
    assert_eq!(analysis.query_type, QueryType::NetworkAnalysis);
    assert_eq!(analysis.confidence, 0.9);
    assert_eq!(analysis.suggested_visualization, Visualization::Network);

    let analysis = classify("the amber route across Europe");
    assert_eq!(analysis.query_type, QueryType::NetworkAnalysis);
}

#[test]
fn classification_is_total() {
    let classifier = Classifier::default();
    let long = "x".repeat(10_000);
    for prompt in ["", "   ", "hello world", "🗺️🗺️", "{{}}[[", long.as_str()] {
        let analysis = classifier.classify(prompt);
        assert!(matches!(
            analysis.query_type,
            QueryType::Route
                | QueryType::HistoricalEvent
                | QueryType::NetworkAnalysis
                | QueryType::GeographicFeature
        ));
        assert!((0.0..=1.0).contains(&analysis.confidence));
    }
}

#[test]
fn unmatched_prompts_fall_back_to_points() {
    let analysis = classify("tell me something nice");
    assert_eq!(analysis.query_type, QueryType::GeographicFeature);
    assert_eq!(analysis.confidence, FALLBACK_CONFIDENCE);
    assert_eq!(analysis.suggested_visualization, Visualization::Points);
}

#[test]
fn entities_are_deduplicated_in_first_seen_order() {
    let analysis = classify("Paris in 1900, Paris in 1900, then a city near Lyon");
    assert_eq!(analysis.entities, vec!["1900", "Paris", "Lyon", "city"]);
}

#[test]
fn analysis_serializes_with_wire_field_names() {
    let value = serde_json::to_value(classify("route from Boston to Chicago")).unwrap();
    assert_eq!(value["type"], "route");
    assert_eq!(value["suggestedVisualization"], "path");
    assert!(value["entities"].is_array());
}
