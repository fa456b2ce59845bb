//! GeoJSON hand-off for the rendering layer
//!
//! Flattens a `ProcessedQuery` into a `FeatureCollection`. Every feature
//! carries `name`, `description` and a `kind` property so the map can style
//! features without knowing the record shape.

use serde_json::{Value, json};

use crate::schemas::{
    Coordinate, GeographicFeatureQuery, HistoricalEventQuery, NetworkAnalysisQuery,
    ProcessedQuery, RouteQuery,
};

pub fn to_feature_collection(query: &ProcessedQuery) -> Value {
    let features = match query {
        ProcessedQuery::Route(route) => route_features(route),
        ProcessedQuery::HistoricalEvent(event) => historical_features(event),
        ProcessedQuery::NetworkAnalysis(network) => network_features(network),
        ProcessedQuery::GeographicFeature(feature) => feature_features(feature),
    };
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn feature(kind: &str, name: &str, description: &str, geometry: Value, extra: Value) -> Value {
    let mut properties = json!({
        "kind": kind,
        "name": name,
        "description": description,
    });
    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        props.extend(extra);
    }
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": geometry,
    })
}

fn point(coordinate: &Coordinate) -> Value {
    json!({"type": "Point", "coordinates": coordinate})
}

fn line(coordinates: &[Coordinate]) -> Value {
    json!({"type": "LineString", "coordinates": coordinates})
}

/// Point for a single coordinate, LineString otherwise
fn point_or_line(coordinates: &[Coordinate]) -> Value {
    match coordinates {
        [single] => point(single),
        _ => line(coordinates),
    }
}

fn polygon(ring: &[Coordinate]) -> Value {
    let mut closed = ring.to_vec();
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => closed.push(*first),
        _ => {}
    }
    json!({"type": "Polygon", "coordinates": [closed]})
}

fn route_features(route: &RouteQuery) -> Vec<Value> {
    let path: Vec<Coordinate> = route.waypoints.iter().map(|w| w.coordinates).collect();
    let mut features = vec![feature(
        "route",
        &format!("{} to {}", route.origin, route.destination),
        &route.route_description,
        line(&path),
        json!({"mode": route.mode, "distance": route.distance, "duration": route.duration}),
    )];
    features.extend(route.waypoints.iter().enumerate().map(|(order, w)| {
        feature(
            "waypoint",
            &w.name,
            &w.description,
            point(&w.coordinates),
            json!({"order": order}),
        )
    }));
    features
}

fn historical_features(event: &HistoricalEventQuery) -> Vec<Value> {
    let mut features = Vec::new();

    for phase in event.phases.iter().filter(|p| !p.coordinates.is_empty()) {
        features.push(feature(
            "phase",
            &phase.name,
            &phase.description,
            point_or_line(&phase.coordinates),
            json!({"startYear": phase.start_year, "endYear": phase.end_year}),
        ));
    }
    for battle in event.battles.iter().flatten() {
        features.push(feature(
            "battle",
            &battle.name,
            &battle.description,
            point(&battle.coordinates),
            json!({"date": battle.date, "outcome": battle.outcome, "side": battle.side}),
        ));
    }
    for movement in event.movements.iter().flatten() {
        let path = match &movement.route {
            Some(route) if route.len() >= 2 => route.clone(),
            _ => vec![movement.from, movement.to],
        };
        features.push(feature(
            "movement",
            &movement.name,
            &movement.description,
            line(&path),
            json!({"side": movement.side, "year": movement.year}),
        ));
    }
    for territory in event.territories.iter().flatten() {
        features.push(feature(
            "territory",
            &territory.name,
            &territory.description,
            polygon(&territory.coordinates),
            json!({"side": territory.side, "year": territory.year}),
        ));
    }
    for location in event.strategic_locations.iter().flatten() {
        features.push(feature(
            "strategic-location",
            &location.name,
            &location.description,
            point(&location.coordinates),
            json!({"side": location.side, "year": location.year, "importance": location.importance}),
        ));
    }
    for supply in event.supply_lines.iter().flatten() {
        features.push(feature(
            "supply-line",
            &supply.name,
            &supply.description,
            point_or_line(&supply.coordinates),
            json!({"side": supply.side, "year": supply.year}),
        ));
    }

    features
}

fn network_features(network: &NetworkAnalysisQuery) -> Vec<Value> {
    let mut features: Vec<Value> = network
        .nodes
        .iter()
        .map(|node| {
            feature(
                "node",
                &node.name,
                &node.description,
                point(&node.coordinates),
                json!({"nodeType": node.node_type, "importance": node.importance}),
            )
        })
        .collect();

    for connection in &network.connections {
        let (Some(from), Some(to)) = (network.node(&connection.from), network.node(&connection.to))
        else {
            continue;
        };
        features.push(feature(
            "connection",
            &format!("{} - {}", connection.from, connection.to),
            &connection.description,
            line(&[from.coordinates, to.coordinates]),
            json!({"strength": connection.strength, "connectionType": connection.connection_type}),
        ));
    }
    features
}

fn feature_features(feature_query: &GeographicFeatureQuery) -> Vec<Value> {
    let description = feature_query
        .properties
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    vec![feature(
        "feature",
        &feature_query.feature,
        description,
        point_or_line(&feature_query.coordinates),
        Value::Object(feature_query.properties.clone()),
    )]
}
