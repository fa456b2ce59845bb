//! Structural validation of parsed model output
//!
//! Serde already enforces required fields, enum domains, and the
//! `[longitude, latitude]` pair shape. The checks here cover what the type
//! system cannot: coordinate ranges, value ranges, minimum sizes, and
//! cross-references between nodes and connections.

use thiserror::Error;
use tracing::{debug, warn};

use crate::schemas::{
    Coordinate, GeographicFeatureQuery, HistoricalEventQuery, NetworkAnalysisQuery,
    ProcessedQuery, RouteQuery, Side,
};

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a parsed record in place.
///
/// Network connections that reference unknown nodes are removed rather than
/// rejected; everything else that fails a check rejects the whole record.
pub fn validate(query: &mut ProcessedQuery) -> Result<()> {
    match query {
        ProcessedQuery::Route(route) => validate_route(route),
        ProcessedQuery::HistoricalEvent(event) => validate_historical(event),
        ProcessedQuery::NetworkAnalysis(network) => {
            let dropped = drop_unmatched_connections(network);
            if dropped > 0 {
                debug!(dropped, "dropped connections referencing unknown nodes");
            }
            validate_network(network)
        }
        ProcessedQuery::GeographicFeature(feature) => validate_feature(feature),
    }
}

pub fn check_coordinate(path: &str, coordinate: &Coordinate) -> Result<()> {
    let [lon, lat] = *coordinate;
    if !lon.is_finite() || !lat.is_finite() {
        return Err(ValidationError::new(path, "coordinate is not a finite number"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::new(
            path,
            format!("longitude {lon} outside [-180, 180]"),
        ));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::new(
            path,
            format!("latitude {lat} outside [-90, 90]"),
        ));
    }
    Ok(())
}

fn check_coordinates(path: &str, coordinates: &[Coordinate]) -> Result<()> {
    coordinates
        .iter()
        .enumerate()
        .try_for_each(|(i, c)| check_coordinate(&format!("{path}[{i}]"), c))
}

fn check_unit_interval(path: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(path, format!("{value} outside [0, 1]")))
    }
}

fn check_belligerent(path: &str, side: Side) -> Result<()> {
    if side == Side::Neutral {
        Err(ValidationError::new(path, "side must be allied or enemy"))
    } else {
        Ok(())
    }
}

fn loosely_matches(place: &str, name: &str) -> bool {
    let place = place.to_lowercase();
    let name = name.to_lowercase();
    !place.is_empty() && (name.contains(&place) || place.contains(&name))
}

fn validate_route(route: &RouteQuery) -> Result<()> {
    if route.waypoints.len() < 2 {
        return Err(ValidationError::new(
            "waypoints",
            "a route needs at least two waypoints",
        ));
    }
    for (i, waypoint) in route.waypoints.iter().enumerate() {
        check_coordinate(&format!("waypoints[{i}].coordinates"), &waypoint.coordinates)?;
    }

    if let (Some(first), Some(last)) = (route.waypoints.first(), route.waypoints.last()) {
        if !loosely_matches(&route.origin, &first.name) {
            warn!(origin = %route.origin, first = %first.name, "first waypoint does not name the origin");
        }
        if !loosely_matches(&route.destination, &last.name) {
            warn!(destination = %route.destination, last = %last.name, "last waypoint does not name the destination");
        }
    }
    Ok(())
}

fn validate_historical(event: &HistoricalEventQuery) -> Result<()> {
    let [start, end] = event.time_range;
    if start > end {
        return Err(ValidationError::new(
            "timeRange",
            format!("start {start} is after end {end}"),
        ));
    }

    if !event.has_detail_collections() {
        let has_points = event.phases.iter().any(|p| !p.coordinates.is_empty());
        if !has_points {
            return Err(ValidationError::new(
                "phases",
                "phases need coordinates when no battles, movements, territories, strategic locations, or supply lines are given",
            ));
        }
    }

    for (i, phase) in event.phases.iter().enumerate() {
        if phase.start_year > phase.end_year {
            return Err(ValidationError::new(
                format!("phases[{i}]"),
                format!("start {} is after end {}", phase.start_year, phase.end_year),
            ));
        }
        check_coordinates(&format!("phases[{i}].coordinates"), &phase.coordinates)?;
    }

    for (i, battle) in event.battles.iter().flatten().enumerate() {
        check_coordinate(&format!("battles[{i}].coordinates"), &battle.coordinates)?;
    }

    for (i, movement) in event.movements.iter().flatten().enumerate() {
        let path = format!("movements[{i}]");
        check_belligerent(&format!("{path}.side"), movement.side)?;
        check_coordinate(&format!("{path}.from"), &movement.from)?;
        check_coordinate(&format!("{path}.to"), &movement.to)?;
        if let Some(route) = &movement.route {
            check_coordinates(&format!("{path}.route"), route)?;
        }
    }

    // Rings pass through as given; closure is the renderer's concern
    for (i, territory) in event.territories.iter().flatten().enumerate() {
        let path = format!("territories[{i}].coordinates");
        if territory.coordinates.len() < 3 {
            return Err(ValidationError::new(
                path,
                "a territory needs at least three points",
            ));
        }
        check_coordinates(&path, &territory.coordinates)?;
    }

    for (i, location) in event.strategic_locations.iter().flatten().enumerate() {
        check_coordinate(
            &format!("strategicLocations[{i}].coordinates"),
            &location.coordinates,
        )?;
    }

    for (i, line) in event.supply_lines.iter().flatten().enumerate() {
        let path = format!("supplyLines[{i}]");
        check_belligerent(&format!("{path}.side"), line.side)?;
        if line.coordinates.is_empty() {
            return Err(ValidationError::new(
                format!("{path}.coordinates"),
                "a supply line needs coordinates",
            ));
        }
        check_coordinates(&format!("{path}.coordinates"), &line.coordinates)?;
    }

    Ok(())
}

/// Remove connections whose endpoints are not node names; returns how many
/// were removed
pub fn drop_unmatched_connections(network: &mut NetworkAnalysisQuery) -> usize {
    let before = network.connections.len();
    let nodes = &network.nodes;
    network.connections.retain(|connection| {
        let known = |name: &str| nodes.iter().any(|n| n.name == name);
        let keep = known(&connection.from) && known(&connection.to);
        if !keep {
            debug!(from = %connection.from, to = %connection.to, "connection references an unknown node");
        }
        keep
    });
    before - network.connections.len()
}

fn validate_network(network: &NetworkAnalysisQuery) -> Result<()> {
    if network.nodes.is_empty() {
        return Err(ValidationError::new("nodes", "a network needs at least one node"));
    }
    for (i, node) in network.nodes.iter().enumerate() {
        check_coordinate(&format!("nodes[{i}].coordinates"), &node.coordinates)?;
        check_unit_interval(&format!("nodes[{i}].importance"), node.importance)?;
    }
    for (i, connection) in network.connections.iter().enumerate() {
        check_unit_interval(&format!("connections[{i}].strength"), connection.strength)?;
    }
    Ok(())
}

fn validate_feature(feature: &GeographicFeatureQuery) -> Result<()> {
    if feature.coordinates.is_empty() {
        return Err(ValidationError::new(
            "coordinates",
            "a feature needs at least one coordinate",
        ));
    }
    check_coordinates("coordinates", &feature.coordinates)
}
