//! Station graph for the subway network
//!
//! The topology is built once from a scenario and is read-only while the
//! simulation runs. Per-station passenger counts live in the simulation
//! state, not here.

use anyhow::{Context, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

use super::types::{Line, Position, StationId};

/// Static description of a station
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    /// Stable key used by scenario files, e.g. `"wtc"`
    pub key: String,
    pub name: String,
    pub position: Position,
    pub capacity: u32,
    /// Expected arrivals per minute before rush-hour and congestion scaling
    pub base_rate: f64,
}

/// An undirected track segment between two stations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: StationId,
    pub to: StationId,
    pub line: Line,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkTopology {
    /// Stations as nodes, segments as edges
    graph: UnGraph<StationId, Line>,

    /// Maps station IDs to their node indices in the graph
    station_to_node: HashMap<StationId, NodeIndex>,

    /// Station data indexed by `StationId`
    stations: Vec<Station>,

    segments: Vec<Segment>,

    /// Maps scenario keys to station IDs
    keys: HashMap<String, StationId>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a station and returns its ID
    pub fn add_station(
        &mut self,
        key: &str,
        name: &str,
        position: Position,
        capacity: u32,
        base_rate: f64,
    ) -> Result<StationId> {
        if self.keys.contains_key(key) {
            anyhow::bail!("Duplicate station key '{}'", key);
        }
        if capacity == 0 {
            anyhow::bail!("Station '{}' must have a positive capacity", key);
        }
        if !position.is_finite() {
            anyhow::bail!("Station '{}' has a non-finite position", key);
        }
        if !base_rate.is_finite() || base_rate < 0.0 {
            anyhow::bail!("Station '{}' has an invalid base rate {}", key, base_rate);
        }

        let id = StationId(self.stations.len());
        let node = self.graph.add_node(id);
        self.station_to_node.insert(id, node);
        self.keys.insert(key.to_string(), id);
        self.stations.push(Station {
            id,
            key: key.to_string(),
            name: name.to_string(),
            position,
            capacity,
            base_rate,
        });
        Ok(id)
    }

    /// Connects two existing stations with a segment of the given line
    pub fn add_segment(&mut self, from: StationId, to: StationId, line: Line) -> Result<()> {
        let from_node = *self
            .station_to_node
            .get(&from)
            .with_context(|| format!("Segment start {:?} not found", from))?;
        let to_node = *self
            .station_to_node
            .get(&to)
            .with_context(|| format!("Segment end {:?} not found", to))?;

        self.graph.add_edge(from_node, to_node, line);
        self.segments.push(Segment { from, to, line });
        Ok(())
    }

    /// Gets a station by ID.
    ///
    /// IDs are only ever issued by [`NetworkTopology::add_station`], so an ID
    /// from another topology is a programming error and panics.
    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.0]
    }

    pub fn get_station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.0)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn position(&self, id: StationId) -> Position {
        self.station(id).position
    }

    pub fn lookup(&self, key: &str) -> Option<StationId> {
        self.keys.get(key).copied()
    }

    /// Like [`lookup`](Self::lookup) but fails with a descriptive error
    pub fn resolve(&self, key: &str) -> Result<StationId> {
        self.lookup(key)
            .with_context(|| format!("Unknown station '{}'", key))
    }

    /// Whether a segment directly connects the two stations
    pub fn are_adjacent(&self, a: StationId, b: StationId) -> bool {
        match (self.station_to_node.get(&a), self.station_to_node.get(&b)) {
            (Some(&node_a), Some(&node_b)) => self.graph.find_edge(node_a, node_b).is_some(),
            _ => false,
        }
    }

    /// Stations one segment away, in ascending ID order
    pub fn neighbours(&self, id: StationId) -> Vec<StationId> {
        let Some(&node) = self.station_to_node.get(&id) else {
            return Vec::new();
        };
        let mut neighbours: Vec<StationId> = self
            .graph
            .neighbors(node)
            .map(|n| self.graph[n])
            .collect();
        neighbours.sort();
        neighbours.dedup();
        neighbours
    }

    /// Stations whose coordinates differ from `id`'s by less than `radius` on
    /// both axes, excluding `id` itself, in ascending ID order
    pub fn stations_near(&self, id: StationId, radius: f64) -> Vec<StationId> {
        let Some(origin) = self.get_station(id) else {
            return Vec::new();
        };
        self.stations
            .iter()
            .filter(|s| s.id != id && origin.position.within_box(&s.position, radius))
            .map(|s| s.id)
            .collect()
    }
}
