//! Deployment-time description of a network and its fleet
//!
//! A scenario is plain data, loadable from JSON. [`Scenario::build`] checks
//! it and turns it into a topology plus the initial simulation state; any
//! configuration mistake is reported there and never reaches a tick.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::config::SimulationClock;
use super::metrics::Metrics;
use super::network::NetworkTopology;
use super::train::{SimTrain, DWELL_TICKS, TRAIN_CAPACITY, TRAIN_SPEED};
use super::types::{Line, Position, StationId, TrainId};
use super::world::SimState;

/// Share of capacity waiting at an ordinary station when the run starts
pub const DEFAULT_STATION_LOAD: f64 = 0.25;

fn default_station_load() -> f64 {
    DEFAULT_STATION_LOAD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSpec {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub capacity: u32,
    /// Passengers per minute
    #[serde(default)]
    pub base_rate: f64,
    /// Share of capacity already waiting at start
    #[serde(default = "default_station_load")]
    pub initial_load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub from: String,
    pub to: String,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSpec {
    pub line: Line,
    pub start: String,
    pub route: Vec<String>,
    /// Share of capacity onboard at start, defaults per line
    #[serde(default)]
    pub load_factor: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub dwell_ticks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub stations: Vec<StationSpec>,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub trains: Vec<TrainSpec>,
}

/// A validated scenario ready to simulate
#[derive(Debug, Clone)]
pub struct BuiltScenario {
    pub network: NetworkTopology,
    pub state: SimState,
}

fn check_load_factor(what: &str, load: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&load) {
        anyhow::bail!("{} load factor {} is outside [0, 1]", what, load);
    }
    Ok(())
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid scenario file {}", path.display()))
    }

    /// Validate the scenario and create the topology and starting state
    pub fn build(&self) -> Result<BuiltScenario> {
        let mut network = NetworkTopology::new();
        let mut waiting = Vec::with_capacity(self.stations.len());

        for spec in &self.stations {
            check_load_factor(&format!("Station '{}'", spec.id), spec.initial_load)?;
            network.add_station(
                &spec.id,
                &spec.name,
                Position::new(spec.x, spec.y),
                spec.capacity,
                spec.base_rate,
            )?;
            waiting.push((f64::from(spec.capacity) * spec.initial_load).floor() as u32);
        }

        for segment in &self.segments {
            let from = network
                .resolve(&segment.from)
                .context("Segment references an unknown station")?;
            let to = network
                .resolve(&segment.to)
                .context("Segment references an unknown station")?;
            network.add_segment(from, to, segment.line)?;
        }

        let trains = self
            .trains
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                build_train(&network, TrainId(index), spec)
                    .with_context(|| format!("Invalid train #{} on the {} line", index, spec.line.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        let state = SimState {
            clock: SimulationClock::new(),
            waiting,
            trains,
            metrics: Metrics::seeded(),
        };

        Ok(BuiltScenario { network, state })
    }

    /// The PATH-style network the simulator ships with: 13 stations on the
    /// red, blue and yellow lines and five trains
    pub fn default_network() -> Self {
        let station = |id: &str, name: &str, x: f64, y: f64, capacity: u32, base_rate: f64| {
            let initial_load = match id {
                "wtc" | "newark" => 0.4,
                "journal" | "hoboken" => 0.35,
                _ => DEFAULT_STATION_LOAD,
            };
            StationSpec {
                id: id.to_string(),
                name: name.to_string(),
                x,
                y,
                capacity,
                base_rate,
                initial_load,
            }
        };

        let stations = vec![
            station("wtc", "World Trade Center", 350.0, 230.0, 1000, 25.0),
            station("exchange", "Exchange Place", 280.0, 210.0, 500, 15.0),
            station("grove", "Grove St", 220.0, 190.0, 400, 12.0),
            station("journal", "Journal Square", 150.0, 160.0, 600, 20.0),
            station("newark", "Newark Penn Station", 50.0, 180.0, 800, 30.0),
            station("harrison", "Harrison", 80.0, 100.0, 300, 8.0),
            station("newport", "Newport", 270.0, 140.0, 450, 18.0),
            station("hoboken", "Hoboken", 210.0, 100.0, 700, 22.0),
            station("christopher", "Christopher St", 320.0, 120.0, 350, 10.0),
            station("9st", "9 St", 330.0, 100.0, 200, 5.0),
            station("14st", "14 St", 340.0, 80.0, 400, 15.0),
            station("23st", "23 St", 350.0, 60.0, 300, 12.0),
            station("33st", "33 St", 360.0, 40.0, 500, 18.0),
        ];

        let segment = |from: &str, to: &str, line: Line| SegmentSpec {
            from: from.to_string(),
            to: to.to_string(),
            line,
        };

        let segments = vec![
            segment("wtc", "exchange", Line::Red),
            segment("exchange", "grove", Line::Red),
            segment("grove", "journal", Line::Red),
            segment("journal", "newark", Line::Red),
            segment("journal", "harrison", Line::Blue),
            segment("journal", "newport", Line::Yellow),
            segment("newport", "hoboken", Line::Yellow),
            segment("hoboken", "christopher", Line::Yellow),
            segment("christopher", "9st", Line::Yellow),
            segment("9st", "14st", Line::Yellow),
            segment("14st", "23st", Line::Yellow),
            segment("23st", "33st", Line::Yellow),
        ];

        let route = |line: Line| -> Vec<String> {
            let stops: &[&str] = match line {
                Line::Red => &["newark", "journal", "grove", "exchange", "wtc"],
                Line::Blue => &["harrison", "journal", "grove", "exchange", "wtc"],
                Line::Yellow => &[
                    "33st",
                    "23st",
                    "14st",
                    "9st",
                    "christopher",
                    "hoboken",
                    "newport",
                    "journal",
                ],
            };
            stops.iter().map(|s| s.to_string()).collect()
        };

        let train = |line: Line, start: &str| TrainSpec {
            line,
            start: start.to_string(),
            route: route(line),
            load_factor: None,
            speed: None,
            capacity: None,
            dwell_ticks: None,
        };

        let trains = vec![
            train(Line::Red, "newark"),
            train(Line::Red, "wtc"),
            train(Line::Blue, "harrison"),
            train(Line::Yellow, "33st"),
            train(Line::Yellow, "journal"),
        ];

        Self {
            stations,
            segments,
            trains,
        }
    }
}

fn build_train(network: &NetworkTopology, id: TrainId, spec: &TrainSpec) -> Result<SimTrain> {
    if spec.route.len() < 2 {
        anyhow::bail!("Route must have at least 2 stations, got {}", spec.route.len());
    }

    let route = spec
        .route
        .iter()
        .map(|key| network.resolve(key).context("Route references an unknown station"))
        .collect::<Result<Vec<StationId>>>()?;

    let mut seen = HashSet::new();
    if let Some(repeat) = route.iter().find(|&&station| !seen.insert(station)) {
        anyhow::bail!(
            "Route visits '{}' more than once",
            network.station(*repeat).key
        );
    }

    for hop in route.windows(2) {
        if !network.are_adjacent(hop[0], hop[1]) {
            warn!(
                "{} line route hops from {} to {} without a connecting segment",
                spec.line.name(),
                network.station(hop[0]).name,
                network.station(hop[1]).name
            );
        }
    }

    let start = network
        .resolve(&spec.start)
        .context("Start station is unknown")?;
    let route_index = route
        .iter()
        .position(|&station| station == start)
        .with_context(|| format!("Start station '{}' is not on the route", spec.start))?;

    let capacity = spec.capacity.unwrap_or(TRAIN_CAPACITY);
    if capacity == 0 {
        anyhow::bail!("Train capacity must be positive");
    }

    let speed = spec.speed.unwrap_or(TRAIN_SPEED);
    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("Train speed must be a positive number, got {}", speed);
    }

    let dwell_ticks = spec.dwell_ticks.unwrap_or(DWELL_TICKS);
    if dwell_ticks == 0 {
        anyhow::bail!("Dwell time must be at least one tick");
    }

    let load_factor = spec
        .load_factor
        .unwrap_or_else(|| spec.line.default_load_factor());
    check_load_factor("Train", load_factor)?;
    let onboard = (f64::from(capacity) * load_factor).floor() as u32;

    Ok(SimTrain::new(
        id,
        spec.line,
        route,
        route_index,
        network.position(start),
        speed,
        capacity,
        onboard,
        dwell_ticks,
    ))
}
