//! Read-only views of the simulation for the presentation layer

use serde::Serialize;

use super::config::ConfigState;
use super::network::NetworkTopology;
use super::types::{Line, Position, StationId, TrainId};
use super::world::SimState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub id: StationId,
    pub key: String,
    pub name: String,
    pub position: Position,
    pub waiting: u32,
    pub capacity: u32,
}

impl StationSnapshot {
    pub fn occupancy(&self) -> f64 {
        f64::from(self.waiting) / f64::from(self.capacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainSnapshot {
    pub id: TrainId,
    pub position: Position,
    pub line: Line,
    pub onboard: u32,
    pub capacity: u32,
    pub current_station: StationId,
    pub next_station: Option<StationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_generated: u64,
    pub total_delivered: u64,
    pub congestion_score: f64,
    pub cost_savings_accrued: f64,
    pub projected_daily_savings: f64,
    pub projected_annual_savings: f64,
    pub system_efficiency: u32,
}

/// Everything the presentation layer may show after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub running: bool,
    pub speed_multiplier: f64,
    pub config: ConfigState,
    pub stations: Vec<StationSnapshot>,
    pub trains: Vec<TrainSnapshot>,
    pub metrics: MetricsSnapshot,
}

impl Snapshot {
    pub fn capture(
        network: &NetworkTopology,
        state: &SimState,
        config: &ConfigState,
        running: bool,
    ) -> Self {
        let stations = network
            .stations()
            .iter()
            .zip(&state.waiting)
            .map(|(station, &waiting)| StationSnapshot {
                id: station.id,
                key: station.key.clone(),
                name: station.name.clone(),
                position: station.position,
                waiting,
                capacity: station.capacity,
            })
            .collect();

        let trains = state
            .trains
            .iter()
            .map(|train| TrainSnapshot {
                id: train.id,
                position: train.position,
                line: train.line,
                onboard: train.onboard,
                capacity: train.capacity,
                current_station: train.current_station(),
                next_station: train.next_station(),
            })
            .collect();

        let metrics = &state.metrics;
        Self {
            tick: state.clock.tick(),
            running,
            speed_multiplier: state.clock.speed_multiplier(),
            config: *config,
            stations,
            trains,
            metrics: MetricsSnapshot {
                total_generated: metrics.total_generated,
                total_delivered: metrics.total_delivered,
                congestion_score: metrics.congestion_score,
                cost_savings_accrued: metrics.cost_savings_accrued,
                projected_daily_savings: metrics.projected_daily_savings,
                projected_annual_savings: metrics.projected_annual_savings(),
                system_efficiency: metrics.system_efficiency(),
            },
        }
    }

    /// Stations ordered from most to least crowded
    pub fn stations_by_occupancy(&self) -> Vec<&StationSnapshot> {
        let mut stations: Vec<&StationSnapshot> = self.stations.iter().collect();
        stations.sort_by(|a, b| b.occupancy().total_cmp(&a.occupancy()));
        stations
    }
}
