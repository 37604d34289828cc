//! Network-wide statistics
//!
//! Cumulative counters only ever grow. Congestion and the savings projection
//! are recomputed from scratch after every tick.

use serde::Serialize;

use super::network::NetworkTopology;
use super::train::{ExchangeOutcome, SimTrain};

/// Operating cost per passenger in dollars
pub const COST_PER_PASSENGER: f64 = 2.35;

/// Cost reduction dynamic routing achieves per delivered passenger
pub const ROUTING_EFFICIENCY_RATE: f64 = 0.12;

/// Efficiency lost per unit of system congestion
pub const CONGESTION_PENALTY_RATE: f64 = 0.3;

/// Daily ridership the savings projection is scaled to
pub const DAILY_RIDERSHIP: f64 = 5_500_000.0;

pub const STATION_CONGESTION_WEIGHT: f64 = 0.7;
pub const TRAIN_CONGESTION_WEIGHT: f64 = 0.3;

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Counters the network starts with so the first ticks don't read as zero
pub const SEED_TOTAL_GENERATED: u64 = 2000;
pub const SEED_TOTAL_DELIVERED: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Passengers that have entered a station queue
    pub total_generated: u64,

    /// Passengers that have left a train
    pub total_delivered: u64,

    /// Dollars saved by dynamic routing so far
    pub cost_savings_accrued: f64,

    /// Weighted occupancy ratio of the last tick
    pub system_congestion: f64,

    /// `system_congestion` as a percentage
    pub congestion_score: f64,

    pub projected_daily_savings: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// All counters at zero
    pub fn new() -> Self {
        Self {
            total_generated: 0,
            total_delivered: 0,
            cost_savings_accrued: 0.0,
            system_congestion: 0.0,
            congestion_score: 0.0,
            projected_daily_savings: 0.0,
        }
    }

    /// Counters at their seed values
    pub fn seeded() -> Self {
        Self {
            total_generated: SEED_TOTAL_GENERATED,
            total_delivered: SEED_TOTAL_DELIVERED,
            ..Self::new()
        }
    }

    pub fn record_generated(&mut self, passengers: u64) {
        self.total_generated += passengers;
    }

    /// Account for a passenger exchange. Savings only accrue while dynamic
    /// routing is on.
    pub fn record_exchange(&mut self, outcome: &ExchangeOutcome, dynamic_routing: bool) {
        if outcome.alighting == 0 {
            return;
        }
        self.total_delivered += u64::from(outcome.alighting);
        if dynamic_routing {
            self.cost_savings_accrued +=
                f64::from(outcome.alighting) * COST_PER_PASSENGER * ROUTING_EFFICIENCY_RATE;
        }
    }

    /// Replace the per-tick aggregates from the current state
    pub fn recompute(
        &mut self,
        network: &NetworkTopology,
        waiting: &[u32],
        trains: &[SimTrain],
        dynamic_routing: bool,
    ) {
        let congestion = system_congestion(network, waiting, trains);
        self.system_congestion = congestion;
        self.congestion_score = congestion * 100.0;
        self.projected_daily_savings =
            projected_daily_savings(net_efficiency_gain(congestion, dynamic_routing));
    }

    pub fn projected_annual_savings(&self) -> f64 {
        self.projected_daily_savings * DAYS_PER_YEAR
    }

    /// Delivered over generated as a whole percentage, capped at 100
    pub fn system_efficiency(&self) -> u32 {
        if self.total_generated == 0 {
            return 0;
        }
        let percent = self.total_delivered as f64 / self.total_generated as f64 * 100.0;
        percent.round().min(100.0) as u32
    }
}

/// Mean `waiting / capacity` over all stations, 0 for an empty network
pub fn station_congestion(network: &NetworkTopology, waiting: &[u32]) -> f64 {
    let stations = network.stations();
    if stations.is_empty() {
        return 0.0;
    }
    let total: f64 = stations
        .iter()
        .zip(waiting)
        .map(|(station, &queue)| f64::from(queue) / f64::from(station.capacity))
        .sum();
    total / stations.len() as f64
}

/// Mean `onboard / capacity` over all trains, 0 for an empty fleet
pub fn train_congestion(trains: &[SimTrain]) -> f64 {
    if trains.is_empty() {
        return 0.0;
    }
    trains.iter().map(SimTrain::occupancy).sum::<f64>() / trains.len() as f64
}

/// Weighted blend of station and train congestion.
///
/// Defined as 0 when either stations or trains are missing.
pub fn system_congestion(network: &NetworkTopology, waiting: &[u32], trains: &[SimTrain]) -> f64 {
    if network.station_count() == 0 || trains.is_empty() {
        return 0.0;
    }
    STATION_CONGESTION_WEIGHT * station_congestion(network, waiting)
        + TRAIN_CONGESTION_WEIGHT * train_congestion(trains)
}

/// Routing bonus minus the congestion penalty, floored at zero
pub fn net_efficiency_gain(system_congestion: f64, dynamic_routing: bool) -> f64 {
    let bonus = if dynamic_routing {
        ROUTING_EFFICIENCY_RATE
    } else {
        0.0
    };
    (bonus - system_congestion * CONGESTION_PENALTY_RATE).max(0.0)
}

pub fn projected_daily_savings(net_efficiency_gain: f64) -> f64 {
    DAILY_RIDERSHIP * COST_PER_PASSENGER * net_efficiency_gain
}
