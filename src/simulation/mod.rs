//! Standalone subway simulation module
//!
//! This module contains all the core simulation logic: the station graph,
//! passenger arrivals, the train state machine, routing and metrics. It has
//! no presentation code and can be driven from a console or a test.

mod config;
mod demand;
mod metrics;
mod network;
mod routing;
mod scenario;
mod snapshot;
mod train;
mod types;
mod world;

pub use config::{
    CongestionLevel, ConfigState, SimulationClock, MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER,
};
pub use demand::{
    arrival_rate_per_minute, arrival_rate_per_tick, draw_arrivals, generate_arrivals,
    RUSH_HOUR_MULTIPLIER, TICKS_PER_MINUTE,
};
pub use metrics::{
    net_efficiency_gain, projected_daily_savings, station_congestion, system_congestion,
    train_congestion, Metrics, COST_PER_PASSENGER, DAILY_RIDERSHIP, ROUTING_EFFICIENCY_RATE,
    SEED_TOTAL_DELIVERED, SEED_TOTAL_GENERATED,
};
pub use network::{NetworkTopology, Segment, Station};
pub use routing::{
    next_fixed_index, RouteDecision, RoutingMode, RoutingPolicy, HIGH_DEMAND_RATIO,
    NEIGHBORHOOD_RADIUS, REROUTE_PROBABILITY,
};
pub use scenario::{BuiltScenario, Scenario, SegmentSpec, StationSpec, TrainSpec};
pub use snapshot::{MetricsSnapshot, Snapshot, StationSnapshot, TrainSnapshot};
pub use train::{
    exchange_passengers, ExchangeOutcome, SimTrain, TrainState, TrainUpdateResult, DWELL_TICKS,
    TRAIN_CAPACITY, TRAIN_SPEED,
};
pub use types::{Direction, Line, Position, StationId, TrainId};
pub use world::{advance, step, SimState, SimWorld};
