//! Main simulation world that ties everything together
//!
//! [`advance`] is the pure step function: it takes a state and returns the
//! next one. [`SimWorld`] wraps it with the topology, the control surface and
//! an injected random generator so a host only has to call
//! [`SimWorld::external_tick`] from its timer.

use anyhow::Result;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::config::{CongestionLevel, ConfigState, SimulationClock};
use super::demand;
use super::metrics::Metrics;
use super::network::NetworkTopology;
use super::routing::{RoutingMode, RoutingPolicy};
use super::scenario::Scenario;
use super::snapshot::Snapshot;
use super::train::{SimTrain, TrainUpdateResult};

/// Everything that changes from tick to tick
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub clock: SimulationClock,
    /// Waiting passengers, indexed by station ID
    pub waiting: Vec<u32>,
    /// Trains in processing order
    pub trains: Vec<SimTrain>,
    pub metrics: Metrics,
}

/// Run one logical tick in place.
///
/// Order: arrivals, then every train in fleet order, then metrics. Dynamic
/// routing reads the waiting counts as they were before the tick started.
pub fn step<R: Rng>(
    network: &NetworkTopology,
    state: &mut SimState,
    config: &ConfigState,
    rng: &mut R,
) {
    let occupancy = state.waiting.clone();

    let generated = demand::generate_arrivals(network, &mut state.waiting, config, rng);
    state.metrics.record_generated(generated);

    let policy = RoutingPolicy::new(network, &occupancy, RoutingMode::from_config(config));
    for train in &mut state.trains {
        let result = train.update(network, &mut state.waiting, &policy, rng);

        if let Some(outcome) = result.exchange() {
            state.metrics.record_exchange(&outcome, config.dynamic_routing);
        }

        match result {
            TrainUpdateResult::Departed { from, decision, .. } => {
                debug!(
                    "Train {} ({}) departs {} for {}{}",
                    train.id.0,
                    train.line.name(),
                    network.station(from).name,
                    network.station(decision.station).name,
                    if decision.rerouted { " (rerouted)" } else { "" }
                );
            }
            TrainUpdateResult::Arrived { at } => {
                debug!(
                    "Train {} ({}) arrives at {} with {} onboard",
                    train.id.0,
                    train.line.name(),
                    network.station(at).name,
                    train.onboard
                );
            }
            _ => {}
        }
    }

    state
        .metrics
        .recompute(network, &state.waiting, &state.trains, config.dynamic_routing);
    state.clock.advance();
}

/// Pure form of [`step`]: returns the next state and leaves `state` untouched
pub fn advance<R: Rng>(
    network: &NetworkTopology,
    state: &SimState,
    config: &ConfigState,
    rng: &mut R,
) -> SimState {
    let mut next = state.clone();
    step(network, &mut next, config, rng);
    next
}

/// The main simulation world
pub struct SimWorld<R = StdRng> {
    /// Static station graph
    network: NetworkTopology,

    /// Mutable simulation state
    state: SimState,

    /// User-controlled switches
    config: ConfigState,

    /// Whether external ticks advance the simulation
    running: bool,

    /// Source of all randomness in the simulation
    rng: R,
}

impl SimWorld<StdRng> {
    /// Create the default network with a seeded RNG for reproducible runs
    pub fn new_with_seed(seed: u64) -> Result<Self> {
        Self::from_scenario_with_seed(&Scenario::default_network(), seed)
    }

    pub fn from_scenario_with_seed(scenario: &Scenario, seed: u64) -> Result<Self> {
        Self::from_scenario(scenario, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimWorld<R> {
    /// Build a world from a scenario using the given random generator
    pub fn from_scenario(scenario: &Scenario, rng: R) -> Result<Self> {
        let built = scenario.build()?;
        info!(
            "Built network with {} stations, {} segments and {} trains",
            built.network.station_count(),
            built.network.segment_count(),
            built.state.trains.len()
        );
        Ok(Self {
            network: built.network,
            state: built.state,
            config: ConfigState::default(),
            running: false,
            rng,
        })
    }

    pub fn network(&self) -> &NetworkTopology {
        &self.network
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Flip between running and paused, returning the new state
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_congestion_level(&mut self, level: CongestionLevel) {
        self.config.congestion_level = level;
    }

    pub fn set_rush_hour(&mut self, enabled: bool) {
        self.config.rush_hour = enabled;
    }

    pub fn toggle_rush_hour(&mut self) -> bool {
        self.config.rush_hour = !self.config.rush_hour;
        self.config.rush_hour
    }

    pub fn set_dynamic_routing(&mut self, enabled: bool) {
        self.config.dynamic_routing = enabled;
    }

    pub fn toggle_dynamic_routing(&mut self) -> bool {
        self.config.dynamic_routing = !self.config.dynamic_routing;
        self.config.dynamic_routing
    }

    /// Set the speed multiplier, see [`SimulationClock::set_speed_multiplier`]
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> Result<f64> {
        self.state.clock.set_speed_multiplier(multiplier)
    }

    /// Run exactly one logical tick, whether or not the world is running
    pub fn tick(&mut self) {
        step(&self.network, &mut self.state, &self.config, &mut self.rng);
    }

    /// Handle one tick of the host's timer.
    ///
    /// Does nothing while paused. Otherwise runs as many logical ticks as the
    /// speed multiplier has accumulated and returns that number.
    pub fn external_tick(&mut self) -> u32 {
        if !self.running {
            return 0;
        }
        let ticks = self.state.clock.take_budget();
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    pub fn run_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.network, &self.state, &self.config, self.running)
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let seconds = self.state.clock.elapsed_seconds() as u64;

        println!("=== Subway Simulation Summary ===");
        println!(
            "Tick: {} ({}:{:02} simulated), speed {}x, {}",
            snapshot.tick,
            seconds / 60,
            seconds % 60,
            snapshot.speed_multiplier,
            if snapshot.running { "running" } else { "paused" }
        );
        println!(
            "Congestion level: {}, rush hour: {}, dynamic routing: {}",
            self.config.congestion_level,
            if self.config.rush_hour { "on" } else { "off" },
            if self.config.dynamic_routing { "on" } else { "off" }
        );
        println!();

        let metrics = &snapshot.metrics;
        println!("--- Live Statistics ---");
        println!("  Total passengers: {}", metrics.total_generated);
        println!("  Passengers delivered: {}", metrics.total_delivered);
        println!("  System efficiency: {}%", metrics.system_efficiency);
        println!("  Congestion score: {:.0}%", metrics.congestion_score);
        println!("  Current savings: ${:.2}", metrics.cost_savings_accrued);
        println!("  Projected daily savings: ${:.2}", metrics.projected_daily_savings);
        println!("  Projected annual savings: ${:.2}", metrics.projected_annual_savings);

        println!("--- Station Status ---");
        for station in snapshot.stations_by_occupancy() {
            println!(
                "  {:<22} {:>5}/{:<5} waiting ({:.0}%)",
                station.name,
                station.waiting,
                station.capacity,
                station.occupancy() * 100.0
            );
        }

        println!("--- Trains ---");
        for train in &snapshot.trains {
            let whereabouts = match train.next_station {
                Some(next) => format!("heading to {}", self.network.station(next).name),
                None => format!("at {}", self.network.station(train.current_station).name),
            };
            println!(
                "  Train {} ({}): {}/{} onboard, ({:.1}, {:.1}), {}",
                train.id.0,
                train.line.name(),
                train.onboard,
                train.capacity,
                train.position.x,
                train.position.y,
                whereabouts
            );
        }
    }

    /// Draw a visual map of the network in the terminal
    pub fn draw_map(&self) {
        let stations = self.network.stations();
        if stations.is_empty() {
            println!("(empty network)");
            return;
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for station in stations {
            min_x = min_x.min(station.position.x);
            max_x = max_x.max(station.position.x);
            min_y = min_y.min(station.position.y);
            max_y = max_y.max(station.position.y);
        }

        // Map units per character; rows are taller than columns are wide
        let x_scale = 0.2;
        let y_scale = 0.1;
        let width = ((max_x - min_x) * x_scale) as usize + 3;
        let height = ((max_y - min_y) * y_scale) as usize + 3;
        let mut grid = vec![vec![' '; width]; height];

        let to_grid = |x: f64, y: f64| -> (usize, usize) {
            let col = ((x - min_x) * x_scale).round().max(0.0) as usize + 1;
            let row = ((y - min_y) * y_scale).round().max(0.0) as usize + 1;
            (row.min(height - 1), col.min(width - 1))
        };

        // Segments, sampled along their length
        for segment in self.network.segments() {
            let from = self.network.position(segment.from);
            let to = self.network.position(segment.to);
            let samples = (from.distance(&to) * x_scale).ceil().max(1.0) as usize * 2;
            for i in 0..=samples {
                if segment.line.is_dashed() && i % 2 == 1 {
                    continue;
                }
                let t = i as f64 / samples as f64;
                let (row, col) = to_grid(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
                if grid[row][col] == ' ' {
                    grid[row][col] = segment.line.map_glyph();
                }
            }
        }

        // Stations, marked by how crowded they are
        for (station, &waiting) in stations.iter().zip(&self.state.waiting) {
            let occupancy = f64::from(waiting) / f64::from(station.capacity);
            let (row, col) = to_grid(station.position.x, station.position.y);
            grid[row][col] = if occupancy > 0.8 {
                '!'
            } else if occupancy > 0.5 {
                '*'
            } else {
                'O'
            };
        }

        for train in &self.state.trains {
            let (row, col) = to_grid(train.position.x, train.position.y);
            grid[row][col] = 'T';
        }

        println!("\n=== Network Map ===");
        println!("Legend: O=Station, *=Busy (>50%), !=Crowded (>80%), T=Train, = red, ~ blue, : yellow");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line.trim_end());
        }
        println!();
    }
}
