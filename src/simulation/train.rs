//! Train movement and passenger exchange
//!
//! A train is either dwelling at a station or travelling in a straight line
//! towards the next one. Passengers are exchanged once, on the first tick of
//! each dwell.

use rand::Rng;

use super::network::NetworkTopology;
use super::routing::{RouteDecision, RoutingPolicy};
use super::types::{Direction, Line, Position, StationId, TrainId};

/// Ticks a train waits at a station before departing
pub const DWELL_TICKS: u32 = 15;

/// Map units travelled per tick
pub const TRAIN_SPEED: f64 = 2.0;

/// Passenger capacity of a train
pub const TRAIN_CAPACITY: u32 = 300;

/// Percentage of onboard passengers leaving at every stop
pub const ALIGHTING_PERCENT: u64 = 30;

/// Result of one passenger exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub alighting: u32,
    pub boarding: u32,
}

/// Work out who gets off and on.
///
/// `alighting` is 30% of `onboard`, floored. `boarding` is limited both by
/// the passengers waiting and by the room left after alighting.
pub fn exchange_passengers(onboard: u32, capacity: u32, waiting: u32) -> ExchangeOutcome {
    let alighting = (u64::from(onboard) * ALIGHTING_PERCENT / 100) as u32;
    let staying = onboard - alighting;
    let boarding = waiting.min(capacity.saturating_sub(staying));
    ExchangeOutcome {
        alighting,
        boarding,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    /// Dwelling at `route[route_index]`
    AtStation { dwell_elapsed: u32 },
    /// Travelling towards `next_station`, which is `route[next_index]`
    InTransit {
        next_station: StationId,
        next_index: usize,
    },
}

/// What happened to a train during one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainUpdateResult {
    /// Waiting out the dwell time
    Dwelling,
    /// Arrival tick at a station: passengers were exchanged
    Exchanged(ExchangeOutcome),
    /// Dwell finished and the train left. Carries the exchange too when the
    /// dwell time is a single tick.
    Departed {
        from: StationId,
        decision: RouteDecision,
        exchange: Option<ExchangeOutcome>,
    },
    /// Still travelling
    Moving,
    /// Reached the next station; the exchange happens on the next update
    Arrived { at: StationId },
}

impl TrainUpdateResult {
    pub fn exchange(&self) -> Option<ExchangeOutcome> {
        match self {
            TrainUpdateResult::Exchanged(outcome) => Some(*outcome),
            TrainUpdateResult::Departed { exchange, .. } => *exchange,
            _ => None,
        }
    }
}

/// A train in the subway simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimTrain {
    pub id: TrainId,
    pub line: Line,
    /// Stops in order; at least two, no repeats
    pub route: Vec<StationId>,
    /// Index of the current station in `route`
    pub route_index: usize,
    pub direction: Direction,
    pub position: Position,
    pub speed: f64,
    pub capacity: u32,
    pub onboard: u32,
    pub dwell_ticks: u32,
    pub state: TrainState,
}

impl SimTrain {
    /// Create a train dwelling at `route[route_index]`, about to exchange
    /// passengers
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TrainId,
        line: Line,
        route: Vec<StationId>,
        route_index: usize,
        position: Position,
        speed: f64,
        capacity: u32,
        onboard: u32,
        dwell_ticks: u32,
    ) -> Self {
        Self {
            id,
            line,
            route,
            route_index,
            direction: Direction::Forward,
            position,
            speed,
            capacity,
            onboard: onboard.min(capacity),
            dwell_ticks,
            state: TrainState::AtStation { dwell_elapsed: 0 },
        }
    }

    pub fn current_station(&self) -> StationId {
        self.route[self.route_index]
    }

    pub fn next_station(&self) -> Option<StationId> {
        match self.state {
            TrainState::InTransit { next_station, .. } => Some(next_station),
            TrainState::AtStation { .. } => None,
        }
    }

    pub fn is_at_station(&self) -> bool {
        matches!(self.state, TrainState::AtStation { .. })
    }

    /// Onboard passengers as a share of capacity
    pub fn occupancy(&self) -> f64 {
        f64::from(self.onboard) / f64::from(self.capacity)
    }

    /// Advance this train by one tick.
    ///
    /// `waiting` is the live per-station queue, indexed by station ID.
    pub fn update<R: Rng>(
        &mut self,
        network: &NetworkTopology,
        waiting: &mut [u32],
        policy: &RoutingPolicy<'_>,
        rng: &mut R,
    ) -> TrainUpdateResult {
        match self.state {
            TrainState::AtStation { dwell_elapsed } => {
                let exchange = (dwell_elapsed == 0).then(|| self.exchange(waiting));
                let dwell_elapsed = dwell_elapsed + 1;

                if dwell_elapsed >= self.dwell_ticks {
                    let from = self.current_station();
                    let decision =
                        policy.next_stop(&self.route, self.route_index, self.direction, rng);
                    self.direction = decision.direction;
                    self.state = TrainState::InTransit {
                        next_station: decision.station,
                        next_index: decision.index,
                    };
                    return TrainUpdateResult::Departed {
                        from,
                        decision,
                        exchange,
                    };
                }

                self.state = TrainState::AtStation { dwell_elapsed };
                match exchange {
                    Some(outcome) => TrainUpdateResult::Exchanged(outcome),
                    None => TrainUpdateResult::Dwelling,
                }
            }
            TrainState::InTransit {
                next_station,
                next_index,
            } => {
                let target = network.position(next_station);
                if self.position.distance(&target) < self.speed {
                    self.position = target;
                    self.route_index = next_index;
                    self.state = TrainState::AtStation { dwell_elapsed: 0 };
                    return TrainUpdateResult::Arrived { at: next_station };
                }

                self.position = self.position.step_towards(&target, self.speed);
                TrainUpdateResult::Moving
            }
        }
    }

    /// Swap passengers with the current station's queue
    fn exchange(&mut self, waiting: &mut [u32]) -> ExchangeOutcome {
        let queue = &mut waiting[self.current_station().0];
        let outcome = exchange_passengers(self.onboard, self.capacity, *queue);
        self.onboard = self.onboard - outcome.alighting + outcome.boarding;
        *queue -= outcome.boarding;
        outcome
    }
}
