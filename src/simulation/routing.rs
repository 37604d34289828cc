//! Departure routing
//!
//! Fixed routing walks a route back and forth like a ball between two walls.
//! Dynamic routing may instead send the train to a crowded station on its
//! route that lies close to where it is now.

use log::debug;
use ordered_float::OrderedFloat;
use rand::Rng;

use super::config::ConfigState;
use super::network::NetworkTopology;
use super::types::{Direction, StationId};

/// Half-width of the box searched for crowded stations
pub const NEIGHBORHOOD_RADIUS: f64 = 100.0;

/// Occupancy ratio above which a station counts as crowded
pub const HIGH_DEMAND_RATIO: f64 = 0.7;

/// Chance that a crowded candidate actually overrides the fixed route
pub const REROUTE_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    Fixed,
    Dynamic,
}

impl RoutingMode {
    pub fn from_config(config: &ConfigState) -> Self {
        if config.dynamic_routing {
            RoutingMode::Dynamic
        } else {
            RoutingMode::Fixed
        }
    }
}

/// Where a departing train goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    pub station: StationId,
    /// Index of `station` in the train's route
    pub index: usize,
    /// Direction of travel after the decision
    pub direction: Direction,
    /// True when dynamic routing overrode the fixed route
    pub rerouted: bool,
}

/// Next index on a linear route with reflecting ends.
///
/// Routes have at least two stops, so the result is always in
/// `[0, route_len - 1]`.
pub fn next_fixed_index(
    route_len: usize,
    index: usize,
    direction: Direction,
) -> (usize, Direction) {
    let last = route_len.saturating_sub(1);
    match direction {
        Direction::Forward if index >= last => (last.saturating_sub(1), Direction::Backward),
        Direction::Forward => (index + 1, Direction::Forward),
        Direction::Backward if index == 0 => (1.min(last), Direction::Forward),
        Direction::Backward => (index - 1, Direction::Backward),
    }
}

/// Decides departures for one tick.
///
/// `occupancy` holds the waiting counts captured at the start of the tick,
/// so every train in the tick sees the same picture regardless of the order
/// trains are processed in.
pub struct RoutingPolicy<'a> {
    network: &'a NetworkTopology,
    occupancy: &'a [u32],
    mode: RoutingMode,
}

impl<'a> RoutingPolicy<'a> {
    pub fn new(network: &'a NetworkTopology, occupancy: &'a [u32], mode: RoutingMode) -> Self {
        Self {
            network,
            occupancy,
            mode,
        }
    }

    fn occupancy_ratio(&self, station: StationId) -> f64 {
        let waiting = self.occupancy.get(station.0).copied().unwrap_or(0);
        f64::from(waiting) / f64::from(self.network.station(station).capacity)
    }

    /// The most crowded station near the route's current stop that is also
    /// on the route. Returns its route index and ID.
    ///
    /// Ties go to the lowest station ID.
    pub fn find_high_demand_station(
        &self,
        route: &[StationId],
        index: usize,
    ) -> Option<(usize, StationId)> {
        let current = route[index];
        self.network
            .stations_near(current, NEIGHBORHOOD_RADIUS)
            .into_iter()
            .filter_map(|station| {
                let route_index = route.iter().position(|&s| s == station)?;
                let ratio = self.occupancy_ratio(station);
                (ratio > HIGH_DEMAND_RATIO).then_some((route_index, station, OrderedFloat(ratio)))
            })
            .max_by(|a, b| a.2.cmp(&b.2).then_with(|| b.1.cmp(&a.1)))
            .map(|(route_index, station, _)| (route_index, station))
    }

    /// Pick the next stop for a train leaving `route[index]`
    pub fn next_stop<R: Rng>(
        &self,
        route: &[StationId],
        index: usize,
        direction: Direction,
        rng: &mut R,
    ) -> RouteDecision {
        if self.mode == RoutingMode::Dynamic {
            if let Some((target_index, station)) = self.find_high_demand_station(route, index) {
                if rng.random_bool(REROUTE_PROBABILITY) {
                    debug!(
                        "Rerouting from {} to crowded {}",
                        self.network.station(route[index]).name,
                        self.network.station(station).name
                    );
                    let direction = if target_index > index {
                        Direction::Forward
                    } else {
                        Direction::Backward
                    };
                    return RouteDecision {
                        station,
                        index: target_index,
                        direction,
                        rerouted: true,
                    };
                }
            }
        }

        let (next_index, direction) = next_fixed_index(route.len(), index, direction);
        RouteDecision {
            station: route[next_index],
            index: next_index,
            direction,
            rerouted: false,
        }
    }
}
