//! Passenger arrivals at stations
//!
//! Arrivals are drawn uniformly below the expected per-tick rate and floored,
//! so a station whose rate is under one passenger per tick only ever sees
//! zero or one arrival.

use log::trace;
use rand::Rng;

use super::config::ConfigState;
use super::network::{NetworkTopology, Station};

/// Arrival rate multiplier while rush hour is on
pub const RUSH_HOUR_MULTIPLIER: f64 = 2.5;

/// Base rates are per minute, ticks are per second
pub const TICKS_PER_MINUTE: f64 = 60.0;

/// Expected arrivals per minute at a station under the given config
pub fn arrival_rate_per_minute(station: &Station, config: &ConfigState) -> f64 {
    let rush = if config.rush_hour {
        RUSH_HOUR_MULTIPLIER
    } else {
        1.0
    };
    station.base_rate * rush * config.congestion_level.multiplier()
}

/// Expected arrivals per tick at a station under the given config
pub fn arrival_rate_per_tick(station: &Station, config: &ConfigState) -> f64 {
    arrival_rate_per_minute(station, config) / TICKS_PER_MINUTE
}

/// Draw an arrival count uniformly from `[0, rate)`, floored
pub fn draw_arrivals<R: Rng>(rate_per_tick: f64, rng: &mut R) -> u32 {
    let sample: f64 = rng.random();
    if rate_per_tick <= 0.0 {
        return 0;
    }
    (sample * rate_per_tick).floor() as u32
}

/// Add this tick's arrivals to every station's queue.
///
/// Stations are visited in ID order and each one consumes exactly one random
/// draw, so the generator stream does not depend on the config. Returns the
/// number of passengers generated.
pub fn generate_arrivals<R: Rng>(
    network: &NetworkTopology,
    waiting: &mut [u32],
    config: &ConfigState,
    rng: &mut R,
) -> u64 {
    let mut generated = 0u64;
    for (station, queue) in network.stations().iter().zip(waiting.iter_mut()) {
        let arrivals = draw_arrivals(arrival_rate_per_tick(station, config), rng);
        if arrivals > 0 {
            trace!("{} arrivals at {}", arrivals, station.name);
            *queue = queue.saturating_add(arrivals);
            generated += u64::from(arrivals);
        }
    }
    generated
}
