//! Subway Simulation Library
//!
//! A tick-based urban rail simulation that can be driven headless from the
//! command line or embedded behind any presentation layer.

pub mod simulation;
