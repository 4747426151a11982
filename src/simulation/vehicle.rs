//! Vehicles queued on roads
//!
//! A vehicle is a value: a footprint in metres and a turn intention.
//! The footprint is drawn once at creation; the turn is re-drawn by
//! every entry road that admits the vehicle.

use rand::rngs::StdRng;
use rand::Rng;

use super::types::{Turn, MAX_VEHICLE_LENGTH_M, MIN_VEHICLE_LENGTH_M};

/// A vehicle occupying space on a road
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Footprint in metres, body plus front and rear gaps
    pub length_m: u32,
    /// Current turn intention; meaningless until an entry road admits
    /// the vehicle and draws it from its own distribution
    pub turn: Turn,
}

impl Vehicle {
    /// Create a vehicle with a uniformly drawn footprint.
    ///
    /// The draw happens before any admission check, so a vehicle that
    /// is then turned away at a full road still consumed one draw.
    pub fn with_random_length(rng: &mut StdRng) -> Self {
        Self {
            length_m: rng.random_range(MIN_VEHICLE_LENGTH_M..=MAX_VEHICLE_LENGTH_M),
            turn: Turn::Straight,
        }
    }

    /// Create a vehicle with a fixed footprint
    pub fn with_length(length_m: u32) -> Self {
        Self {
            length_m,
            turn: Turn::Straight,
        }
    }
}
