//! Road queues and capacity admission
//!
//! A road is a FIFO of vehicles with a physical length in metres; the
//! head of the queue is the vehicle closest to the intersection.
//! Admission is metric: a vehicle enters only if its footprint still
//! fits in the remaining metres, never by counting vehicles.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

use super::types::{Destination, Turn};
use super::vehicle::Vehicle;

/// Errors raised by road queue operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoadError {
    /// Admitting the vehicle would exceed the road's length. Handled
    /// locally by the engine as a blocked event.
    #[error("road is at capacity")]
    CapacityFull,
    /// Dequeue or peek on an empty road. The engine only drains roads
    /// it has scheduled vehicles onto, so this is a programming error.
    #[error("road is empty")]
    Empty,
}

/// State shared by entry and exit roads
#[derive(Debug, Clone)]
pub struct Road {
    name: &'static str,
    speed_kmh: u32,
    length_m: u32,
    queue: VecDeque<Vehicle>,
    occupancy_m: u32,
}

impl Road {
    pub fn new(name: &'static str, speed_kmh: u32, length_m: u32) -> Self {
        Self {
            name,
            speed_kmh,
            length_m,
            queue: VecDeque::new(),
            occupancy_m: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn speed_kmh(&self) -> u32 {
        self.speed_kmh
    }

    pub fn length_m(&self) -> u32 {
        self.length_m
    }

    /// Whether a vehicle of the given footprint still fits
    pub fn can_admit(&self, length_m: u32) -> bool {
        self.occupancy_m + length_m <= self.length_m
    }

    /// Append a vehicle at the tail, or refuse it if it does not fit
    pub fn enqueue(&mut self, vehicle: Vehicle) -> Result<(), RoadError> {
        if !self.can_admit(vehicle.length_m) {
            return Err(RoadError::CapacityFull);
        }
        self.occupancy_m += vehicle.length_m;
        self.queue.push_back(vehicle);
        debug_assert!(self.occupancy_m <= self.length_m);
        Ok(())
    }

    /// Remove and return the head vehicle. Returning by value keeps
    /// the vehicle alive after its queue node is gone.
    pub fn dequeue(&mut self) -> Result<Vehicle, RoadError> {
        let vehicle = self.queue.pop_front().ok_or(RoadError::Empty)?;
        self.occupancy_m -= vehicle.length_m;
        Ok(vehicle)
    }

    /// Peek the head vehicle without removing it
    pub fn front(&self) -> Result<&Vehicle, RoadError> {
        self.queue.front().ok_or(RoadError::Empty)
    }

    /// Number of vehicles currently on the road
    pub fn vehicle_count(&self) -> usize {
        self.queue.len()
    }

    /// Sum of vehicle footprints currently on the road, in metres
    pub fn occupancy_m(&self) -> u32 {
        self.occupancy_m
    }

    /// Vehicles in queue order, head first
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.queue.iter()
    }

    /// Free-flow traversal time in whole seconds, rounded up
    pub fn travel_time_s(&self) -> u64 {
        (u64::from(self.length_m) * 3600).div_ceil(1000 * u64::from(self.speed_kmh))
    }
}

/// Inter-arrival sampling parameters for an entry road's input process
#[derive(Debug, Clone, Copy)]
pub struct InputProcess {
    pub mean_s: u64,
    pub jitter_s: u64,
}

impl InputProcess {
    /// Draw the next inter-arrival interval, uniform over
    /// `[mean - jitter, mean + jitter]`
    pub fn sample(&self, rng: &mut StdRng) -> u64 {
        rng.random_range(self.mean_s - self.jitter_s..=self.mean_s + self.jitter_s)
    }
}

/// A road leading vehicles toward an intersection
///
/// Entry roads carry the turn distribution, the optional input process
/// feeding new vehicles in, and the wiring to the three destination
/// roads. The wiring is fixed at construction and never rebound.
#[derive(Debug, Clone)]
pub struct EntryRoad {
    road: Road,
    /// Probabilities of turning left, going straight, turning right.
    /// Validated at init to sum to 1.
    pub turn_probs: [f64; 3],
    /// `None` for connector roads fed only by upstream intersections
    pub input: Option<InputProcess>,
    destinations: [Destination; 3],
}

impl EntryRoad {
    pub fn new(
        name: &'static str,
        speed_kmh: u32,
        length_m: u32,
        input: Option<InputProcess>,
        turn_probs: [f64; 3],
        destinations: [Destination; 3],
    ) -> Self {
        Self {
            road: Road::new(name, speed_kmh, length_m),
            turn_probs,
            input,
            destinations,
        }
    }

    /// Admit a vehicle: capacity check first, then the turn draw, then
    /// the common enqueue. A refused vehicle costs no turn draw.
    pub fn admit(&mut self, mut vehicle: Vehicle, rng: &mut StdRng) -> Result<(), RoadError> {
        if !self.road.can_admit(vehicle.length_m) {
            return Err(RoadError::CapacityFull);
        }
        vehicle.turn = self.draw_turn(rng);
        self.road.enqueue(vehicle)
    }

    /// Single categorical draw over the normalised turn probabilities
    fn draw_turn(&self, rng: &mut StdRng) -> Turn {
        let [left, straight, _] = self.turn_probs;
        let u: f64 = rng.random();
        if u < left {
            Turn::Left
        } else if u < left + straight {
            Turn::Straight
        } else {
            Turn::Right
        }
    }

    /// Draw the next inter-arrival interval, if this road has a live
    /// input process
    pub fn input_frequency(&self, rng: &mut StdRng) -> Option<u64> {
        self.input.as_ref().map(|process| process.sample(rng))
    }

    /// The wired destination for a turn
    pub fn destination(&self, turn: Turn) -> Destination {
        self.destinations[turn.index()]
    }

    pub fn destinations(&self) -> &[Destination; 3] {
        &self.destinations
    }

    pub fn name(&self) -> &'static str {
        self.road.name()
    }

    pub fn can_admit(&self, length_m: u32) -> bool {
        self.road.can_admit(length_m)
    }

    pub fn dequeue(&mut self) -> Result<Vehicle, RoadError> {
        self.road.dequeue()
    }

    pub fn front(&self) -> Result<&Vehicle, RoadError> {
        self.road.front()
    }

    pub fn travel_time_s(&self) -> u64 {
        self.road.travel_time_s()
    }

    pub fn vehicle_count(&self) -> usize {
        self.road.vehicle_count()
    }

    pub fn road(&self) -> &Road {
        &self.road
    }
}

/// A terminal road; draining the head destroys the vehicle
#[derive(Debug, Clone)]
pub struct ExitRoad {
    road: Road,
}

impl ExitRoad {
    pub fn new(name: &'static str, speed_kmh: u32, length_m: u32) -> Self {
        Self {
            road: Road::new(name, speed_kmh, length_m),
        }
    }

    pub fn name(&self) -> &'static str {
        self.road.name()
    }

    pub fn can_admit(&self, length_m: u32) -> bool {
        self.road.can_admit(length_m)
    }

    pub fn enqueue(&mut self, vehicle: Vehicle) -> Result<(), RoadError> {
        self.road.enqueue(vehicle)
    }

    pub fn dequeue(&mut self) -> Result<Vehicle, RoadError> {
        self.road.dequeue()
    }

    pub fn travel_time_s(&self) -> u64 {
        self.road.travel_time_s()
    }

    pub fn vehicle_count(&self) -> usize {
        self.road.vehicle_count()
    }

    pub fn road(&self) -> &Road {
        &self.road
    }
}
