//! Discrete-event traffic simulation core
//!
//! Everything needed to run a simulation lives here: the road FIFOs,
//! the signal controller, the event queue and the engine that drives
//! them. The module has no I/O of its own beyond tracing diagnostics;
//! the binary owns argument parsing and result printing.

mod engine;
mod event;
mod network;
mod report;
mod road;
mod signal;
mod types;
mod vehicle;

pub use engine::Engine;
pub use event::{Event, EventQueue, ScheduledEvent};
pub use network::{
    reference_scenario, ConfigError, Network, Scenario, C1_L, C1_O, L1_L, L1_O, N1_N, N1_S, N2_N,
    N2_S, O1_L, O1_O, S1_N, S1_S, S2_N, S2_S,
};
pub use report::Report;
pub use road::{EntryRoad, ExitRoad, InputProcess, Road, RoadError};
pub use signal::{Phase, SignalController};
pub use types::{
    Destination, EntryRoadId, ExitRoadId, Turn, MAX_VEHICLE_LENGTH_M, MIN_VEHICLE_LENGTH_M,
};
pub use vehicle::Vehicle;
