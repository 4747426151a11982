//! Core types for the traffic simulation
//!
//! Road references are plain indices into the engine-owned arrays, so
//! the intersection wiring is a pure index graph with no shared
//! ownership.

/// Index of an entry road in the engine's entry-road array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRoadId(pub usize);

/// Index of an exit road in the engine's exit-road array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitRoadId(pub usize);

/// A vehicle's turn intention, drawn each time it enters an entry road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Straight,
    Right,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Left, Turn::Straight, Turn::Right];

    /// Position of this turn in a `[left, straight, right]` triple
    pub fn index(self) -> usize {
        match self {
            Turn::Left => 0,
            Turn::Straight => 1,
            Turn::Right => 2,
        }
    }
}

/// Where an entry road hands its head vehicle for a given turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Another entry road; the vehicle keeps travelling
    Entry(EntryRoadId),
    /// A terminal road; the vehicle leaves the system when it drains
    Exit(ExitRoadId),
}

/// Shortest vehicle footprint: 2 m body + 2 m front gap + 1 m rear gap
pub const MIN_VEHICLE_LENGTH_M: u32 = 5;

/// Longest vehicle footprint: 6 m body + 2 m front gap + 1 m rear gap
pub const MAX_VEHICLE_LENGTH_M: u32 = 9;
