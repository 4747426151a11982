//! Result accounting printed at the end of a run

use std::fmt;

/// Final counter read-out plus the two integrity identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub input_count: u64,
    pub vehicles_on_roads: u64,
    pub output_count: u64,
    pub exchange_count: u64,
    pub phase_change_count: u64,
    pub events_remaining: u64,
    pub live_inputs: u64,
}

impl Report {
    /// Every vehicle that entered either left or is still on a road
    pub fn conserves_vehicles(&self) -> bool {
        self.input_count == self.output_count + self.vehicles_on_roads
    }

    /// Outstanding events are one per live input process, one signal,
    /// and one per vehicle still travelling
    pub fn events_account_for_vehicles(&self) -> bool {
        self.events_remaining == self.live_inputs + 1 + self.vehicles_on_roads
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20} | Count", "Operation")?;
        writeln!(f, "{:<20} | {}", "Vehicle input", self.input_count)?;
        writeln!(f, "{:<20} | {}", "Vehicles on roads", self.vehicles_on_roads)?;
        writeln!(f, "{:<20} | {}", "Vehicle output", self.output_count)?;
        writeln!(f, "{:<20} | {}", "Lane changes", self.exchange_count)?;
        writeln!(f, "{:<20} | {}", "Signal changes", self.phase_change_count)?;
        writeln!(f, "{:<20} | {}", "Events remaining", self.events_remaining)?;
        writeln!(f, "Integrity:")?;
        writeln!(
            f,
            "input - on_roads = output:  {} - {} = {}",
            self.input_count, self.vehicles_on_roads, self.output_count
        )?;
        writeln!(
            f,
            "events_remaining - live_inputs - 1 = on_roads:  {} - {} - 1 = {}",
            self.events_remaining,
            self.live_inputs,
            self.events_remaining.saturating_sub(self.live_inputs + 1)
        )
    }
}
