//! The drive loop: clock, counters, and event dispatch
//!
//! The engine owns the roads, the signal controller, the event queue
//! and the single seeded RNG. Time advances by whole seconds; each
//! step drains every due event, defers the blocked ones, and jumps
//! over stretches where nothing can fire.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use super::event::{Event, EventQueue, ScheduledEvent};
use super::network::{ConfigError, Network, Scenario};
use super::report::Report;
use super::road::RoadError;
use super::signal::SignalController;
use super::types::{Destination, EntryRoadId};
use super::vehicle::Vehicle;

/// Outcome of dispatching a single due event
enum Outcome {
    /// The event fired, was retired, and queued its follow-ups
    Fired,
    /// A precondition failed; the event goes back for a later tick
    Blocked(ScheduledEvent),
}

/// The simulation engine
pub struct Engine {
    execution_time_s: u64,
    clock_s: u64,
    network: Network,
    signal: SignalController,
    queue: EventQueue,
    rng: StdRng,
    input_count: u64,
    output_count: u64,
    exchange_count: u64,
    phase_change_count: u64,
}

impl Engine {
    /// Validate the scenario, build the signal controller and seed the
    /// queue: one INPUT per entry road with a live input process (in
    /// index order, which fixes the RNG draw order) and the first
    /// SIGNAL one phase duration out.
    pub fn new(
        scenario: Scenario,
        execution_time_s: u64,
        phase_duration_s: u64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let Scenario { network, phases } = scenario;

        let signal = SignalController::new(phase_duration_s, phases);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut queue = EventQueue::new();

        for (index, road) in network.entries().iter().enumerate() {
            if let Some(process) = road.input {
                queue.schedule(process.sample(&mut rng), Event::Input(EntryRoadId(index)));
            }
        }
        queue.schedule(phase_duration_s, Event::Signal);

        Ok(Self {
            execution_time_s,
            clock_s: 0,
            network,
            signal,
            queue,
            rng,
            input_count: 0,
            output_count: 0,
            exchange_count: 0,
            phase_change_count: 0,
        })
    }

    /// Run the drive loop to the end of the simulated time
    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// One outer drive-loop iteration: drain due events, advance the
    /// clock. Returns `false` once the clock has passed the execution
    /// time.
    pub fn step(&mut self) -> Result<bool> {
        if self.clock_s > self.execution_time_s {
            return Ok(false);
        }

        let mut events_made = 0u32;
        let mut deferred: Vec<ScheduledEvent> = Vec::new();

        while let Some(front) = self.queue.peek() {
            if front.fire_time_s > self.clock_s {
                break;
            }
            let Some(scheduled) = self.queue.pop() else {
                break;
            };
            match self.dispatch(scheduled)? {
                Outcome::Fired => {
                    events_made += 1;
                    // A success may have unblocked an earlier event;
                    // re-examine the deferred ones from the front.
                    for event in deferred.drain(..) {
                        self.queue.reinsert(event);
                    }
                }
                Outcome::Blocked(event) => deferred.push(event),
            }
        }

        // First future event, read before the blocked ones go back.
        let next_fire = self.queue.peek().map(|event| event.fire_time_s);
        for event in deferred {
            self.queue.reinsert(event);
        }

        self.clock_s += 1;
        if events_made == 0 {
            // Idle tick: jump to the next scheduled event instead of
            // crawling one second at a time.
            if let Some(at) = next_fire {
                if at > self.clock_s {
                    self.clock_s = at;
                }
            }
        }

        Ok(self.clock_s <= self.execution_time_s)
    }

    fn dispatch(&mut self, scheduled: ScheduledEvent) -> Result<Outcome> {
        match scheduled.event {
            Event::Signal => {
                self.signal.change();
                self.phase_change_count += 1;
                self.queue
                    .schedule(self.clock_s + self.signal.phase_duration_s(), Event::Signal);
                trace!(
                    clock_s = self.clock_s,
                    phase = self.signal.current_phase(),
                    "signal phase change"
                );
                Ok(Outcome::Fired)
            }

            Event::Output(id) => {
                let name = self.network.exit(id).name();
                let vehicle = self
                    .network
                    .exit_mut(id)
                    .dequeue()
                    .with_context(|| format!("output event fired on empty exit road {name}"))?;
                self.output_count += 1;
                trace!(
                    clock_s = self.clock_s,
                    road = name,
                    length_m = vehicle.length_m,
                    "vehicle left the network"
                );
                Ok(Outcome::Fired)
            }

            Event::Input(id) => {
                let vehicle = Vehicle::with_random_length(&mut self.rng);
                let road = self.network.entry_mut(id);
                match road.admit(vehicle, &mut self.rng) {
                    Ok(()) => {}
                    Err(RoadError::CapacityFull) => {
                        debug!(
                            clock_s = self.clock_s,
                            road = road.name(),
                            "input blocked: road is full"
                        );
                        return Ok(Outcome::Blocked(scheduled));
                    }
                    Err(err) => {
                        return Err(err).context("vehicle admission failed unexpectedly");
                    }
                }
                self.input_count += 1;

                let travel = road.travel_time_s();
                let next_arrival = road
                    .input_frequency(&mut self.rng)
                    .context("input event targeted a road without an input process")?;
                trace!(
                    clock_s = self.clock_s,
                    road = self.network.entry(id).name(),
                    "vehicle entered the network"
                );

                self.queue.schedule(self.clock_s + travel, Event::Change(id));
                self.queue
                    .schedule(scheduled.fire_time_s + next_arrival, Event::Input(id));
                Ok(Outcome::Fired)
            }

            Event::Change(id) => {
                if !self.signal.open(id) {
                    debug!(
                        clock_s = self.clock_s,
                        road = self.network.entry(id).name(),
                        "change blocked: signal is red"
                    );
                    return Ok(Outcome::Blocked(scheduled));
                }

                let name = self.network.entry(id).name();
                let (turn, head_length) = {
                    let head = self
                        .network
                        .entry(id)
                        .front()
                        .with_context(|| format!("change event fired on empty entry road {name}"))?;
                    (head.turn, head.length_m)
                };

                match self.network.entry(id).destination(turn) {
                    Destination::Entry(dest) => {
                        if !self.network.entry(dest).can_admit(head_length) {
                            debug!(
                                clock_s = self.clock_s,
                                from = name,
                                to = self.network.entry(dest).name(),
                                "change blocked: destination is full"
                            );
                            return Ok(Outcome::Blocked(scheduled));
                        }
                        let vehicle = self
                            .network
                            .entry_mut(id)
                            .dequeue()
                            .with_context(|| format!("dequeuing the head of {name}"))?;
                        self.network
                            .entry_mut(dest)
                            .admit(vehicle, &mut self.rng)
                            .context("transfer failed after capacity check")?;
                        self.exchange_count += 1;

                        let travel = self.network.entry(dest).travel_time_s();
                        self.queue
                            .schedule(self.clock_s + travel, Event::Change(dest));
                        trace!(
                            clock_s = self.clock_s,
                            from = name,
                            to = self.network.entry(dest).name(),
                            "lane change"
                        );
                    }
                    Destination::Exit(dest) => {
                        if !self.network.exit(dest).can_admit(head_length) {
                            debug!(
                                clock_s = self.clock_s,
                                from = name,
                                to = self.network.exit(dest).name(),
                                "change blocked: destination is full"
                            );
                            return Ok(Outcome::Blocked(scheduled));
                        }
                        let vehicle = self
                            .network
                            .entry_mut(id)
                            .dequeue()
                            .with_context(|| format!("dequeuing the head of {name}"))?;
                        self.network
                            .exit_mut(dest)
                            .enqueue(vehicle)
                            .context("transfer failed after capacity check")?;
                        self.exchange_count += 1;

                        let travel = self.network.exit(dest).travel_time_s();
                        self.queue
                            .schedule(self.clock_s + travel, Event::Output(dest));
                        trace!(
                            clock_s = self.clock_s,
                            from = name,
                            to = self.network.exit(dest).name(),
                            "lane change"
                        );
                    }
                }

                // Crossing the intersection consumes one simulated
                // second, which bounds throughput through it.
                self.clock_s += 1;
                Ok(Outcome::Fired)
            }
        }
    }

    pub fn clock_s(&self) -> u64 {
        self.clock_s
    }

    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    pub fn output_count(&self) -> u64 {
        self.output_count
    }

    pub fn exchange_count(&self) -> u64 {
        self.exchange_count
    }

    pub fn phase_change_count(&self) -> u64 {
        self.phase_change_count
    }

    pub fn events_remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn signal(&self) -> &SignalController {
        &self.signal
    }

    /// Snapshot the counters into the final result block
    pub fn report(&self) -> Report {
        Report {
            input_count: self.input_count,
            vehicles_on_roads: self.network.vehicles_on_roads(),
            output_count: self.output_count,
            exchange_count: self.exchange_count,
            phase_change_count: self.phase_change_count,
            events_remaining: self.queue.len() as u64,
            live_inputs: self.network.live_inputs(),
        }
    }
}
