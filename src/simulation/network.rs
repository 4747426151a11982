//! Road network wiring, the reference scenario, and config validation
//!
//! The engine owns every road in two arrays; entry roads reference
//! their destinations by index. Validation runs once before the first
//! event and rejects configurations the drive loop cannot execute
//! safely.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use super::road::{EntryRoad, ExitRoad, InputProcess};
use super::signal::Phase;
use super::types::{Destination, EntryRoadId, ExitRoadId, Turn, MIN_VEHICLE_LENGTH_M};

/// Tolerance when checking that turn probabilities sum to 1
const TURN_PROB_TOLERANCE: f64 = 1e-6;

/// Configuration errors detected before the simulation starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("turn probabilities on {road} sum to {sum}, expected 1.0")]
    TurnProbabilities { road: &'static str, sum: f64 },
    #[error("road {road} is shorter ({length_m} m) than the smallest vehicle")]
    CapacityTooSmall { road: &'static str, length_m: u32 },
    #[error("invalid input interval on {road}: mean {mean_s} s, jitter {jitter_s} s")]
    InputInterval {
        road: &'static str,
        mean_s: u64,
        jitter_s: u64,
    },
    #[error("{road} wires {turn:?} to an unknown road")]
    DanglingDestination { road: &'static str, turn: Turn },
    #[error("signal phase partition is empty")]
    EmptyPhasePartition,
    #[error("phase {phase} references entry road index {index}, which does not exist")]
    PhaseMember { phase: usize, index: usize },
    #[error("no route from entry road {road} to any exit road")]
    NoRouteToExit { road: &'static str },
}

/// The fixed road graph: entry roads indexed by [`EntryRoadId`], exit
/// roads by [`ExitRoadId`]
#[derive(Debug, Clone)]
pub struct Network {
    entries: Vec<EntryRoad>,
    exits: Vec<ExitRoad>,
}

impl Network {
    pub fn new(entries: Vec<EntryRoad>, exits: Vec<ExitRoad>) -> Self {
        Self { entries, exits }
    }

    pub fn entry(&self, id: EntryRoadId) -> &EntryRoad {
        &self.entries[id.0]
    }

    pub fn entry_mut(&mut self, id: EntryRoadId) -> &mut EntryRoad {
        &mut self.entries[id.0]
    }

    pub fn exit(&self, id: ExitRoadId) -> &ExitRoad {
        &self.exits[id.0]
    }

    pub fn exit_mut(&mut self, id: ExitRoadId) -> &mut ExitRoad {
        &mut self.exits[id.0]
    }

    pub fn entries(&self) -> &[EntryRoad] {
        &self.entries
    }

    pub fn exits(&self) -> &[ExitRoad] {
        &self.exits
    }

    /// Total vehicles currently queued anywhere in the network
    pub fn vehicles_on_roads(&self) -> u64 {
        let on_entries: usize = self.entries.iter().map(EntryRoad::vehicle_count).sum();
        let on_exits: usize = self.exits.iter().map(ExitRoad::vehicle_count).sum();
        (on_entries + on_exits) as u64
    }

    /// Number of entry roads with a live input process
    pub fn live_inputs(&self) -> u64 {
        self.entries.iter().filter(|road| road.input.is_some()).count() as u64
    }
}

/// A network plus the signal phase partition over its entry roads
#[derive(Debug, Clone)]
pub struct Scenario {
    pub network: Network,
    pub phases: Vec<Phase>,
}

impl Scenario {
    /// Check everything the drive loop assumes. Called by the engine
    /// before any event is seeded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = self.network.entries();
        let exits = self.network.exits();

        for road in entries {
            let sum: f64 = road.turn_probs.iter().sum();
            if (sum - 1.0).abs() > TURN_PROB_TOLERANCE {
                return Err(ConfigError::TurnProbabilities {
                    road: road.name(),
                    sum,
                });
            }
            if road.road().length_m() < MIN_VEHICLE_LENGTH_M {
                return Err(ConfigError::CapacityTooSmall {
                    road: road.name(),
                    length_m: road.road().length_m(),
                });
            }
            if let Some(process) = road.input {
                if process.mean_s == 0 || process.jitter_s > process.mean_s {
                    return Err(ConfigError::InputInterval {
                        road: road.name(),
                        mean_s: process.mean_s,
                        jitter_s: process.jitter_s,
                    });
                }
            }
            for turn in Turn::ALL {
                let in_range = match road.destination(turn) {
                    Destination::Entry(id) => id.0 < entries.len(),
                    Destination::Exit(id) => id.0 < exits.len(),
                };
                if !in_range {
                    return Err(ConfigError::DanglingDestination {
                        road: road.name(),
                        turn,
                    });
                }
            }
        }

        for road in exits {
            if road.road().length_m() < MIN_VEHICLE_LENGTH_M {
                return Err(ConfigError::CapacityTooSmall {
                    road: road.name(),
                    length_m: road.road().length_m(),
                });
            }
        }

        if self.phases.is_empty() {
            return Err(ConfigError::EmptyPhasePartition);
        }
        for (index, phase) in self.phases.iter().enumerate() {
            if let Some(member) = phase.open.iter().find(|id| id.0 >= entries.len()) {
                return Err(ConfigError::PhaseMember {
                    phase: index,
                    index: member.0,
                });
            }
        }

        self.check_reachability()
    }

    /// Every entry road must reach at least one exit road through the
    /// wiring, otherwise vehicles admitted there can never leave.
    fn check_reachability(&self) -> Result<(), ConfigError> {
        let entries = self.network.entries();
        let exits = self.network.exits();

        let mut graph = DiGraph::<(), ()>::new();
        let entry_nodes: Vec<NodeIndex> = entries.iter().map(|_| graph.add_node(())).collect();
        let exit_nodes: Vec<NodeIndex> = exits.iter().map(|_| graph.add_node(())).collect();

        for (index, road) in entries.iter().enumerate() {
            for turn in Turn::ALL {
                let target = match road.destination(turn) {
                    Destination::Entry(id) => entry_nodes[id.0],
                    Destination::Exit(id) => exit_nodes[id.0],
                };
                graph.add_edge(entry_nodes[index], target, ());
            }
        }

        for (index, road) in entries.iter().enumerate() {
            let reaches_exit = exit_nodes
                .iter()
                .any(|&exit| has_path_connecting(&graph, entry_nodes[index], exit, None));
            if !reaches_exit {
                return Err(ConfigError::NoRouteToExit { road: road.name() });
            }
        }
        Ok(())
    }
}

// Entry road indices of the reference network.
pub const N1_S: EntryRoadId = EntryRoadId(0);
pub const S1_N: EntryRoadId = EntryRoadId(1);
pub const O1_L: EntryRoadId = EntryRoadId(2);
pub const L1_O: EntryRoadId = EntryRoadId(3);
pub const N2_S: EntryRoadId = EntryRoadId(4);
pub const S2_N: EntryRoadId = EntryRoadId(5);
pub const C1_L: EntryRoadId = EntryRoadId(6);
pub const C1_O: EntryRoadId = EntryRoadId(7);

// Exit road indices of the reference network.
pub const N1_N: ExitRoadId = ExitRoadId(0);
pub const N2_N: ExitRoadId = ExitRoadId(1);
pub const O1_O: ExitRoadId = ExitRoadId(2);
pub const L1_L: ExitRoadId = ExitRoadId(3);
pub const S1_S: ExitRoadId = ExitRoadId(4);
pub const S2_S: ExitRoadId = ExitRoadId(5);

/// The reference network: two signalized intersections joined by the
/// two central connector roads, eight entry roads and six exit roads.
///
/// Six entry roads are fed by input processes; the connectors C1_L and
/// C1_O only receive vehicles from upstream. Each phase opens one
/// road per intersection, so a road is green for one phase duration
/// per four-phase cycle.
pub fn reference_scenario() -> Scenario {
    use Destination::{Entry, Exit};

    let input = |mean_s, jitter_s| Some(InputProcess { mean_s, jitter_s });

    let entries = vec![
        EntryRoad::new("N1_S", 60, 500, input(15, 10), [0.8, 0.1, 0.1], [
            Entry(C1_L),
            Exit(S1_S),
            Exit(O1_O),
        ]),
        EntryRoad::new("S1_N", 60, 500, input(22, 15), [0.1, 0.1, 0.8], [
            Exit(O1_O),
            Exit(N1_N),
            Entry(C1_L),
        ]),
        EntryRoad::new("O1_L", 80, 2000, input(7, 5), [0.1, 0.8, 0.1], [
            Exit(N1_N),
            Entry(C1_L),
            Exit(S1_S),
        ]),
        EntryRoad::new("L1_O", 30, 400, input(7, 5), [0.3, 0.3, 0.4], [
            Exit(S2_S),
            Entry(C1_O),
            Exit(N2_N),
        ]),
        EntryRoad::new("N2_S", 40, 500, input(15, 10), [0.4, 0.3, 0.3], [
            Exit(L1_L),
            Exit(S2_S),
            Entry(C1_O),
        ]),
        EntryRoad::new("S2_N", 40, 500, input(45, 30), [0.3, 0.3, 0.4], [
            Entry(C1_O),
            Exit(N2_N),
            Exit(L1_L),
        ]),
        EntryRoad::new("C1_L", 60, 300, None, [0.3, 0.4, 0.3], [
            Exit(N2_N),
            Exit(L1_L),
            Exit(S2_S),
        ]),
        EntryRoad::new("C1_O", 60, 300, None, [0.3, 0.4, 0.3], [
            Exit(S1_S),
            Exit(O1_O),
            Exit(N1_N),
        ]),
    ];

    let exits = vec![
        ExitRoad::new("N1_N", 60, 500),
        ExitRoad::new("N2_N", 40, 500),
        ExitRoad::new("O1_O", 80, 2000),
        ExitRoad::new("L1_L", 60, 500),
        ExitRoad::new("S1_S", 60, 500),
        ExitRoad::new("S2_S", 40, 500),
    ];

    let phases = vec![
        Phase {
            open: vec![N1_S, L1_O],
        },
        Phase {
            open: vec![S1_N, N2_S],
        },
        Phase {
            open: vec![O1_L, S2_N],
        },
        Phase {
            open: vec![C1_O, C1_L],
        },
    ];

    Scenario {
        network: Network::new(entries, exits),
        phases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_is_valid() {
        reference_scenario().validate().unwrap();
    }

    #[test]
    fn reference_wiring_matches_the_crossroads_table() {
        let scenario = reference_scenario();
        let network = &scenario.network;

        let n1_s = network.entry(N1_S);
        assert_eq!(n1_s.destination(Turn::Left), Destination::Entry(C1_L));
        assert_eq!(n1_s.destination(Turn::Straight), Destination::Exit(S1_S));
        assert_eq!(n1_s.destination(Turn::Right), Destination::Exit(O1_O));

        let s2_n = network.entry(S2_N);
        assert_eq!(s2_n.destination(Turn::Left), Destination::Entry(C1_O));
        assert_eq!(s2_n.destination(Turn::Straight), Destination::Exit(N2_N));
        assert_eq!(s2_n.destination(Turn::Right), Destination::Exit(L1_L));

        let c1_o = network.entry(C1_O);
        assert_eq!(c1_o.destination(Turn::Left), Destination::Exit(S1_S));
        assert_eq!(c1_o.destination(Turn::Straight), Destination::Exit(O1_O));
        assert_eq!(c1_o.destination(Turn::Right), Destination::Exit(N1_N));
    }

    #[test]
    fn reference_has_six_live_inputs() {
        let scenario = reference_scenario();
        assert_eq!(scenario.network.live_inputs(), 6);
        assert!(scenario.network.entry(C1_L).input.is_none());
        assert!(scenario.network.entry(C1_O).input.is_none());
    }

    #[test]
    fn bad_turn_probabilities_are_rejected() {
        let mut scenario = reference_scenario();
        scenario.network.entry_mut(N1_S).turn_probs = [0.5, 0.1, 0.1];
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::TurnProbabilities { road: "N1_S", .. })
        ));
    }

    #[test]
    fn undersized_road_is_rejected() {
        let exit = Destination::Exit(ExitRoadId(0));
        let scenario = Scenario {
            network: Network::new(
                vec![EntryRoad::new(
                    "stub",
                    60,
                    4,
                    None,
                    [1.0, 0.0, 0.0],
                    [exit, exit, exit],
                )],
                vec![ExitRoad::new("out", 60, 500)],
            ),
            phases: vec![Phase {
                open: vec![EntryRoadId(0)],
            }],
        };
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::CapacityTooSmall { road: "stub", .. })
        ));
    }

    #[test]
    fn empty_phase_partition_is_rejected() {
        let mut scenario = reference_scenario();
        scenario.phases.clear();
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::EmptyPhasePartition)
        ));
    }

    #[test]
    fn jitter_wider_than_mean_is_rejected() {
        let mut scenario = reference_scenario();
        scenario.network.entry_mut(O1_L).input = Some(InputProcess {
            mean_s: 5,
            jitter_s: 6,
        });
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::InputInterval { road: "O1_L", .. })
        ));
    }

    #[test]
    fn dangling_destination_is_rejected() {
        let scenario = Scenario {
            network: Network::new(
                vec![EntryRoad::new(
                    "loose",
                    60,
                    500,
                    None,
                    [1.0, 0.0, 0.0],
                    [
                        Destination::Exit(ExitRoadId(3)),
                        Destination::Exit(ExitRoadId(0)),
                        Destination::Exit(ExitRoadId(0)),
                    ],
                )],
                vec![ExitRoad::new("out", 60, 500)],
            ),
            phases: vec![Phase {
                open: vec![EntryRoadId(0)],
            }],
        };
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::DanglingDestination { road: "loose", .. })
        ));
    }

    #[test]
    fn entry_cycle_without_exit_is_rejected() {
        // Two entry roads feeding only each other: vehicles could
        // circulate forever without leaving.
        let a = EntryRoadId(0);
        let b = EntryRoadId(1);
        let scenario = Scenario {
            network: Network::new(
                vec![
                    EntryRoad::new("a", 60, 500, None, [1.0, 0.0, 0.0], [
                        Destination::Entry(b),
                        Destination::Entry(b),
                        Destination::Entry(b),
                    ]),
                    EntryRoad::new("b", 60, 500, None, [1.0, 0.0, 0.0], [
                        Destination::Entry(a),
                        Destination::Entry(a),
                        Destination::Entry(a),
                    ]),
                ],
                vec![],
            ),
            phases: vec![Phase { open: vec![a, b] }],
        };
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::NoRouteToExit { road: "a" })
        ));
    }
}
