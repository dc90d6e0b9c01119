//! Circuit model and verification engine for a logic-gate wiring puzzle.
//!
//! The player places gates on a [`Level`], wires them between the level's
//! input and output terminals, and asks for the wiring to be compiled and
//! checked against the level's reference function on every input combination.

pub mod budget;
pub mod circuit;
pub mod config;
mod core;
pub mod logging;
pub mod registry;
pub mod session;

pub use crate::core::{
    gate::{BoolFn, CompositeGate, Gate, GateError, GateId, GateKind, Position},
    gate_type::GateType,
    terminal::{Terminal, TerminalRole},
    wire::{PendingWire, Port, Ports, Wire, WireError},
};

pub use budget::{BudgetError, GateBudget, Remaining, UNLIMITED};
pub use circuit::{
    CompileError, CompiledCircuit, Level, LevelError, MAX_CIRCUIT_INPUTS, ReferenceFunction,
    TableError, TruthTable, VerifyError,
};
pub use config::{ConfigError, LevelPack, LevelSpec, campaign};
pub use logging::{init_tracing, init_tracing_with};
pub use registry::GateRegistry;
pub use session::{ConnectError, PlacementError, Session};
