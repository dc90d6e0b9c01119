//! The level graph: boundary terminals, placed gates and the wires between
//! them, plus per-frame evaluation and exhaustive verification.
//!
//! Structural edits live in [`structure`], the frame loop and verification in
//! [`evaluation`], and the wiring-to-function compiler in [`compile`].

mod board;
pub mod compile;
pub mod evaluation;
pub mod reference;
pub mod structure;

pub use board::Board;
pub use compile::{CompileError, CompiledCircuit};
pub use evaluation::VerifyError;
pub use reference::{ReferenceFunction, TableError, TruthTable};

use tracing::debug;

use crate::{
    budget::GateBudget,
    core::{
        gate::{GateError, GateId},
        wire::{Port, Wire, WireError},
    },
};

/// Upper bound on circuit inputs; verification enumerates all 2^n combinations.
pub const MAX_CIRCUIT_INPUTS: usize = 16;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Gate {0} is not on the board")]
    UnknownGate(GateId),
    #[error("Port {0} does not exist")]
    UnknownPort(Port),
    #[error("Port {0} already has an incoming wire")]
    DestinationOccupied(Port),
    #[error("No wire ends at {0}")]
    NoIncomingWire(Port),
    #[error("Level has {actual} inputs but the reference function takes {expected}")]
    InputArity { expected: usize, actual: usize },
    #[error(
        "Reference function returned {actual} outputs for combination {combination}, expected {expected}"
    )]
    ReferenceArity {
        combination: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Level has {0} inputs, at most {max} are supported", max = MAX_CIRCUIT_INPUTS)]
    TooManyInputs(usize),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Wire(#[from] WireError),
}
pub type LevelError = Error;

/// One puzzle: the circuit graph together with its target function and budget.
#[derive(Clone, Debug)]
pub struct Level {
    name: String,
    board: Board,
    wires: Vec<Wire>,
    defaults: Vec<bool>,
    reference: ReferenceFunction,
    expected: Vec<bool>,
    budget: GateBudget,
    initial_budget: GateBudget,
    compiled: Option<CompiledCircuit>,
    completed: bool,
    next_gate_id: GateId,
}

impl Level {
    /// Creates an empty board with `inputs` as the default input values.
    ///
    /// The number of outputs is taken from the reference function.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<bool>,
        budget: GateBudget,
        reference: ReferenceFunction,
    ) -> Result<Self, LevelError> {
        if inputs.len() > MAX_CIRCUIT_INPUTS {
            return Err(LevelError::TooManyInputs(inputs.len()));
        }
        if inputs.len() != reference.inputs() {
            return Err(LevelError::InputArity {
                expected: reference.inputs(),
                actual: inputs.len(),
            });
        }

        let name = name.into();
        debug!(
            level = %name,
            inputs = inputs.len(),
            outputs = reference.outputs(),
            "level created"
        );

        Ok(Self {
            board: Board::new(&inputs, reference.outputs()),
            expected: reference.call(&inputs),
            wires: Vec::new(),
            defaults: inputs,
            reference,
            initial_budget: budget.clone(),
            budget,
            compiled: None,
            completed: false,
            next_gate_id: 0,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn reference(&self) -> &ReferenceFunction {
        &self.reference
    }

    pub fn budget(&self) -> &GateBudget {
        &self.budget
    }

    pub fn budget_mut(&mut self) -> &mut GateBudget {
        &mut self.budget
    }

    pub fn input_count(&self) -> usize {
        self.board.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.board.outputs.len()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The function produced by the last successful compile, if still current.
    pub fn compiled(&self) -> Option<&CompiledCircuit> {
        self.compiled.as_ref()
    }

    /// Clears every gate and wire and restores default inputs and budget.
    pub fn reset(&mut self) {
        debug!(level = %self.name, "level reset");
        self.board = Board::new(&self.defaults, self.reference.outputs());
        self.wires.clear();
        self.budget = self.initial_budget.clone();
        self.expected = self.reference.call(&self.defaults);
        self.compiled = None;
        self.completed = false;
    }

    fn invalidate(&mut self) {
        self.compiled = None;
    }
}
