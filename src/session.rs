//! Entry points for the presentation layer.
//!
//! A [`Session`] wraps one [`Level`] with the gate palette and the wire the
//! player is currently drawing. Every user gesture maps to one call here;
//! rejected gestures return an error and leave the board untouched.

use tracing::{debug, info};

use crate::{
    budget::{BudgetError, Remaining},
    circuit::{Level, LevelError, VerifyError},
    core::{
        gate::{Gate, GateError, GateId, Position},
        terminal::Terminal,
        wire::{PendingWire, Port, Wire, WireError},
    },
    registry::GateRegistry,
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Gate(#[from] GateError),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Port {0} is already connected")]
    AlreadyConnected(Port),
    #[error("Both ends of the wire would be {0}s")]
    SameDirection(&'static str),
    #[error("No wire is being drawn")]
    NoPendingWire,
    #[error(transparent)]
    Level(#[from] LevelError),
}

pub struct Session {
    level: Level,
    registry: GateRegistry,
    pending: Option<PendingWire>,
}

impl Session {
    pub fn new(level: Level, registry: GateRegistry) -> Self {
        Self {
            level,
            registry,
            pending: None,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn registry(&self) -> &GateRegistry {
        &self.registry
    }

    /// Gate types the player can pick from for this level.
    pub fn palette(&self) -> Vec<&str> {
        self.registry.palette(self.level.budget()).collect()
    }

    pub fn remaining(&self, gate_type: &str) -> Option<Remaining> {
        self.level.budget().remaining(gate_type)
    }

    /// Places a new gate of `gate_type`, consuming one unit of its budget.
    pub fn add_gate(&mut self, gate_type: &str, position: Position) -> Result<GateId, PlacementError> {
        let gate = self.registry.instantiate(gate_type)?;
        self.level.budget_mut().take(gate.type_name())?;
        Ok(self.level.add_gate(gate.at(position)))
    }

    /// Deletes a gate and its wires and gives its budget unit back.
    pub fn remove_gate(&mut self, id: GateId) -> Result<Gate, LevelError> {
        let gate = self.level.remove_gate(id)?;
        self.level.budget_mut().refund(gate.type_name());
        if self.pending.is_some_and(|p| p.bound().touches(id)) {
            self.pending = None;
        }
        Ok(gate)
    }

    pub fn move_gate(&mut self, id: GateId, position: Position) -> Result<(), LevelError> {
        self.level
            .gate_mut(id)
            .ok_or(LevelError::UnknownGate(id))?
            .move_to(position);
        Ok(())
    }

    fn check_endpoint(&self, port: Port) -> Result<(), ConnectError> {
        if !self.level.contains_port(port) {
            return Err(LevelError::UnknownPort(port).into());
        }
        if !port.is_source() && self.level.has_incoming_wire(port) {
            return Err(ConnectError::AlreadyConnected(port));
        }
        Ok(())
    }

    /// First click of a wire gesture. Replaces any wire already being drawn.
    pub fn begin_wire(&mut self, port: Port) -> Result<(), ConnectError> {
        self.check_endpoint(port)?;
        self.pending = Some(PendingWire::start(port));
        Ok(())
    }

    /// Second click of a wire gesture.
    ///
    /// On rejection the pending wire stays so the player can pick another end.
    pub fn complete_wire(&mut self, port: Port) -> Result<Wire, ConnectError> {
        let pending = self.pending.ok_or(ConnectError::NoPendingWire)?;
        self.check_endpoint(port)?;

        let wire = pending.complete(port).map_err(|err| match err {
            WireError::InvalidSource(_) => ConnectError::SameDirection("destination"),
            WireError::InvalidDestination(_) => ConnectError::SameDirection("source"),
            other => LevelError::from(other).into(),
        })?;
        self.level.add_wire(wire.clone())?;
        self.pending = None;
        Ok(wire)
    }

    pub fn cancel_wire(&mut self) {
        if self.pending.take().is_some() {
            debug!("pending wire dropped");
        }
    }

    pub fn pending_wire(&self) -> Option<PendingWire> {
        self.pending
    }

    pub fn remove_wire(&mut self, destination: Port) -> Result<Wire, LevelError> {
        self.level.remove_wire(destination)
    }

    /// One propagation pass; call once per rendered frame.
    pub fn step_evaluation(&mut self) -> Result<(), LevelError> {
        self.level.step()
    }

    pub fn cycle_circuit_inputs(&mut self, forward: bool) {
        self.level.cycle_circuit_inputs(forward);
    }

    pub fn toggle_input(&mut self, index: usize) -> Result<(), LevelError> {
        self.level.toggle_input(index)
    }

    pub fn compile_and_check(&mut self) -> Result<(), VerifyError> {
        self.level.compile_and_check()
    }

    pub fn compile_and_verify(&mut self) -> bool {
        self.level.compile_and_verify()
    }

    pub fn reset(&mut self) {
        info!(level = %self.level.name(), "board cleared");
        self.pending = None;
        self.level.reset();
    }

    pub fn is_completed(&self) -> bool {
        self.level.is_completed()
    }

    pub fn input_values(&self) -> Vec<bool> {
        self.level.input_values()
    }

    pub fn output_values(&self) -> Vec<bool> {
        self.level.output_values()
    }

    pub fn expected_outputs(&self) -> &[bool] {
        self.level.expected_outputs()
    }

    pub fn terminal(&self, port: Port) -> Option<&Terminal> {
        self.level.board().terminal(port)
    }

    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.level.gates()
    }

    pub fn wires(&self) -> &[Wire] {
        self.level.wires()
    }
}
