use tracing::{debug, trace};

use super::{Level, LevelError};
use crate::core::{
    gate::{Gate, GateId},
    wire::{Port, Ports, Wire},
};

impl Level {
    /// Places `gate` on the board under a fresh id.
    ///
    /// The budget is not consulted here; callers that enforce it do so before
    /// placing.
    pub fn add_gate(&mut self, mut gate: Gate) -> GateId {
        let id = self.next_gate_id;
        self.next_gate_id += 1;
        gate.assign_id(id);
        debug!(gate = %gate, "gate added");
        self.board.gates.insert(id, gate);
        self.invalidate();
        id
    }

    /// Removes a gate together with every wire touching it.
    ///
    /// Each destination that loses its incoming wire is reset to `false`.
    pub fn remove_gate(&mut self, id: GateId) -> Result<Gate, LevelError> {
        if !self.board.gates.contains_key(&id) {
            return Err(LevelError::UnknownGate(id));
        }

        let (detached, kept): (Vec<Wire>, Vec<Wire>) =
            self.wires.drain(..).partition(|wire| wire.touches(id));
        self.wires = kept;
        for wire in &detached {
            trace!(wire = %wire, "wire removed with gate");
            self.board.write(wire.destination(), false);
        }

        let gate = self
            .board
            .gates
            .remove(&id)
            .ok_or(LevelError::UnknownGate(id))?;
        debug!(gate = %gate, wires = detached.len(), "gate removed");
        self.invalidate();
        Ok(gate)
    }

    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.board.gates.get(&id)
    }

    pub fn gate_mut(&mut self, id: GateId) -> Option<&mut Gate> {
        self.board.gates.get_mut(&id)
    }

    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.board.gates.values()
    }

    pub fn gate_count(&self) -> usize {
        self.board.gates.len()
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Inserts a wire after checking both endpoints exist and the destination is free.
    pub fn add_wire(&mut self, wire: Wire) -> Result<(), LevelError> {
        for port in [wire.source(), wire.destination()] {
            if !self.board.contains(port) {
                return Err(LevelError::UnknownPort(port));
            }
        }
        if self.has_incoming_wire(wire.destination()) {
            return Err(LevelError::DestinationOccupied(wire.destination()));
        }
        debug!(wire = %wire, "wire added");
        self.wires.push(wire);
        self.invalidate();
        Ok(())
    }

    pub fn connect(&mut self, source: Port, destination: Port) -> Result<(), LevelError> {
        self.add_wire(Wire::new(source, destination)?)
    }

    /// Deletes the wire ending at `destination` and resets that terminal.
    pub fn remove_wire(&mut self, destination: Port) -> Result<Wire, LevelError> {
        let position = self
            .wires
            .iter()
            .position(|wire| wire.destination() == destination)
            .ok_or(LevelError::NoIncomingWire(destination))?;
        let wire = self.wires.remove(position);
        self.board.write(destination, false);
        debug!(wire = %wire, "wire removed");
        self.invalidate();
        Ok(wire)
    }

    /// The wire feeding `destination`, if any.
    pub fn driver(&self, destination: Port) -> Option<&Wire> {
        self.wires
            .iter()
            .find(|wire| wire.destination() == destination)
    }

    pub fn has_incoming_wire(&self, destination: Port) -> bool {
        self.driver(destination).is_some()
    }

    pub fn terminal_has_incoming_wire(&self, output: usize) -> bool {
        self.has_incoming_wire(Port::CircuitOutput(output))
    }

    pub fn gate_input_has_incoming_wire(&self, gate: GateId, input: usize) -> bool {
        self.has_incoming_wire(Port::GateInput(gate, input))
    }

    pub fn contains_port(&self, port: Port) -> bool {
        self.board.contains(port)
    }

    /// Current value of any terminal on the board.
    pub fn port_value(&self, port: Port) -> Option<bool> {
        self.board.read(port)
    }
}
