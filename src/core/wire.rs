use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{gate::GateId, terminal::TerminalRole};

/// Errors that can occur during wire operations
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A wire cannot start at this port
    #[error("Port {0} cannot drive a wire")]
    InvalidSource(Port),
    /// A wire cannot end at this port
    #[error("Port {0} cannot receive a wire")]
    InvalidDestination(Port),
    /// The port does not resolve to a live terminal
    #[error("Port {0} does not resolve to a terminal")]
    Unresolved(Port),
}
pub type WireError = Error;

/// Arena-style address of a terminal: owner, role and index.
///
/// Boundary terminals are owned by the level itself, gate terminals by the
/// gate with the given id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Port {
    CircuitInput(usize),
    CircuitOutput(usize),
    GateInput(GateId, usize),
    GateOutput(GateId, usize),
}

impl Port {
    pub fn role(self) -> TerminalRole {
        match self {
            Port::CircuitInput(_) => TerminalRole::CircuitInput,
            Port::CircuitOutput(_) => TerminalRole::CircuitOutput,
            Port::GateInput(..) => TerminalRole::GateInput,
            Port::GateOutput(..) => TerminalRole::GateOutput,
        }
    }

    /// Owning gate, `None` for boundary terminals.
    pub fn gate(self) -> Option<GateId> {
        match self {
            Port::GateInput(gate, _) | Port::GateOutput(gate, _) => Some(gate),
            Port::CircuitInput(_) | Port::CircuitOutput(_) => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Port::CircuitInput(i)
            | Port::CircuitOutput(i)
            | Port::GateInput(_, i)
            | Port::GateOutput(_, i) => i,
        }
    }

    pub fn is_source(self) -> bool {
        self.role().is_source()
    }

    pub fn touches(self, gate: GateId) -> bool {
        self.gate() == Some(gate)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::CircuitInput(i) => write!(f, "in[{i}]"),
            Port::CircuitOutput(i) => write!(f, "out[{i}]"),
            Port::GateInput(g, i) => write!(f, "gate#{g}.in[{i}]"),
            Port::GateOutput(g, i) => write!(f, "gate#{g}.out[{i}]"),
        }
    }
}

/// Terminal storage a wire reads from and writes into.
pub trait Ports {
    fn read(&self, port: Port) -> Option<bool>;

    /// Stores `value` at `port`, returning `false` if the port is not live.
    fn write(&mut self, port: Port, value: bool) -> bool;
}

/// A directed connection from one source port to one destination port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wire {
    source: Port,
    destination: Port,
    value: bool,
}

impl Wire {
    pub fn new(source: Port, destination: Port) -> Result<Self, WireError> {
        if !source.is_source() {
            return Err(WireError::InvalidSource(source));
        }
        if destination.is_source() {
            return Err(WireError::InvalidDestination(destination));
        }
        Ok(Self {
            source,
            destination,
            value: false,
        })
    }

    pub fn source(&self) -> Port {
        self.source
    }

    pub fn destination(&self) -> Port {
        self.destination
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn touches(&self, gate: GateId) -> bool {
        self.source.touches(gate) || self.destination.touches(gate)
    }

    /// Pulls the current value of the source terminal into the wire.
    pub fn refresh_value(&mut self, ports: &impl Ports) -> Result<(), WireError> {
        self.value = ports
            .read(self.source)
            .ok_or(WireError::Unresolved(self.source))?;
        Ok(())
    }

    /// Pushes the wire's value into its destination terminal.
    pub fn propagate(&self, ports: &mut impl Ports) -> Result<(), WireError> {
        if ports.write(self.destination, self.value) {
            Ok(())
        } else {
            Err(WireError::Unresolved(self.destination))
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.destination, self.value)
    }
}

/// A wire with only one endpoint bound, waiting for the second click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingWire {
    FromSource(Port),
    ToDestination(Port),
}

impl PendingWire {
    pub fn start(port: Port) -> Self {
        if port.is_source() {
            PendingWire::FromSource(port)
        } else {
            PendingWire::ToDestination(port)
        }
    }

    pub fn bound(self) -> Port {
        match self {
            PendingWire::FromSource(p) | PendingWire::ToDestination(p) => p,
        }
    }

    /// Binds the missing endpoint. `port` must be of the opposite direction.
    pub fn complete(self, port: Port) -> Result<Wire, WireError> {
        match self {
            PendingWire::FromSource(source) => Wire::new(source, port),
            PendingWire::ToDestination(destination) => {
                if !port.is_source() {
                    return Err(WireError::InvalidSource(port));
                }
                Wire::new(port, destination)
            }
        }
    }
}
