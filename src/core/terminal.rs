use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the board a terminal sits on and who owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalRole {
    CircuitInput,
    CircuitOutput,
    GateInput,
    GateOutput,
}

impl TerminalRole {
    /// Roles a wire may start from.
    pub fn is_source(self) -> bool {
        matches!(self, TerminalRole::CircuitInput | TerminalRole::GateOutput)
    }

    pub fn is_destination(self) -> bool {
        !self.is_source()
    }
}

impl fmt::Display for TerminalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminalRole::CircuitInput => "circuit input",
            TerminalRole::CircuitOutput => "circuit output",
            TerminalRole::GateInput => "gate input",
            TerminalRole::GateOutput => "gate output",
        };
        f.write_str(name)
    }
}

/// A single boolean port, owned either by a gate or by the level boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    index: usize,
    role: TerminalRole,
    value: bool,
    inverting: bool,
}

impl Terminal {
    pub fn new(index: usize, role: TerminalRole) -> Self {
        Self {
            index,
            role,
            value: false,
            inverting: false,
        }
    }

    pub fn with_value(index: usize, role: TerminalRole, value: bool) -> Self {
        Self {
            value,
            ..Self::new(index, role)
        }
    }

    /// Marks the terminal as drawn with an inversion bubble. Has no effect on logic.
    pub fn inverting(mut self, inverting: bool) -> Self {
        self.inverting = inverting;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn role(&self) -> TerminalRole {
        self.role
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set(&mut self, value: bool) {
        self.value = value;
    }

    pub fn is_inverting(&self) -> bool {
        self.inverting
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} = {}", self.role, self.index, self.value)
    }
}
