use std::collections::HashMap;

use crate::core::{
    gate::{Gate, GateId},
    terminal::{Terminal, TerminalRole},
    wire::{Port, Ports},
};

/// Terminal storage of a level: boundary terminals plus the placed gates.
#[derive(Clone, Debug, Default)]
pub struct Board {
    pub(super) inputs: Vec<Terminal>,
    pub(super) outputs: Vec<Terminal>,
    pub(super) gates: HashMap<GateId, Gate>,
}

impl Board {
    pub fn new(inputs: &[bool], outputs: usize) -> Self {
        Self {
            inputs: inputs
                .iter()
                .enumerate()
                .map(|(i, v)| Terminal::with_value(i, TerminalRole::CircuitInput, *v))
                .collect(),
            outputs: (0..outputs)
                .map(|i| Terminal::new(i, TerminalRole::CircuitOutput))
                .collect(),
            gates: HashMap::new(),
        }
    }

    pub fn terminal(&self, port: Port) -> Option<&Terminal> {
        match port {
            Port::CircuitInput(i) => self.inputs.get(i),
            Port::CircuitOutput(i) => self.outputs.get(i),
            Port::GateInput(g, i) => self.gates.get(&g)?.input(i),
            Port::GateOutput(g, i) => self.gates.get(&g)?.output(i),
        }
    }

    fn terminal_mut(&mut self, port: Port) -> Option<&mut Terminal> {
        match port {
            Port::CircuitInput(i) => self.inputs.get_mut(i),
            Port::CircuitOutput(i) => self.outputs.get_mut(i),
            Port::GateInput(g, i) => self.gates.get_mut(&g)?.input_mut(i),
            // gate outputs are only written by the gate itself
            Port::GateOutput(..) => None,
        }
    }

    pub fn contains(&self, port: Port) -> bool {
        self.terminal(port).is_some()
    }
}

impl Ports for Board {
    fn read(&self, port: Port) -> Option<bool> {
        self.terminal(port).map(Terminal::value)
    }

    fn write(&mut self, port: Port, value: bool) -> bool {
        match self.terminal_mut(port) {
            Some(terminal) => {
                terminal.set(value);
                true
            }
            None => false,
        }
    }
}
