use itertools::Itertools;
use tracing::{debug, info, trace, warn};

use super::{
    CompileError, Level, LevelError,
    reference::{combination, combinations, encode},
};
use crate::core::{
    gate::GateError,
    terminal::Terminal,
    wire::Port,
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Circuit has not been compiled")]
    NotCompiled,
    #[error("Inputs {inputs:?} produce {actual:?}, expected {expected:?}")]
    Mismatch {
        inputs: Vec<bool>,
        expected: Vec<bool>,
        actual: Vec<bool>,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Gate(#[from] GateError),
}
pub type VerifyError = Error;

impl Level {
    /// Advances one frame.
    ///
    /// Recomputes the expected outputs, evaluates every gate from its current
    /// inputs, then moves each wire's source value to its destination. A chain
    /// of `k` gates therefore needs `k + 1` frames to settle.
    pub fn step(&mut self) -> Result<(), LevelError> {
        self.expected = self.reference.call(&self.input_values());

        for gate in self.board.gates.values_mut() {
            gate.evaluate()?;
        }
        for wire in &mut self.wires {
            wire.refresh_value(&self.board)?;
            wire.propagate(&mut self.board)?;
        }
        Ok(())
    }

    /// Steps until no terminal changes, giving up after `max_steps` frames.
    ///
    /// Returns the number of frames that changed something, or `None` if the
    /// board was still changing (a combinational loop can oscillate forever).
    pub fn settle(&mut self, max_steps: usize) -> Result<Option<usize>, LevelError> {
        let mut before = self.terminal_values();
        for frame in 0..max_steps {
            self.step()?;
            let after = self.terminal_values();
            if after == before {
                trace!(frames = frame, "board settled");
                return Ok(Some(frame));
            }
            before = after;
        }
        Ok(None)
    }

    pub fn input_values(&self) -> Vec<bool> {
        self.board.inputs.iter().map(Terminal::value).collect()
    }

    pub fn output_values(&self) -> Vec<bool> {
        self.board.outputs.iter().map(Terminal::value).collect()
    }

    /// Reference outputs for the inputs seen at the last frame.
    pub fn expected_outputs(&self) -> &[bool] {
        &self.expected
    }

    /// Value of every terminal on the board, circuit and gate terminals alike,
    /// sorted by port.
    pub fn terminal_values(&self) -> Vec<(Port, bool)> {
        let boundary = self
            .board
            .inputs
            .iter()
            .map(|t| (Port::CircuitInput(t.index()), t.value()))
            .chain(
                self.board
                    .outputs
                    .iter()
                    .map(|t| (Port::CircuitOutput(t.index()), t.value())),
            );
        let gates = self.board.gates.iter().flat_map(|(&id, gate)| {
            gate.inputs()
                .iter()
                .map(move |t| (Port::GateInput(id, t.index()), t.value()))
                .chain(
                    gate.outputs()
                        .iter()
                        .map(move |t| (Port::GateOutput(id, t.index()), t.value())),
                )
        });
        boundary.chain(gates).sorted().collect()
    }

    pub fn set_inputs(&mut self, values: &[bool]) -> Result<(), LevelError> {
        if values.len() != self.board.inputs.len() {
            return Err(LevelError::InputArity {
                expected: self.board.inputs.len(),
                actual: values.len(),
            });
        }
        for (terminal, value) in self.board.inputs.iter_mut().zip(values) {
            terminal.set(*value);
        }
        Ok(())
    }

    pub fn toggle_input(&mut self, index: usize) -> Result<(), LevelError> {
        let terminal = self
            .board
            .inputs
            .get_mut(index)
            .ok_or(LevelError::UnknownPort(Port::CircuitInput(index)))?;
        terminal.set(!terminal.value());
        Ok(())
    }

    /// Treats the inputs as an unsigned integer (first input is the most
    /// significant bit) and moves it one step up or down, wrapping around.
    pub fn cycle_circuit_inputs(&mut self, forward: bool) {
        let width = self.board.inputs.len();
        if width == 0 {
            return;
        }
        let count = combinations(width);
        let current = encode(&self.input_values());
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        for (terminal, value) in self.board.inputs.iter_mut().zip(combination(next, width)) {
            terminal.set(value);
        }
        trace!(from = current, to = next, "inputs cycled");
    }

    /// Compares the compiled function with the reference on every input combination.
    pub fn check(&self) -> Result<(), VerifyError> {
        let compiled = self.compiled.as_ref().ok_or(VerifyError::NotCompiled)?;
        let width = self.input_count();
        for k in 0..combinations(width) {
            let inputs = combination(k, width);
            let expected = self.reference.call(&inputs);
            let actual = compiled.evaluate(&inputs)?;
            if actual != expected {
                return Err(VerifyError::Mismatch {
                    inputs,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// `true` only if a compiled function exists and matches on every combination.
    pub fn evaluate(&self) -> bool {
        self.check().is_ok()
    }

    /// Compiles the current wiring and verifies it, marking the level
    /// completed on success.
    pub fn compile_and_check(&mut self) -> Result<(), VerifyError> {
        let compiled = self.compile().map(|_| ()).map_err(VerifyError::from);
        let result = compiled.and_then(|()| self.check());
        match &result {
            Ok(()) => {
                info!(level = %self.name, "level solved");
                self.completed = true;
            }
            Err(VerifyError::Compile(err)) => warn!(level = %self.name, "{err}"),
            Err(err) => debug!(level = %self.name, "verification failed: {err}"),
        }
        result
    }

    pub fn compile_and_verify(&mut self) -> bool {
        self.compile_and_check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{
        budget::GateBudget,
        circuit::ReferenceFunction,
        core::gate::Gate,
    };

    fn identity_level(inputs: usize) -> Level {
        Level::new(
            "identity",
            vec![false; inputs],
            GateBudget::free_play(),
            ReferenceFunction::new(inputs, |i| i.to_vec()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn cycling_counts_in_binary() {
        let mut level = identity_level(3);
        level.set_inputs(&[false, true, true]).unwrap();
        level.cycle_circuit_inputs(true);
        assert_eq!(level.input_values(), vec![true, false, false]);
        level.cycle_circuit_inputs(false);
        assert_eq!(level.input_values(), vec![false, true, true]);

        level.set_inputs(&[true, true, true]).unwrap();
        level.cycle_circuit_inputs(true);
        assert_eq!(level.input_values(), vec![false, false, false]);
        level.cycle_circuit_inputs(false);
        assert_eq!(level.input_values(), vec![true, true, true]);
    }

    #[test]
    fn cycling_is_cyclic() {
        for width in 0..=4 {
            let mut level = identity_level(width);
            level.set_inputs(&combination(5 % combinations(width), width)).unwrap();
            let start = level.input_values();
            for _ in 0..combinations(width) {
                level.cycle_circuit_inputs(true);
            }
            assert_eq!(level.input_values(), start);
        }
    }

    #[test]
    fn toggle_flips_one_input() {
        let mut level = identity_level(2);
        level.toggle_input(1).unwrap();
        assert_eq!(level.input_values(), vec![false, true]);
        assert_eq!(
            level.toggle_input(2),
            Err(LevelError::UnknownPort(Port::CircuitInput(2)))
        );
    }

    #[test]
    fn expected_outputs_follow_inputs() {
        let mut level = identity_level(2);
        level.set_inputs(&[true, false]).unwrap();
        assert_eq!(level.expected_outputs(), &[false, false]);
        level.step().unwrap();
        assert_eq!(level.expected_outputs(), &[true, false]);
    }

    #[test]
    fn chain_lags_one_frame_per_hop() {
        let mut level = identity_level(1);
        let first = level.add_gate(Gate::not());
        let second = level.add_gate(Gate::not());
        level.connect(Port::CircuitInput(0), Port::GateInput(first, 0)).unwrap();
        level.connect(Port::GateOutput(first, 0), Port::GateInput(second, 0)).unwrap();
        level.connect(Port::GateOutput(second, 0), Port::CircuitOutput(0)).unwrap();
        level.set_inputs(&[true]).unwrap();

        let frames = level.settle(10).unwrap();
        assert!(frames.is_some());
        assert_eq!(level.output_values(), vec![true]);

        let stable = level.terminal_values();
        level.step().unwrap();
        assert_eq!(level.terminal_values(), stable);
    }

    #[test]
    fn terminal_values_cover_gate_terminals() {
        let mut level = identity_level(1);
        let not = level.add_gate(Gate::not());
        level.connect(Port::CircuitInput(0), Port::GateInput(not, 0)).unwrap();
        level.connect(Port::GateOutput(not, 0), Port::CircuitOutput(0)).unwrap();
        level.settle(10).unwrap();

        assert_eq!(
            level.terminal_values(),
            vec![
                (Port::CircuitInput(0), false),
                (Port::CircuitOutput(0), true),
                (Port::GateInput(not, 0), false),
                (Port::GateOutput(not, 0), true),
            ]
        );
    }

    #[test]
    fn evaluate_without_compile_is_false() {
        let mut level = identity_level(1);
        level.connect(Port::CircuitInput(0), Port::CircuitOutput(0)).unwrap();
        assert!(!level.evaluate());
        assert_eq!(level.check(), Err(VerifyError::NotCompiled));
    }

    #[test]
    fn edits_invalidate_compiled_function() {
        let mut level = identity_level(1);
        level.connect(Port::CircuitInput(0), Port::CircuitOutput(0)).unwrap();
        assert!(level.compile_and_verify());
        assert!(level.evaluate());

        level.remove_wire(Port::CircuitOutput(0)).unwrap();
        assert!(level.compiled().is_none());
        assert!(!level.evaluate());
        // completion sticks until reset
        assert!(level.is_completed());
        level.reset();
        assert!(!level.is_completed());
    }

    #[test]
    fn mismatch_reports_counterexample() {
        let mut level = identity_level(1);
        let not = level.add_gate(Gate::not());
        level.connect(Port::CircuitInput(0), Port::GateInput(not, 0)).unwrap();
        level.connect(Port::GateOutput(not, 0), Port::CircuitOutput(0)).unwrap();

        assert_eq!(
            level.compile_and_check(),
            Err(VerifyError::Mismatch {
                inputs: vec![false],
                expected: vec![false],
                actual: vec![true],
            })
        );
        assert!(!level.is_completed());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut level = Level::new(
            "or",
            vec![true, false],
            GateBudget::new().with("OR", 1),
            ReferenceFunction::new(2, |i| vec![i[0] || i[1]]).unwrap(),
        )
        .unwrap();
        level.budget_mut().take("OR").unwrap();
        let g = level.add_gate(Gate::or());
        level.connect(Port::CircuitInput(0), Port::GateInput(g, 0)).unwrap();
        level.cycle_circuit_inputs(true);

        level.reset();
        assert_eq!(level.gate_count(), 0);
        assert!(level.wires().is_empty());
        assert_eq!(level.input_values(), vec![true, false]);
        assert_eq!(level.output_values(), vec![false]);
        assert!(level.budget().can_place("OR"));
    }
}
