use std::{fmt, sync::Arc};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use crate::core::gate_type::GateType;
use crate::core::terminal::{Terminal, TerminalRole};

/// Identifier handed out by a level when a gate is placed on the board.
pub type GateId = usize;

/// Pure function backing a composite gate: ordered inputs in, ordered outputs out.
pub type BoolFn = Arc<dyn Fn(&[bool]) -> Result<Vec<bool>, GateError> + Send + Sync>;

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown gate type {0}")]
    UnknownGateType(String),
    #[error("Gate type {0} is already registered")]
    DuplicateGateType(String),
    #[error("Gate {kind} takes {expected} {side}, got {actual}")]
    ArityMismatch {
        kind: String,
        side: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Composite gate {name} returned {actual} outputs, expected {expected}")]
    OutputArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Composite gate {name} failed: {source}")]
    Composite {
        name: String,
        source: Box<Error>,
    },
}
pub type GateError = Error;

/// Board coordinates of a placed gate. Only the presentation layer reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A named gate whose outputs come from an arbitrary pure function.
#[derive(Clone)]
pub struct CompositeGate {
    name: Arc<str>,
    inputs: usize,
    outputs: usize,
    function: BoolFn,
}

impl CompositeGate {
    pub fn new(
        name: impl Into<Arc<str>>,
        inputs: usize,
        outputs: usize,
        function: impl Fn(&[bool]) -> Vec<bool> + Send + Sync + 'static,
    ) -> Self {
        let function = move |bits: &[bool]| Ok::<_, GateError>(function(bits));
        Self::from_fn(name, inputs, outputs, Arc::new(function))
    }

    /// Like [`CompositeGate::new`] for functions that can fail, e.g. a compiled
    /// circuit that itself contains composites.
    pub fn try_new(
        name: impl Into<Arc<str>>,
        inputs: usize,
        outputs: usize,
        function: impl Fn(&[bool]) -> Result<Vec<bool>, GateError> + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(name, inputs, outputs, Arc::new(function))
    }

    pub fn from_fn(name: impl Into<Arc<str>>, inputs: usize, outputs: usize, function: BoolFn) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> (usize, usize) {
        (self.inputs, self.outputs)
    }

    /// Invokes the attached function, rejecting results of the wrong width.
    ///
    /// A failure inside the function is wrapped with this gate's name.
    pub fn call(&self, inputs: &[bool]) -> Result<Vec<bool>, GateError> {
        let outputs = (self.function)(inputs).map_err(|source| GateError::Composite {
            name: self.name.to_string(),
            source: Box::new(source),
        })?;
        if outputs.len() != self.outputs {
            return Err(GateError::OutputArity {
                name: self.name.to_string(),
                expected: self.outputs,
                actual: outputs.len(),
            });
        }
        Ok(outputs)
    }
}

impl fmt::Debug for CompositeGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeGate")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Evaluation rule of a gate.
#[derive(Clone, Debug)]
pub enum GateKind {
    Primitive(GateType),
    Composite(CompositeGate),
}

impl GateKind {
    pub fn name(&self) -> &str {
        match self {
            GateKind::Primitive(t) => t.name(),
            GateKind::Composite(c) => c.name(),
        }
    }

    pub fn signature(&self) -> (usize, usize) {
        match self {
            GateKind::Primitive(t) => t.signature(),
            GateKind::Composite(c) => c.signature(),
        }
    }

    pub fn primitive(&self) -> Option<GateType> {
        match self {
            GateKind::Primitive(t) => Some(*t),
            GateKind::Composite(_) => None,
        }
    }

    /// Computes output values for the given inputs without touching any gate state.
    pub fn outputs_for(&self, inputs: &[bool]) -> Result<Vec<bool>, GateError> {
        match self {
            GateKind::Primitive(t) => Ok(vec![t.apply(inputs)]),
            GateKind::Composite(c) => c.call(inputs),
        }
    }
}

impl From<GateType> for GateKind {
    fn from(t: GateType) -> Self {
        GateKind::Primitive(t)
    }
}

impl From<CompositeGate> for GateKind {
    fn from(c: CompositeGate) -> Self {
        GateKind::Composite(c)
    }
}

#[derive(Clone, Debug)]
pub struct Gate {
    id: Option<GateId>,
    kind: GateKind,
    inputs: Vec<Terminal>,
    outputs: Vec<Terminal>,
    position: Position,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = |terms: &[Terminal]| terms.iter().map(|t| u8::from(t.value())).join("");
        match self.id {
            Some(id) => write!(f, "{}#{id}", self.kind.name())?,
            None => write!(f, "{}", self.kind.name())?,
        }
        write!(f, " [{}] -> [{}]", bits(&self.inputs), bits(&self.outputs))
    }
}

impl Gate {
    /// Builds an unplaced gate with the arity its kind declares.
    #[must_use]
    pub fn new(kind: impl Into<GateKind>) -> Self {
        let kind = kind.into();
        let (inputs, outputs) = kind.signature();
        Self::build(kind, inputs, outputs)
    }

    /// Builds an unplaced gate with an explicit arity, which must agree with the kind.
    pub fn with_arity(kind: impl Into<GateKind>, inputs: usize, outputs: usize) -> Result<Self, GateError> {
        let kind = kind.into();
        let (expected_in, expected_out) = kind.signature();
        if inputs != expected_in {
            return Err(GateError::ArityMismatch {
                kind: kind.name().to_owned(),
                side: "inputs",
                expected: expected_in,
                actual: inputs,
            });
        }
        if outputs != expected_out {
            return Err(GateError::ArityMismatch {
                kind: kind.name().to_owned(),
                side: "outputs",
                expected: expected_out,
                actual: outputs,
            });
        }
        Ok(Self::build(kind, inputs, outputs))
    }

    fn build(kind: GateKind, inputs: usize, outputs: usize) -> Self {
        let inverting = kind.primitive().is_some_and(GateType::is_inverting);
        Self {
            id: None,
            inputs: (0..inputs)
                .map(|i| Terminal::new(i, TerminalRole::GateInput))
                .collect(),
            outputs: (0..outputs)
                .map(|i| Terminal::new(i, TerminalRole::GateOutput).inverting(inverting))
                .collect(),
            kind,
            position: Position::default(),
        }
    }

    #[must_use]
    pub fn and() -> Self {
        Self::new(GateType::And)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::new(GateType::Or)
    }

    #[must_use]
    pub fn not() -> Self {
        Self::new(GateType::Not)
    }

    #[must_use]
    pub fn nand() -> Self {
        Self::new(GateType::Nand)
    }

    #[must_use]
    pub fn nor() -> Self {
        Self::new(GateType::Nor)
    }

    #[must_use]
    pub fn xor() -> Self {
        Self::new(GateType::Xor)
    }

    #[must_use]
    pub fn xnor() -> Self {
        Self::new(GateType::Xnor)
    }

    #[must_use]
    pub fn composite(composite: CompositeGate) -> Self {
        Self::new(composite)
    }

    /// Same kind and arity, zeroed terminals, no identifier.
    #[must_use]
    pub fn copy(&self) -> Self {
        let mut gate = Self::build(self.kind.clone(), self.inputs.len(), self.outputs.len());
        gate.position = self.position;
        gate
    }

    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> Option<GateId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: GateId) {
        self.id = Some(id);
    }

    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.name()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    pub fn inputs(&self) -> &[Terminal] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Terminal] {
        &self.outputs
    }

    pub fn input_values(&self) -> Vec<bool> {
        self.inputs.iter().map(Terminal::value).collect()
    }

    pub fn output_values(&self) -> Vec<bool> {
        self.outputs.iter().map(Terminal::value).collect()
    }

    pub fn input(&self, index: usize) -> Option<&Terminal> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&Terminal> {
        self.outputs.get(index)
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Option<&mut Terminal> {
        self.inputs.get_mut(index)
    }

    /// Recomputes the output terminals from the current input terminals.
    ///
    /// Only this gate's outputs are written. On error the outputs keep their
    /// previous values.
    pub fn evaluate(&mut self) -> Result<(), GateError> {
        let values = self.kind.outputs_for(&self.input_values())?;
        for (terminal, value) in self.outputs.iter_mut().zip(values) {
            terminal.set(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
