//! Turns the current wiring into a pure function of the circuit inputs.
//!
//! The compiler walks backwards from every circuit output through the wires
//! that drive it. Each gate is expanded once into nodes of an expression DAG
//! and memoized by gate id for the whole compile, so fan-out shares nodes
//! across outputs. Nodes are appended after their operands, which lets the
//! compiled circuit evaluate them in a single forward pass.

use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;
use tracing::debug;

use super::{
    Level, LevelError,
    reference::{TableError, TruthTable, combination, combinations},
};
use crate::core::{
    gate::{CompositeGate, GateError, GateId, GateKind, GateType},
    wire::{Port, WireError},
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Circuit is cyclic: gate {gate} feeds back into its own inputs")]
    Cyclic { gate: GateId },
    #[error(transparent)]
    Level(#[from] LevelError),
}
pub type CompileError = Error;

type NodeId = usize;

#[derive(Clone, Debug)]
enum Node {
    Const(bool),
    Input(usize),
    Primitive { gate_type: GateType, args: Vec<NodeId> },
    Composite { gate: CompositeGate, args: Vec<NodeId> },
    /// One output of a composite node.
    Project { node: NodeId, index: usize },
}

/// Closed-form function of a circuit, independent of the board it came from.
#[derive(Clone, Debug)]
pub struct CompiledCircuit {
    inputs: usize,
    nodes: Vec<Node>,
    outputs: Vec<NodeId>,
}

impl CompiledCircuit {
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Number of expression nodes, shared sub-expressions counted once.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Runs the function on one input vector.
    ///
    /// Inputs beyond `inputs.len()` read as `false`.
    pub fn evaluate(&self, inputs: &[bool]) -> Result<Vec<bool>, GateError> {
        let mut bits = vec![false; self.nodes.len()];
        let mut wide: HashMap<NodeId, Vec<bool>> = HashMap::new();

        for (id, node) in self.nodes.iter().enumerate() {
            let args = |args: &[NodeId]| args.iter().map(|a| bits[*a]).collect::<Vec<_>>();
            let value = match node {
                Node::Const(value) => *value,
                Node::Input(index) => inputs.get(*index).copied().unwrap_or(false),
                Node::Primitive { gate_type, args: a } => gate_type.apply(&args(a)),
                Node::Composite { gate, args: a } => {
                    let values = gate.call(&args(a))?;
                    wide.insert(id, values);
                    false
                }
                Node::Project { node, index } => wide
                    .get(node)
                    .and_then(|values| values.get(*index))
                    .copied()
                    .unwrap_or(false),
            };
            bits[id] = value;
        }

        Ok(self.outputs.iter().map(|id| bits[*id]).collect())
    }

    /// Tabulates the function over every input combination.
    pub fn truth_table(&self) -> Result<TruthTable, CompiledTableError> {
        let mut rows: Vec<String> = Vec::with_capacity(combinations(self.inputs));
        for k in 0..combinations(self.inputs) {
            let outputs = self.evaluate(&combination(k, self.inputs))?;
            rows.push(outputs.iter().map(|b| if *b { '1' } else { '0' }).collect());
        }
        Ok(TruthTable::new(self.inputs, rows)?)
    }

    /// Human readable expression for one output, inputs named `x0`, `x1`, ...
    pub fn render(&self, output: usize) -> Option<String> {
        self.outputs.get(output).map(|id| self.render_node(*id))
    }

    fn render_node(&self, id: NodeId) -> String {
        match &self.nodes[id] {
            Node::Const(value) => u8::from(*value).to_string(),
            Node::Input(index) => format!("x{index}"),
            Node::Primitive {
                gate_type: GateType::Not,
                args,
            } => match args.first() {
                Some(arg) => format!("NOT {}", self.render_node(*arg)),
                None => "0".to_owned(),
            },
            Node::Primitive { gate_type, args } => format!(
                "({})",
                args.iter()
                    .map(|a| self.render_node(*a))
                    .join(&format!(" {gate_type} "))
            ),
            Node::Composite { gate, args } => format!(
                "{}({})",
                gate.name(),
                args.iter().map(|a| self.render_node(*a)).join(", ")
            ),
            Node::Project { node, index } => format!("{}[{index}]", self.render_node(*node)),
        }
    }

    /// Packages the function as a composite gate type usable on other boards.
    pub fn into_composite(self, name: impl Into<Arc<str>>) -> CompositeGate {
        let (inputs, outputs) = (self.inputs, self.outputs.len());
        let circuit = Arc::new(self);
        CompositeGate::try_new(name, inputs, outputs, move |bits| circuit.evaluate(bits))
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CompiledTableError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Table(#[from] TableError),
}

enum Expansion {
    InProgress,
    Done(Vec<NodeId>),
}

struct Compiler<'a> {
    level: &'a Level,
    nodes: Vec<Node>,
    gates: HashMap<GateId, Expansion>,
    inputs: HashMap<usize, NodeId>,
    falsity: Option<NodeId>,
}

impl<'a> Compiler<'a> {
    fn new(level: &'a Level) -> Self {
        Self {
            level,
            nodes: Vec::new(),
            gates: HashMap::new(),
            inputs: HashMap::new(),
            falsity: None,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn constant_false(&mut self) -> NodeId {
        match self.falsity {
            Some(id) => id,
            None => {
                let id = self.push(Node::Const(false));
                self.falsity = Some(id);
                id
            }
        }
    }

    fn input(&mut self, index: usize) -> NodeId {
        if let Some(id) = self.inputs.get(&index) {
            return *id;
        }
        let id = self.push(Node::Input(index));
        self.inputs.insert(index, id);
        id
    }

    /// Expression for whatever drives `destination`; unconnected reads as false.
    fn driven(&mut self, destination: Port) -> Result<NodeId, CompileError> {
        match self.level.driver(destination) {
            Some(wire) => self.source(wire.source()),
            None => Ok(self.constant_false()),
        }
    }

    fn source(&mut self, port: Port) -> Result<NodeId, CompileError> {
        match port {
            Port::CircuitInput(index) => Ok(self.input(index)),
            Port::GateOutput(gate, index) => self
                .expand(gate)?
                .get(index)
                .copied()
                .ok_or(CompileError::Level(LevelError::UnknownPort(port))),
            Port::CircuitOutput(_) | Port::GateInput(..) => {
                Err(LevelError::Wire(WireError::InvalidSource(port)).into())
            }
        }
    }

    /// Output nodes of gate `id`, expanding it on first visit.
    fn expand(&mut self, id: GateId) -> Result<Vec<NodeId>, CompileError> {
        match self.gates.get(&id) {
            Some(Expansion::Done(outputs)) => return Ok(outputs.clone()),
            Some(Expansion::InProgress) => return Err(CompileError::Cyclic { gate: id }),
            None => {}
        }
        self.gates.insert(id, Expansion::InProgress);

        let level = self.level;
        let gate = level.gate(id).ok_or(LevelError::UnknownGate(id))?;
        let args = (0..gate.inputs().len())
            .map(|index| self.driven(Port::GateInput(id, index)))
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = match gate.kind() {
            GateKind::Primitive(gate_type) => vec![self.push(Node::Primitive {
                gate_type: *gate_type,
                args,
            })],
            GateKind::Composite(composite) => {
                let node = self.push(Node::Composite {
                    gate: composite.clone(),
                    args,
                });
                (0..gate.outputs().len())
                    .map(|index| self.push(Node::Project { node, index }))
                    .collect()
            }
        };

        self.gates.insert(id, Expansion::Done(outputs.clone()));
        Ok(outputs)
    }

    fn finish(mut self) -> Result<CompiledCircuit, CompileError> {
        let outputs = (0..self.level.output_count())
            .map(|index| self.driven(Port::CircuitOutput(index)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledCircuit {
            inputs: self.level.input_count(),
            nodes: self.nodes,
            outputs,
        })
    }
}

impl Level {
    /// Compiles the current wiring, replacing any earlier compiled function.
    ///
    /// Only gates reachable backwards from a circuit output are visited, so a
    /// loop among gates that feed nothing does not fail the compile.
    pub fn compile(&mut self) -> Result<&CompiledCircuit, CompileError> {
        self.compiled = None;
        let compiled = Compiler::new(self).finish()?;
        debug!(
            level = %self.name,
            nodes = compiled.node_count(),
            gates = self.gate_count(),
            "circuit compiled"
        );
        Ok(&*self.compiled.insert(compiled))
    }
}
