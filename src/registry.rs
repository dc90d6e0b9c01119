use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    budget::GateBudget,
    circuit::{
        MAX_CIRCUIT_INPUTS,
        reference::{combination, combinations},
    },
    core::gate::{CompositeGate, Gate, GateError, GateType},
};

/// Prototype gates keyed by upper-case type name.
///
/// Placing a gate instantiates a fresh copy of its prototype.
#[derive(Clone, Debug)]
pub struct GateRegistry {
    prototypes: BTreeMap<String, Gate>,
}

impl Default for GateRegistry {
    fn default() -> Self {
        Self::with_primitives()
    }
}

impl GateRegistry {
    pub fn empty() -> Self {
        Self {
            prototypes: BTreeMap::new(),
        }
    }

    pub fn with_primitives() -> Self {
        let prototypes = GateType::ALL
            .iter()
            .map(|t| (t.name().to_owned(), Gate::new(*t)))
            .collect();
        Self { prototypes }
    }

    /// Adds a composite gate type after checking it returns the declared
    /// number of outputs for every input combination.
    pub fn register_composite(&mut self, composite: CompositeGate) -> Result<(), GateError> {
        let name = composite.name().to_ascii_uppercase();
        if self.prototypes.contains_key(&name) {
            return Err(GateError::DuplicateGateType(name));
        }

        let (inputs, _) = composite.signature();
        if inputs > MAX_CIRCUIT_INPUTS {
            return Err(GateError::ArityMismatch {
                kind: name,
                side: "inputs",
                expected: MAX_CIRCUIT_INPUTS,
                actual: inputs,
            });
        }
        for k in 0..combinations(inputs) {
            composite.call(&combination(k, inputs))?;
        }

        debug!(gate = %name, ?inputs, "composite gate registered");
        self.prototypes.insert(name, Gate::composite(composite));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(&name.to_ascii_uppercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    /// A fresh, unplaced gate of the named type.
    pub fn instantiate(&self, name: &str) -> Result<Gate, GateError> {
        self.prototypes
            .get(&name.to_ascii_uppercase())
            .map(Gate::copy)
            .ok_or_else(|| GateError::UnknownGateType(name.to_owned()))
    }

    /// Registered types the budget allows, in name order.
    pub fn palette<'a>(&'a self, budget: &'a GateBudget) -> impl Iterator<Item = &'a str> {
        self.names().filter(move |name| budget.is_allowed(name))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn half_adder() -> CompositeGate {
        CompositeGate::new("half_adder", 2, 2, |i| vec![i[0] ^ i[1], i[0] && i[1]])
    }

    #[test]
    fn instantiates_fresh_copies() {
        let registry = GateRegistry::default();
        let gate = registry.instantiate("nand").unwrap();
        assert_eq!(gate.type_name(), "NAND");
        assert_eq!(gate.id(), None);
        assert_eq!(gate.output_values(), vec![false]);
        assert_eq!(
            registry.instantiate("MUX").unwrap_err(),
            GateError::UnknownGateType("MUX".to_owned())
        );
    }

    #[test]
    fn composites_are_validated() {
        let mut registry = GateRegistry::default();
        registry.register_composite(half_adder()).unwrap();
        assert!(registry.contains("HALF_ADDER"));
        assert_eq!(
            registry.instantiate("Half_Adder").unwrap().outputs().len(),
            2
        );

        assert_eq!(
            registry.register_composite(half_adder()),
            Err(GateError::DuplicateGateType("HALF_ADDER".to_owned()))
        );

        let lying = CompositeGate::new("LIAR", 1, 1, |i| if i[0] { vec![] } else { vec![true] });
        assert!(matches!(
            registry.register_composite(lying),
            Err(GateError::OutputArity { actual: 0, .. })
        ));
        assert!(!registry.contains("LIAR"));
    }

    #[test]
    fn palette_is_filtered_by_budget() {
        let registry = GateRegistry::default();
        let budget = GateBudget::unlimited(["XOR", "NOT", "MUX"]);
        assert_eq!(registry.palette(&budget).collect::<Vec<_>>(), vec!["NOT", "XOR"]);
    }
}
