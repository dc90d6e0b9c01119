use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::gate::GateError;

/// The fixed-function gates every palette can offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateType {
    And,
    Or,
    Not,
    Xor,
    Xnor,
    Nand,
    Nor,
}

static BY_NAME: Lazy<HashMap<&'static str, GateType>> =
    Lazy::new(|| GateType::ALL.iter().map(|t| (t.name(), *t)).collect());

impl GateType {
    pub const ALL: [GateType; 7] = [
        GateType::And,
        GateType::Or,
        GateType::Not,
        GateType::Xor,
        GateType::Xnor,
        GateType::Nand,
        GateType::Nor,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Not => "NOT",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
            GateType::Nand => "NAND",
            GateType::Nor => "NOR",
        }
    }

    /// Case-insensitive lookup of a primitive by its palette name.
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name.to_ascii_uppercase().as_str()).copied()
    }

    /// `(inputs, outputs)` a gate of this type is built with.
    pub const fn signature(self) -> (usize, usize) {
        match self {
            GateType::Not => (1, 1),
            _ => (2, 1),
        }
    }

    /// Whether the output is drawn with an inversion bubble.
    pub const fn is_inverting(self) -> bool {
        matches!(
            self,
            GateType::Not | GateType::Nand | GateType::Nor | GateType::Xnor
        )
    }

    /// Truth function over any number of inputs.
    ///
    /// XOR and XNOR are only defined for exactly two inputs and yield `false`
    /// for every other arity. NOT negates its first input and yields `false`
    /// when it has none.
    pub fn apply(self, inputs: &[bool]) -> bool {
        match self {
            GateType::And => inputs.iter().all(|v| *v),
            GateType::Or => inputs.iter().any(|v| *v),
            GateType::Not => inputs.first().is_some_and(|v| !*v),
            GateType::Nand => !inputs.iter().all(|v| *v),
            GateType::Nor => !inputs.iter().any(|v| *v),
            GateType::Xor => matches!(inputs, [a, b] if a != b),
            GateType::Xnor => matches!(inputs, [a, b] if a == b),
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateType {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| GateError::UnknownGateType(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(GateType::from_name("nand"), Some(GateType::Nand));
        assert_eq!("Xnor".parse::<GateType>(), Ok(GateType::Xnor));
        assert_eq!(
            "MUX".parse::<GateType>(),
            Err(GateError::UnknownGateType("MUX".to_owned()))
        );
    }

    #[test]
    fn names_round_trip() {
        for t in GateType::ALL {
            assert_eq!(GateType::from_name(t.name()), Some(t));
        }
    }

    #[test]
    fn xor_family_requires_two_inputs() {
        assert!(!GateType::Xor.apply(&[true]));
        assert!(!GateType::Xor.apply(&[true, false, false]));
        assert!(!GateType::Xnor.apply(&[]));
        assert!(!GateType::Xnor.apply(&[true, true, true]));
    }

    #[test]
    fn serde_uses_palette_names() {
        let json = serde_json::to_string(&GateType::Nor).unwrap();
        assert_eq!(json, "\"NOR\"");
        let back: GateType = serde_json::from_str("\"XOR\"").unwrap();
        assert_eq!(back, GateType::Xor);
    }
}
