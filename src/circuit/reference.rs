use std::{fmt, sync::Arc};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{LevelError, MAX_CIRCUIT_INPUTS};

/// Bit pattern of the `index`-th input combination, most significant bit first.
pub fn combination(index: usize, width: usize) -> Vec<bool> {
    (0..width)
        .map(|bit| (index >> (width - 1 - bit)) & 1 == 1)
        .collect()
}

/// Inverse of [`combination`].
pub fn encode(bits: &[bool]) -> usize {
    bits.iter().fold(0, |acc, bit| (acc << 1) | usize::from(*bit))
}

/// Number of input combinations over `width` inputs.
pub fn combinations(width: usize) -> usize {
    1 << width
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Truth table over {inputs} inputs needs {expected} rows, got {actual}")]
    RowCount {
        inputs: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Row {row} has {actual} output bits, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Row {row} contains {found:?}, only '0' and '1' are allowed")]
    InvalidBit { row: usize, found: char },
    #[error("Truth table rows must have at least one output bit")]
    NoOutputs,
    #[error("Truth table over {0} inputs is too wide, at most {max} are supported", max = MAX_CIRCUIT_INPUTS)]
    TooWide(usize),
}

/// Tabulated boolean function, one row per input combination.
///
/// `rows[k]` is the output bit string for the combination whose MSB-first
/// encoding is `k`, e.g. OR over two inputs is `["0", "1", "1", "1"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTruthTable")]
pub struct TruthTable {
    inputs: usize,
    rows: Vec<String>,
}

/// Wire form of [`TruthTable`]; deserialized tables are validated on the way in.
#[derive(Deserialize)]
struct RawTruthTable {
    inputs: usize,
    rows: Vec<String>,
}

impl TryFrom<RawTruthTable> for TruthTable {
    type Error = TableError;

    fn try_from(raw: RawTruthTable) -> Result<Self, Self::Error> {
        Self::new(raw.inputs, raw.rows)
    }
}

impl TruthTable {
    pub fn new(inputs: usize, rows: Vec<String>) -> Result<Self, TableError> {
        let table = Self { inputs, rows };
        table.validate()?;
        Ok(table)
    }

    /// Tabulates `f` over every combination of `inputs` bits.
    pub fn tabulate(inputs: usize, f: impl Fn(&[bool]) -> Vec<bool>) -> Result<Self, TableError> {
        if inputs > MAX_CIRCUIT_INPUTS {
            return Err(TableError::TooWide(inputs));
        }
        let rows: Vec<String> = (0..combinations(inputs))
            .map(|k| {
                f(&combination(k, inputs))
                    .iter()
                    .map(|b| if *b { '1' } else { '0' })
                    .collect::<String>()
            })
            .collect();
        Self::new(inputs, rows)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.inputs > MAX_CIRCUIT_INPUTS {
            return Err(TableError::TooWide(self.inputs));
        }
        let expected = combinations(self.inputs);
        if self.rows.len() != expected {
            return Err(TableError::RowCount {
                inputs: self.inputs,
                expected,
                actual: self.rows.len(),
            });
        }
        let width = self.rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(TableError::NoOutputs);
        }
        for (row, bits) in self.rows.iter().enumerate() {
            if let Some(found) = bits.chars().find(|c| !matches!(c, '0' | '1')) {
                return Err(TableError::InvalidBit { row, found });
            }
            if bits.len() != width {
                return Err(TableError::RaggedRow {
                    row,
                    expected: width,
                    actual: bits.len(),
                });
            }
        }
        Ok(())
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.rows.first().map_or(0, String::len)
    }

    pub fn row(&self, index: usize) -> Option<Vec<bool>> {
        self.rows
            .get(index)
            .map(|bits| bits.chars().map(|c| c == '1').collect())
    }

    pub fn lookup(&self, inputs: &[bool]) -> Option<Vec<bool>> {
        if inputs.len() != self.inputs {
            return None;
        }
        self.row(encode(inputs))
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, row) in self.rows.iter().enumerate() {
            let inputs = combination(k, self.inputs).iter().map(|b| u8::from(*b)).join("");
            writeln!(f, "{inputs} | {row}")?;
        }
        Ok(())
    }
}

/// The target boolean function a level asks the player to reproduce.
#[derive(Clone)]
pub struct ReferenceFunction {
    inputs: usize,
    outputs: usize,
    function: Arc<dyn Fn(&[bool]) -> Vec<bool> + Send + Sync>,
}

impl ReferenceFunction {
    /// Wraps a pure function over `inputs` bits.
    ///
    /// The function is probed on every combination; it must return the same
    /// number of outputs each time.
    pub fn new(
        inputs: usize,
        function: impl Fn(&[bool]) -> Vec<bool> + Send + Sync + 'static,
    ) -> Result<Self, LevelError> {
        if inputs > MAX_CIRCUIT_INPUTS {
            return Err(LevelError::TooManyInputs(inputs));
        }
        let outputs = function(&combination(0, inputs)).len();
        for k in 1..combinations(inputs) {
            let actual = function(&combination(k, inputs)).len();
            if actual != outputs {
                return Err(LevelError::ReferenceArity {
                    combination: k,
                    expected: outputs,
                    actual,
                });
            }
        }
        Ok(Self {
            inputs,
            outputs,
            function: Arc::new(function),
        })
    }

    pub fn from_truth_table(table: TruthTable) -> Result<Self, TableError> {
        table.validate()?;
        let inputs = table.inputs();
        let outputs = table.outputs();
        Ok(Self {
            inputs,
            outputs,
            function: Arc::new(move |bits: &[bool]| {
                table.lookup(bits).unwrap_or_else(|| vec![false; outputs])
            }),
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn call(&self, inputs: &[bool]) -> Vec<bool> {
        (self.function)(inputs)
    }

    pub fn truth_table(&self) -> Result<TruthTable, TableError> {
        TruthTable::tabulate(self.inputs, |bits| self.call(bits))
    }
}

impl fmt::Debug for ReferenceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceFunction")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn deserialized_tables_are_validated() {
        let table: TruthTable =
            serde_json::from_str(r#"{"inputs":2,"rows":["0","1","1","0"]}"#).unwrap();
        assert_eq!(table.lookup(&[true, false]), Some(vec![true]));

        for json in [
            r#"{"inputs":1,"rows":["0","1","1"]}"#,
            r#"{"inputs":65,"rows":["0"]}"#,
            r#"{"inputs":1,"rows":["0","2"]}"#,
            r#"{"inputs":1,"rows":["",""]}"#,
        ] {
            assert!(serde_json::from_str::<TruthTable>(json).is_err(), "{json}");
        }
    }

    #[test]
    fn combinations_are_msb_first() {
        assert_eq!(combination(0, 3), vec![false, false, false]);
        assert_eq!(combination(1, 3), vec![false, false, true]);
        assert_eq!(combination(4, 3), vec![true, false, false]);
        assert_eq!(combination(0, 0), Vec::<bool>::new());
        for k in 0..16 {
            assert_eq!(encode(&combination(k, 4)), k);
        }
    }

    #[test]
    fn table_lookup() {
        let or = TruthTable::new(2, ["0", "1", "1", "1"].map(String::from).to_vec()).unwrap();
        assert_eq!(or.lookup(&[false, false]), Some(vec![false]));
        assert_eq!(or.lookup(&[true, false]), Some(vec![true]));
        assert_eq!(or.lookup(&[true]), None);
        assert_eq!(or.to_string(), "00 | 0\n01 | 1\n10 | 1\n11 | 1\n");
    }

    #[test]
    fn table_validation() {
        let rows = |r: &[&str]| r.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            TruthTable::new(1, rows(&["0", "1", "1"])),
            Err(TableError::RowCount {
                inputs: 1,
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            TruthTable::new(1, rows(&["01", "1"])),
            Err(TableError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            TruthTable::new(1, rows(&["0", "x"])),
            Err(TableError::InvalidBit { row: 1, found: 'x' })
        );
        assert_eq!(TruthTable::new(0, rows(&[""])), Err(TableError::NoOutputs));
    }

    #[test]
    fn reference_from_table_matches_closure() {
        let closure = ReferenceFunction::new(2, |i| vec![i[0] ^ i[1]]).unwrap();
        let table = closure.truth_table().unwrap();
        let tabled = ReferenceFunction::from_truth_table(table).unwrap();
        for k in 0..4 {
            let bits = combination(k, 2);
            assert_eq!(closure.call(&bits), tabled.call(&bits));
        }
        assert_eq!(tabled.outputs(), 1);
    }

    #[test]
    fn inconsistent_reference_is_rejected() {
        let err = ReferenceFunction::new(1, |i| if i[0] { vec![true, true] } else { vec![false] })
            .unwrap_err();
        assert_eq!(
            err,
            LevelError::ReferenceArity {
                combination: 1,
                expected: 1,
                actual: 2
            }
        );
    }
}
