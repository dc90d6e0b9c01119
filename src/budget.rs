use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::gate_type::GateType;

/// Remaining-count value meaning "no limit".
pub const UNLIMITED: i32 = -1;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("No {0} gates left to place")]
    Exceeded(String),
    #[error("Gate type {0} is not available in this level")]
    NotAllowed(String),
}
pub type BudgetError = Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remaining {
    Unlimited,
    Left(u32),
}

/// How many gates of each type may still be placed.
///
/// Keys are gate type names in upper case; a negative count is unlimited.
/// Types absent from the map are not allowed at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct GateBudget {
    remaining: BTreeMap<String, i32>,
}

impl From<BTreeMap<String, i32>> for GateBudget {
    fn from(map: BTreeMap<String, i32>) -> Self {
        Self {
            remaining: map.into_iter().map(|(name, count)| (key(&name), count)).collect(),
        }
    }
}

impl From<GateBudget> for BTreeMap<String, i32> {
    fn from(budget: GateBudget) -> Self {
        budget.remaining
    }
}

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl GateBudget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every primitive type, unlimited.
    pub fn free_play() -> Self {
        Self::unlimited(GateType::ALL.iter().map(|t| t.name()))
    }

    pub fn unlimited<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().fold(Self::new(), |budget, name| budget.with(name, UNLIMITED))
    }

    #[must_use]
    pub fn with(mut self, name: &str, count: i32) -> Self {
        self.set(name, count);
        self
    }

    pub fn set(&mut self, name: &str, count: i32) {
        self.remaining.insert(key(name), count);
    }

    pub fn remaining(&self, name: &str) -> Option<Remaining> {
        self.remaining.get(&key(name)).map(|&count| match u32::try_from(count) {
            Ok(left) => Remaining::Left(left),
            Err(_) => Remaining::Unlimited,
        })
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.remaining.contains_key(&key(name))
    }

    pub fn can_place(&self, name: &str) -> bool {
        matches!(
            self.remaining(name),
            Some(Remaining::Unlimited | Remaining::Left(1..))
        )
    }

    /// Consumes one placement of `name`.
    pub fn take(&mut self, name: &str) -> Result<(), BudgetError> {
        let count = self
            .remaining
            .get_mut(&key(name))
            .ok_or_else(|| BudgetError::NotAllowed(name.to_owned()))?;
        match *count {
            0 => Err(BudgetError::Exceeded(name.to_owned())),
            c if c < 0 => Ok(()),
            _ => {
                *count -= 1;
                Ok(())
            }
        }
    }

    /// Returns a placement of `name`, e.g. when the gate is deleted again.
    pub fn refund(&mut self, name: &str) {
        if let Some(count) = self.remaining.get_mut(&key(name)) {
            if *count >= 0 {
                *count += 1;
            }
        }
    }

    /// Allowed type names, in sorted order.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.remaining.keys().map(String::as_str)
    }
}
