//! Level definitions as data.
//!
//! A level pack is a JSON document listing [`LevelSpec`]s; the built-in
//! campaign ships in `levels/campaign.json`.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    budget::GateBudget,
    circuit::{Level, LevelError, ReferenceFunction, TableError, TruthTable},
};

const CAMPAIGN: &str = include_str!("../levels/campaign.json");

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read level pack: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed level pack: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Level {name}: {source}")]
    Table { name: String, source: TableError },
    #[error("Level {name}: {source}")]
    Level { name: String, source: LevelError },
}
pub type ConfigError = Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    /// Default circuit input values; also fixes the input count.
    pub inputs: Vec<bool>,
    pub budget: GateBudget,
    pub target: TruthTable,
}

impl LevelSpec {
    pub fn build(&self) -> Result<Level, ConfigError> {
        let reference =
            ReferenceFunction::from_truth_table(self.target.clone()).map_err(|source| ConfigError::Table {
                name: self.name.clone(),
                source,
            })?;
        Level::new(self.name.clone(), self.inputs.clone(), self.budget.clone(), reference).map_err(
            |source| ConfigError::Level {
                name: self.name.clone(),
                source,
            },
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: Vec<LevelSpec>,
}

impl LevelPack {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let pack = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), levels = pack.levels.len(), "level pack loaded");
        Ok(pack)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds every level, failing on the first invalid one.
    pub fn build(&self) -> Result<Vec<Level>, ConfigError> {
        self.levels.iter().map(LevelSpec::build).collect()
    }
}

/// The levels bundled with the game.
pub fn campaign() -> Result<Vec<Level>, ConfigError> {
    LevelPack::from_json(CAMPAIGN)?.build()
}
