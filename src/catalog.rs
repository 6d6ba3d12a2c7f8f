// Sensor catalog: bucketing strategy per sensor, resolved by suffix match
// against emitted sample names (absorbs head-number prefixes like "H02_").

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How the horizontal binner merges a cluster of nearby samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketingStrategy {
    Average,
    /// Emits the first cluster member unchanged (not the numeric minimum;
    /// carried over verbatim from the original server).
    Min,
    /// Emits the last cluster member unchanged (not the numeric maximum).
    Max,
    Majority,
}

impl FromStr for BucketingStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(BucketingStrategy::Average),
            "min" => Ok(BucketingStrategy::Min),
            "max" => Ok(BucketingStrategy::Max),
            "majority" => Ok(BucketingStrategy::Majority),
            other => Err(EngineError::UnknownBucketingStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorInfo {
    /// Catalog-internal name, matched as a suffix of emitted sample names.
    pub name: String,
    pub bucketing: BucketingStrategy,
}

#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    entries: Vec<SensorInfo>,
}

impl SensorCatalog {
    pub fn new(entries: Vec<SensorInfo>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SensorInfo] {
        &self.entries
    }

    /// Finds the entry whose internal name is a suffix of `sample_name`.
    pub fn resolve(&self, sample_name: &str) -> Option<&SensorInfo> {
        self.entries.iter().find(|e| sample_name.ends_with(&e.name))
    }
}
