// Aligned bucket: one synchronized row across all requested sensors.
// A single tagged value per sensor replaces the Kotlin server's three
// parallel active/filler/all maps; the wire maps are derived on the way out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-sensor slot in an aligned bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    /// Freshly consumed in this bucket (the reading itself may be empty).
    Active(Option<f64>),
    /// Last observation carried forward from the preceding bucket.
    Carried(f64),
    /// No fresh reading and nothing to carry.
    Missing,
}

impl SensorValue {
    /// The numeric value this slot contributes to `allData`, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            SensorValue::Active(v) => *v,
            SensorValue::Carried(v) => Some(*v),
            SensorValue::Missing => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SensorValue::Active(_))
    }

    pub fn is_carried(&self) -> bool {
        matches!(self, SensorValue::Carried(_))
    }
}

/// One computed aggregation: the scalar plus an optional human-readable note
/// (source time for min/max, sample count for average).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationValue {
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// One row of the synchronized series. `time` is the truncated mean of the
/// consumed sample times; `min_time`/`max_time` bound them. Machinery-off rows
/// carry empty data maps and the gap bounds in `off_from`/`off_to`.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSample {
    pub time: i64,
    pub min_time: i64,
    pub max_time: i64,
    pub data: BTreeMap<String, SensorValue>,
    pub aggregation_data: BTreeMap<String, AggregationValue>,
    pub active: bool,
    pub machinery_off: bool,
    pub off_from: Option<i64>,
    pub off_to: Option<i64>,
}

impl BucketedSample {
    /// Empty active bucket at `time` (data filled in by the aligner).
    pub fn at(time: i64) -> Self {
        Self {
            time,
            min_time: time,
            max_time: time,
            data: BTreeMap::new(),
            aggregation_data: BTreeMap::new(),
            active: true,
            machinery_off: false,
            off_from: None,
            off_to: None,
        }
    }

    /// Placeholder row marking a detected outage between `off_from` and `off_to`.
    pub fn off_period(time: i64, off_from: i64, off_to: i64) -> Self {
        Self {
            machinery_off: true,
            off_from: Some(off_from),
            off_to: Some(off_to),
            ..Self::at(time)
        }
    }

    /// Sensors whose slot is a carried-forward value.
    pub fn carried_sensors(&self) -> Vec<String> {
        self.data
            .iter()
            .filter(|(_, v)| v.is_carried())
            .map(|(k, _)| k.clone())
            .collect()
    }
}
