// Widget data request descriptor (same JSON shape as the Kotlin client protocol).
// Modes, categories and range units are closed enums; a payload carrying an
// unknown variant is rejected at deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    First,
    Cache,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetCategory {
    #[serde(rename = "single", alias = "single-value")]
    Single,
    #[serde(rename = "multi", alias = "multi-value")]
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Sample,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRange {
    pub unit: RangeUnit,
    pub amount: u32,
}

/// One sensor selection inside a category: plant-head prefix (e.g. "H02")
/// plus the bare sensor names it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFilter {
    #[serde(default)]
    pub head_number: Option<String>,
    pub sensor_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDataRequest {
    pub request_type: RequestType,
    pub widget_category: WidgetCategory,
    pub data_range: DataRange,
    /// Continuation bound for `cache` requests: fetch strictly before this time.
    #[serde(default)]
    pub cache_data_request_max_time: Option<i64>,
    /// Continuation bound for `new` requests: fetch at or after this time.
    #[serde(default)]
    pub new_data_request_min_time: Option<i64>,
    /// Sensor selections keyed by store category.
    #[serde(default)]
    pub sensors: BTreeMap<String, Vec<SensorFilter>>,
    #[serde(default)]
    pub aggregations: Vec<AggregationSpec>,
}
