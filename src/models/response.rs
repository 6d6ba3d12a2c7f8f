// Wire response: partitioned bucket arrays, serialized with the three-map
// shape (activeData/fillerData/allData) the dashboard clients expect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bucket::{AggregationValue, BucketedSample, SensorValue};
use super::request::RequestType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBucket {
    pub time: i64,
    pub min_time: i64,
    pub max_time: i64,
    pub active_data: BTreeMap<String, Option<f64>>,
    pub filler_data: BTreeMap<String, Option<f64>>,
    pub all_data: BTreeMap<String, Option<f64>>,
    pub aggregation_data: BTreeMap<String, AggregationValue>,
    pub active: bool,
    pub machinery_off: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_to: Option<i64>,
}

impl From<&BucketedSample> for WireBucket {
    fn from(b: &BucketedSample) -> Self {
        let mut active_data = BTreeMap::new();
        let mut filler_data = BTreeMap::new();
        let mut all_data = BTreeMap::new();
        for (sensor, slot) in &b.data {
            match slot {
                SensorValue::Active(v) => {
                    active_data.insert(sensor.clone(), *v);
                    all_data.insert(sensor.clone(), *v);
                }
                SensorValue::Carried(v) => {
                    filler_data.insert(sensor.clone(), Some(*v));
                    all_data.insert(sensor.clone(), Some(*v));
                }
                SensorValue::Missing => {
                    filler_data.insert(sensor.clone(), None);
                    all_data.insert(sensor.clone(), None);
                }
            }
        }
        Self {
            time: b.time,
            min_time: b.min_time,
            max_time: b.max_time,
            active_data,
            filler_data,
            all_data,
            aggregation_data: b.aggregation_data.clone(),
            active: b.active,
            machinery_off: b.machinery_off,
            off_from: b.off_from,
            off_to: b.off_to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDataResponse {
    pub request_type: RequestType,
    pub cached_sensor_data: Vec<WireBucket>,
    pub display_sensor_data: Vec<WireBucket>,
    pub new_sensor_data: Vec<WireBucket>,
    /// Total bucket count before partitioning.
    pub num_sensor_data: usize,
    pub min_display_time: i64,
    pub end_of_data: bool,
}
