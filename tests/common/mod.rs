// Shared test helpers

use std::collections::BTreeMap;

use sensorhub::catalog::{BucketingStrategy, SensorCatalog, SensorInfo};
use sensorhub::config::EngineConfig;
use sensorhub::models::*;

pub fn sample(name: &str, value: f64, time: i64) -> Sample {
    Sample::new(name, Some(value), time)
}

pub fn null_sample(name: &str, time: i64) -> Sample {
    Sample::new(name, None, time)
}

pub fn catalog(entries: &[(&str, BucketingStrategy)]) -> SensorCatalog {
    SensorCatalog::new(
        entries
            .iter()
            .map(|(name, bucketing)| SensorInfo {
                name: name.to_string(),
                bucketing: *bucketing,
            })
            .collect(),
    )
}

/// Engine config with tight windows suited to millisecond-scale fixtures.
pub fn engine_config() -> EngineConfig {
    EngineConfig {
        horizontal_window_ms: 100,
        vertical_window_ms: 50,
        machinery_off_threshold_ms: 600_000,
        single_padding_rows: 1,
        multi_padding_rows: 3,
        cache_page_size: 20,
    }
}

pub fn request(
    request_type: RequestType,
    widget_category: WidgetCategory,
    unit: RangeUnit,
    amount: u32,
) -> WidgetDataRequest {
    WidgetDataRequest {
        request_type,
        widget_category,
        data_range: DataRange { unit, amount },
        cache_data_request_max_time: None,
        new_data_request_min_time: None,
        sensors: BTreeMap::new(),
        aggregations: Vec::new(),
    }
}

/// Active single-sensor bucket at `time` holding one value.
pub fn value_bucket(sensor: &str, value: f64, time: i64) -> BucketedSample {
    let mut b = BucketedSample::at(time);
    b.data
        .insert(sensor.to_string(), SensorValue::Active(Some(value)));
    b
}
