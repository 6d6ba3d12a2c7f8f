// Full pipeline tests against an in-memory sample source.

mod common;

use std::collections::BTreeMap;

use common::{catalog, engine_config, request, sample};
use sensorhub::catalog::BucketingStrategy;
use sensorhub::engine::{Engine, SampleSource, normalize_records};
use sensorhub::error::EngineError;
use sensorhub::models::*;

/// Serves canned samples per category, newest first, honoring the window
/// bounds the way the real store does.
struct FakeSource {
    samples: BTreeMap<String, Vec<Sample>>,
    has_earlier: bool,
}

impl FakeSource {
    fn new(samples: BTreeMap<String, Vec<Sample>>) -> Self {
        Self {
            samples,
            has_earlier: false,
        }
    }
}

impl SampleSource for FakeSource {
    async fn fetch(
        &self,
        category: &str,
        _filters: &[SensorFilter],
        min_time: i64,
        max_time: i64,
    ) -> Result<Vec<SampleRecord>, EngineError> {
        let mut samples: Vec<Sample> = self
            .samples
            .get(category)
            .map(|s| {
                s.iter()
                    .filter(|x| x.time >= min_time && x.time < max_time)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        samples.sort_by_key(|s| std::cmp::Reverse(s.time));
        Ok(vec![SampleRecord::Named { samples }])
    }

    async fn has_sample_before(
        &self,
        _category: &str,
        _filters: &[SensorFilter],
        _time: i64,
    ) -> Result<bool, EngineError> {
        Ok(self.has_earlier)
    }
}

fn test_catalog() -> sensorhub::catalog::SensorCatalog {
    catalog(&[
        ("temperature", BucketingStrategy::Average),
        ("pressure", BucketingStrategy::Average),
    ])
}

fn sensors_for(category: &str) -> BTreeMap<String, Vec<SensorFilter>> {
    BTreeMap::from([(
        category.to_string(),
        vec![SensorFilter {
            head_number: Some("H02".to_string()),
            sensor_names: vec!["temperature".to_string(), "pressure".to_string()],
        }],
    )])
}

fn engine_with(samples: Vec<Sample>, has_earlier: bool) -> Engine<FakeSource> {
    let mut source = FakeSource::new(BTreeMap::from([("machines".to_string(), samples)]));
    source.has_earlier = has_earlier;
    Engine::new(source, test_catalog(), engine_config())
}

const NOW: i64 = 1_700_000_000_000;

#[tokio::test]
async fn first_multi_returns_display_series() {
    let samples = vec![
        sample("H02_temperature", 20.0, 1_000),
        sample("H02_pressure", 5.0, 1_010),
        sample("H02_temperature", 21.0, 2_000),
        sample("H02_pressure", 6.0, 2_020),
    ];
    let engine = engine_with(samples, false);
    let mut req = request(
        RequestType::First,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        10,
    );
    req.sensors = sensors_for("machines");

    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert_eq!(out.display_sensor_data.len(), 2);
    assert!(out.cached_sensor_data.is_empty());
    assert!(out.new_sensor_data.is_empty());
    assert_eq!(out.num_sensor_data, 2);
    let first = &out.display_sensor_data[0];
    assert_eq!(first.active_data["H02_temperature"], Some(20.0));
    assert_eq!(first.active_data["H02_pressure"], Some(5.0));
    assert_eq!(out.min_display_time, first.time);
    // both sensors underfilled the page of 10 -> exhausted
    assert!(out.end_of_data);
}

#[tokio::test]
async fn carried_value_lands_in_filler_data() {
    let samples = vec![
        sample("H02_temperature", 1.0, 0),
        sample("H02_temperature", 2.0, 1_000),
        sample("H02_temperature", 3.0, 5_000),
        sample("H02_pressure", 9.0, 0),
    ];
    let engine = engine_with(samples, false);
    let mut req = request(
        RequestType::First,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        10,
    );
    req.sensors = sensors_for("machines");

    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert_eq!(out.display_sensor_data.len(), 3);
    let middle = &out.display_sensor_data[1];
    assert_eq!(middle.filler_data["H02_pressure"], Some(9.0));
    assert_eq!(middle.all_data["H02_pressure"], Some(9.0));
    assert!(!middle.active_data.contains_key("H02_pressure"));
    // the trailing carry is trimmed to null
    let last = &out.display_sensor_data[2];
    assert_eq!(last.filler_data["H02_pressure"], None);
}

#[tokio::test]
async fn cache_page_overflow_means_more_data() {
    // page size 2 (config), three samples before the bound -> truncated
    let samples = vec![
        sample("H02_temperature", 1.0, 1_000),
        sample("H02_temperature", 2.0, 2_000),
        sample("H02_temperature", 3.0, 3_000),
    ];
    let mut config = engine_config();
    config.cache_page_size = 2;
    let source = FakeSource::new(BTreeMap::from([(
        "machines".to_string(),
        samples,
    )]));
    let engine = Engine::new(source, test_catalog(), config);

    let mut req = request(
        RequestType::Cache,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        10,
    );
    req.sensors = sensors_for("machines");
    req.cache_data_request_max_time = Some(10_000);

    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert!(!out.end_of_data);
    // newest page only: times 2000 and 3000
    assert_eq!(out.cached_sensor_data.len(), 2);
    assert_eq!(out.cached_sensor_data[0].time, 2_000);
    assert!(out.display_sensor_data.is_empty());
}

#[tokio::test]
async fn indefinite_hint_resolves_through_probe() {
    let samples = vec![sample("H02_temperature", 1.0, 1_000)];
    let mut req = request(
        RequestType::First,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        1,
    );
    req.sensors = sensors_for("machines");

    // exactly one sample for a page of one -> indefinite; probe decides
    let engine = engine_with(samples.clone(), true);
    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert!(!out.end_of_data);

    let engine = engine_with(samples, false);
    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert!(out.end_of_data);
}

#[tokio::test]
async fn single_widget_displays_the_aggregation_bucket() {
    let samples = vec![
        sample("H02_temperature", 1.0, 1_000),
        sample("H02_temperature", 2.0, 2_000),
        sample("H02_temperature", 3.0, 3_000),
    ];
    let engine = engine_with(samples, false);
    let mut req = request(
        RequestType::First,
        WidgetCategory::Single,
        RangeUnit::Sample,
        3,
    );
    req.sensors = BTreeMap::from([(
        "machines".to_string(),
        vec![SensorFilter {
            head_number: Some("H02".to_string()),
            sensor_names: vec!["temperature".to_string()],
        }],
    )]);
    req.aggregations = vec![AggregationSpec {
        name: "Average".to_string(),
    }];

    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert_eq!(out.display_sensor_data.len(), 1);
    let terminal = &out.display_sensor_data[0];
    assert_eq!(terminal.aggregation_data["aggregation"].value, 2.0);
    assert!(terminal.all_data.is_empty());
    // the series behind the scalar goes to the client cache
    assert_eq!(out.cached_sensor_data.len(), 3);
    assert_eq!(out.num_sensor_data, 4);
}

#[tokio::test]
async fn unknown_sensor_aborts_the_request() {
    let samples = vec![sample("H02_vibration", 1.0, 1_000)];
    let mut source = FakeSource::new(BTreeMap::from([("machines".to_string(), samples)]));
    source.has_earlier = false;
    let engine = Engine::new(source, test_catalog(), engine_config());

    let mut req = request(
        RequestType::First,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        10,
    );
    req.sensors = sensors_for("machines");

    let err = engine.widget_data_at(&req, NOW).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownSensor(_)));
    assert_eq!(err.kind(), "unknown_sensor");
}

#[tokio::test]
async fn no_sensors_yields_empty_response() {
    let engine = engine_with(Vec::new(), false);
    let mut req = request(
        RequestType::First,
        WidgetCategory::Multi,
        RangeUnit::Sample,
        10,
    );
    req.sensors = BTreeMap::new();

    let out = engine.widget_data_at(&req, NOW).await.unwrap();
    assert!(out.display_sensor_data.is_empty());
    assert_eq!(out.num_sensor_data, 0);
    assert_eq!(out.min_display_time, 0);
}

#[test]
fn grouped_records_are_stamped_with_the_sensor_name() {
    let records = vec![
        SampleRecord::Named {
            samples: vec![sample("H02_temperature", 1.0, 10)],
        },
        SampleRecord::Grouped {
            sensor_name: "H02_pressure".to_string(),
            points: vec![
                SamplePoint {
                    value: Some(2.0),
                    time: 20,
                },
                SamplePoint {
                    value: None,
                    time: 30,
                },
            ],
        },
    ];
    let mut flat = Vec::new();
    normalize_records(records, &mut flat);
    assert_eq!(flat.len(), 3);
    assert_eq!(flat[1].sensor_name, "H02_pressure");
    assert_eq!(flat[1].value, Some(2.0));
    assert_eq!(flat[2].value, None);
}
