// Raw sample shapes as returned by the sample store.

use serde::{Deserialize, Serialize};

/// One flat raw reading. `value` is None when the sensor emitted an empty reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub sensor_name: String,
    pub value: Option<f64>,
    pub time: i64,
}

impl Sample {
    pub fn new(sensor_name: impl Into<String>, value: Option<f64>, time: i64) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            value,
            time,
        }
    }
}

/// One timestamped point without a sensor name (single-variable store groups).
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub value: Option<f64>,
    pub time: i64,
}

/// A store record: either samples that already carry sensor names, or a
/// single-variable group whose name must be stamped onto each point before
/// grouping.
#[derive(Debug, Clone)]
pub enum SampleRecord {
    Named { samples: Vec<Sample> },
    Grouped { sensor_name: String, points: Vec<SamplePoint> },
}
