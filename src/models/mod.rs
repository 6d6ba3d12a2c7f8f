// Domain models (ported from shared Kotlin)

mod bucket;
mod request;
mod response;
mod sample;

pub use bucket::{AggregationValue, BucketedSample, SensorValue};
pub use request::{
    AggregationSpec, DataRange, RangeUnit, RequestType, SensorFilter, WidgetCategory,
    WidgetDataRequest,
};
pub use response::{WidgetDataResponse, WireBucket};
pub use sample::{Sample, SamplePoint, SampleRecord};
