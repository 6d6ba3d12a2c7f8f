// Response partitioning: route the aligned series into the cache/display/new
// buckets the widget protocol expects. Single-value widgets surface only the
// final (scalar) bucket; the series behind it goes to the client cache.

use crate::models::{BucketedSample, RequestType, WidgetCategory};

#[derive(Debug, Default)]
pub struct PartitionedSeries {
    pub cached: Vec<BucketedSample>,
    pub display: Vec<BucketedSample>,
    pub new: Vec<BucketedSample>,
}

pub fn partition_series(
    mut buckets: Vec<BucketedSample>,
    request_type: RequestType,
    widget_category: WidgetCategory,
) -> PartitionedSeries {
    let mut parts = PartitionedSeries::default();
    match (request_type, widget_category) {
        (RequestType::First, WidgetCategory::Single) => {
            parts.display.extend(buckets.pop());
            parts.cached = buckets;
        }
        (RequestType::First, WidgetCategory::Multi) => parts.display = buckets,
        (RequestType::Cache, _) => parts.cached = buckets,
        (RequestType::New, WidgetCategory::Single) => {
            parts.new.extend(buckets.pop());
            parts.cached = buckets;
        }
        (RequestType::New, WidgetCategory::Multi) => parts.new = buckets,
    }
    parts
}
