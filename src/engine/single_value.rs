// Single-value widgets: reduce a trailing window of the aligned series to
// one scalar and append it as a synthetic terminal bucket. The response
// partitioner then routes that terminal bucket to the display/new slot.

use std::collections::BTreeMap;

use chrono::DateTime;

use crate::models::{AggregationSpec, AggregationValue, BucketedSample, DataRange, RangeUnit};

/// Appends the scalar bucket when an aggregation is requested. Only the
/// first requested aggregation is honored (Minimum, Maximum or Average);
/// anything else is a no-op. Nothing is appended when no eligible value
/// exists, including for Average, so a zero-sample window never puts a
/// non-finite number on the wire.
pub fn append_single_value_aggregation(
    buckets: &mut Vec<BucketedSample>,
    data_range: &DataRange,
    aggregations: &[AggregationSpec],
    display_min_time: i64,
) {
    let Some(first) = aggregations.first() else {
        return;
    };

    let appended = {
        let window = select_window(buckets, data_range, display_min_time);

        // (value, source bucket time) pairs, outage rows excluded
        let mut values: Vec<(f64, i64)> = Vec::new();
        for b in &window {
            if b.machinery_off {
                continue;
            }
            for slot in b.data.values() {
                if let Some(v) = slot.value() {
                    values.push((v, b.time));
                }
            }
        }

        let aggregation = match first.name.as_str() {
            "Minimum" => values
                .iter()
                .copied()
                .reduce(|best, next| if next.0 < best.0 { next } else { best })
                .map(|(value, t)| AggregationValue {
                    value,
                    note: Some(format_bucket_time(t)),
                }),
            "Maximum" => values
                .iter()
                .copied()
                .reduce(|best, next| if next.0 > best.0 { next } else { best })
                .map(|(value, t)| AggregationValue {
                    value,
                    note: Some(format_bucket_time(t)),
                }),
            "Average" => {
                if values.is_empty() {
                    None
                } else {
                    let sum: f64 = values.iter().map(|(v, _)| v).sum();
                    Some(AggregationValue {
                        value: sum / values.len() as f64,
                        note: Some(format!("{} samples", values.len())),
                    })
                }
            }
            _ => None,
        };

        aggregation.map(|agg| (agg, window.last().map(|b| b.time).unwrap_or(0)))
    };

    if let Some((aggregation, time)) = appended {
        let mut terminal = BucketedSample::at(time);
        terminal.aggregation_data =
            BTreeMap::from([("aggregation".to_string(), aggregation)]);
        buckets.push(terminal);
    }
}

/// Sample ranges take trailing buckets until `amount` non-outage rows are
/// collected, so off-period padding does not shrink the effective sample
/// count. Calendar ranges take everything at or after the display minimum.
fn select_window<'a>(
    buckets: &'a [BucketedSample],
    data_range: &DataRange,
    display_min_time: i64,
) -> Vec<&'a BucketedSample> {
    match data_range.unit {
        RangeUnit::Sample => {
            let mut needed = data_range.amount as usize;
            let mut start = buckets.len();
            for (i, b) in buckets.iter().enumerate().rev() {
                if needed == 0 {
                    break;
                }
                start = i;
                if !b.machinery_off {
                    needed -= 1;
                }
            }
            buckets[start..].iter().collect()
        }
        _ => buckets
            .iter()
            .filter(|b| b.time >= display_min_time)
            .collect(),
    }
}

fn format_bucket_time(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
