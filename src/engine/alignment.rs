// Vertical alignment: synchronize the decimated series of every sensor into
// one row sequence. Each sensor advances through its own cursor; sensors
// without a fresh reading in the current window carry their last observed
// value forward. A bucket-to-bucket gap beyond the machinery-off threshold
// is filled with explicit outage rows instead of a misleading flat line,
// and the carried values that led into the gap are trimmed back out.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::EngineConfig;
use crate::models::{AggregationSpec, AggregationValue, BucketedSample, SensorValue, WidgetCategory};

use super::binning::BinnedSample;

/// Read position into one sensor's decimated series. Never regresses.
#[derive(Debug)]
struct SensorCursor {
    name: String,
    series: Vec<BinnedSample>,
    idx: usize,
}

impl SensorCursor {
    fn front(&self) -> Option<&BinnedSample> {
        self.series.get(self.idx)
    }
}

#[derive(Debug)]
pub struct VerticalAligner {
    cursors: Vec<SensorCursor>,
    aggregations: Vec<String>,
    widget_category: WidgetCategory,
    vertical_window_ms: i64,
    machinery_off_threshold_ms: i64,
    padding_rows: usize,
}

impl VerticalAligner {
    pub fn new(
        series: Vec<(String, Vec<BinnedSample>)>,
        widget_category: WidgetCategory,
        aggregations: &[AggregationSpec],
        config: &EngineConfig,
    ) -> Self {
        let cursors = series
            .into_iter()
            .map(|(name, series)| SensorCursor {
                name,
                series,
                idx: 0,
            })
            .collect();
        let padding_rows = match widget_category {
            WidgetCategory::Single => config.single_padding_rows,
            WidgetCategory::Multi => config.multi_padding_rows,
        };
        Self {
            cursors,
            aggregations: aggregations.iter().map(|a| a.name.clone()).collect(),
            widget_category,
            vertical_window_ms: config.vertical_window_ms,
            machinery_off_threshold_ms: config.machinery_off_threshold_ms,
            padding_rows,
        }
    }

    /// Runs all cursors to exhaustion and returns the aligned series.
    pub fn run(mut self) -> Vec<BucketedSample> {
        let mut out: Vec<BucketedSample> = Vec::new();
        let mut prev_real_time: Option<i64> = None;

        loop {
            let Some(min_time) = self
                .cursors
                .iter()
                .filter_map(|c| c.front().map(|s| s.time))
                .min()
            else {
                break;
            };

            let mut data: BTreeMap<String, SensorValue> = BTreeMap::new();
            let mut time_sum = 0i64;
            let mut consumed = 0i64;
            let mut bucket_min = i64::MAX;
            let mut bucket_max = i64::MIN;

            for cursor in &mut self.cursors {
                match cursor.front() {
                    Some(front) if front.time - min_time <= self.vertical_window_ms => {
                        data.insert(cursor.name.clone(), SensorValue::Active(front.value));
                        time_sum += front.time;
                        consumed += 1;
                        bucket_min = bucket_min.min(front.time);
                        bucket_max = bucket_max.max(front.time);
                        cursor.idx += 1;
                    }
                    _ => {
                        // Last observation carried forward, from the
                        // immediately preceding emitted row only. Carries
                        // that lead into or out of an outage are cleaned up
                        // by the backward trims below.
                        let carried = out
                            .last()
                            .and_then(|b| b.data.get(&cursor.name))
                            .and_then(|slot| match slot {
                                SensorValue::Active(v) => *v,
                                SensorValue::Carried(v) => Some(*v),
                                SensorValue::Missing => None,
                            });
                        let slot = match carried {
                            Some(v) => SensorValue::Carried(v),
                            None => SensorValue::Missing,
                        };
                        data.insert(cursor.name.clone(), slot);
                    }
                }
            }

            // The sensor owning min_time always consumes, so consumed >= 1.
            let mut bucket = BucketedSample::at(time_sum / consumed);
            bucket.min_time = bucket_min;
            bucket.max_time = bucket_max;
            bucket.data = data;
            if self.widget_category == WidgetCategory::Multi {
                compute_row_aggregations(&mut bucket, &self.aggregations);
            }

            if let Some(prev) = prev_real_time
                && bucket.time - prev > self.machinery_off_threshold_ms
            {
                let prior_idx = out.len() - 1;
                insert_off_padding(&mut out, prev, bucket.time, self.padding_rows);
                trim_carried_backward(&mut out, prior_idx, self.padding_rows);
            }

            prev_real_time = Some(bucket.time);
            out.push(bucket);
        }

        // The final row's carries are speculative; clear them. No padding was
        // inserted here, so the walk stays on the final row itself.
        if let Some(last) = out.len().checked_sub(1) {
            trim_carried_backward(&mut out, last, 1);
        }
        out
    }
}

/// Requested multi-value aggregations over the row's non-null values.
/// Unsupported names are ignored, not errors.
fn compute_row_aggregations(bucket: &mut BucketedSample, aggregations: &[String]) {
    let values: Vec<f64> = bucket.data.values().filter_map(|v| v.value()).collect();
    if values.is_empty() {
        return;
    }
    for name in aggregations {
        let value = match name.as_str() {
            "Minimum" => values.iter().copied().fold(f64::INFINITY, f64::min),
            "Maximum" => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "Average" => values.iter().sum::<f64>() / values.len() as f64,
            _ => continue,
        };
        bucket
            .aggregation_data
            .insert(name.clone(), AggregationValue { value, note: None });
    }
}

/// Synthesizes `rows` evenly spaced outage placeholders over (from, to).
fn insert_off_padding(out: &mut Vec<BucketedSample>, from: i64, to: i64, rows: usize) {
    let step = (to - from) / (rows as i64 + 1);
    for k in 1..=rows as i64 {
        out.push(BucketedSample::off_period(from + k * step, from, to));
    }
}

/// Walks emitted rows backward from `from_idx`, clearing the carried values
/// of the sensors that were carried in `out[from_idx]`. A sensor leaves the
/// trim set at the first row where it was actively sampled. Off-period rows
/// are skipped and the walk visits at most `lookback` real rows.
fn trim_carried_backward(out: &mut [BucketedSample], from_idx: usize, lookback: usize) {
    let mut trim: BTreeSet<String> = out[from_idx].carried_sensors().into_iter().collect();
    let mut visited = 0;
    let mut i = from_idx as isize;
    while i >= 0 && visited < lookback && !trim.is_empty() {
        let bucket = &mut out[i as usize];
        if !bucket.machinery_off {
            let mut settled: Vec<String> = Vec::new();
            for name in &trim {
                match bucket.data.get_mut(name) {
                    Some(slot) if slot.is_active() => settled.push(name.clone()),
                    Some(slot) if slot.is_carried() => *slot = SensorValue::Missing,
                    _ => {}
                }
            }
            for name in settled {
                trim.remove(&name);
            }
            visited += 1;
        }
        i -= 1;
    }
}
