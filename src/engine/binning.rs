// Horizontal binning: per-sensor temporal decimation. Ascending samples are
// scanned into clusters narrower than the horizontal window and merged per
// the sensor's catalog strategy.

use crate::catalog::BucketingStrategy;
use crate::models::Sample;

/// One decimated point of a single sensor's series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinnedSample {
    pub value: Option<f64>,
    pub time: i64,
}

/// Decimates an ascending series. A cluster starts at index i and extends
/// while `sample[j].time - sample[i].time < horizontal_window_ms`. Singleton
/// clusters pass through unchanged, so the pass is idempotent on already
/// decimated input.
pub fn bin_series(
    samples: &[Sample],
    strategy: BucketingStrategy,
    horizontal_window_ms: i64,
) -> Vec<BinnedSample> {
    let mut out = Vec::with_capacity(samples.len());
    let mut i = 0;
    while i < samples.len() {
        let mut j = i + 1;
        while j < samples.len() && samples[j].time - samples[i].time < horizontal_window_ms {
            j += 1;
        }
        let cluster = &samples[i..j];
        if cluster.len() == 1 {
            out.push(BinnedSample {
                value: cluster[0].value,
                time: cluster[0].time,
            });
        } else if let Some(merged) = merge_cluster(cluster, strategy) {
            out.push(merged);
        }
        i = j;
    }
    out
}

fn merge_cluster(cluster: &[Sample], strategy: BucketingStrategy) -> Option<BinnedSample> {
    match strategy {
        BucketingStrategy::Average => {
            let contributing: Vec<(f64, i64)> = cluster
                .iter()
                .filter_map(|s| s.value.map(|v| (v, s.time)))
                .collect();
            if contributing.is_empty() {
                // all-null cluster emits nothing
                return None;
            }
            let n = contributing.len();
            let value = contributing.iter().map(|(v, _)| v).sum::<f64>() / n as f64;
            let time = contributing.iter().map(|(_, t)| t).sum::<i64>() / n as i64;
            Some(BinnedSample {
                value: Some(value),
                time,
            })
        }
        // First/last member unconditionally, matching the original server
        // (not the numeric extrema).
        BucketingStrategy::Min => cluster.first().map(|s| BinnedSample {
            value: s.value,
            time: s.time,
        }),
        BucketingStrategy::Max => cluster.last().map(|s| BinnedSample {
            value: s.value,
            time: s.time,
        }),
        BucketingStrategy::Majority => Some(merge_majority(cluster)),
    }
}

/// Mode by strictly-greater running count: scanning in order, a value takes
/// the lead only when its count exceeds the current maximum, so ties go to
/// the first value that reached the top count. Emits that value's
/// first-seen time.
fn merge_majority(cluster: &[Sample]) -> BinnedSample {
    // (value, first_seen_time, count)
    let mut counts: Vec<(Option<f64>, i64, usize)> = Vec::new();
    let mut best_idx = 0;
    let mut best_count = 0;
    for s in cluster {
        let idx = match counts.iter().position(|(v, _, _)| *v == s.value) {
            Some(k) => {
                counts[k].2 += 1;
                k
            }
            None => {
                counts.push((s.value, s.time, 1));
                counts.len() - 1
            }
        };
        if counts[idx].2 > best_count {
            best_count = counts[idx].2;
            best_idx = idx;
        }
    }
    let (value, first_seen, _) = counts[best_idx];
    BinnedSample {
        value,
        time: first_seen,
    }
}
