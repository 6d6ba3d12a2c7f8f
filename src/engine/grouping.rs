// Sensor grouping: partition flat samples per sensor, apply the page limit,
// derive the tri-state end-of-data hint, sort ascending.

use std::collections::HashMap;

use crate::catalog::{BucketingStrategy, SensorCatalog};
use crate::error::EngineError;
use crate::models::Sample;

/// What the page limit revealed about remaining data.
/// `Indefinite` means every sensor filled its page exactly, so a cheaper
/// probe has to decide (see the end-of-data resolution in `engine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfDataHint {
    MoreData,
    Indefinite,
    Exhausted,
}

/// One sensor's samples plus its catalog-resolved merge strategy.
#[derive(Debug, Clone)]
pub struct SensorSeries {
    pub name: String,
    pub strategy: BucketingStrategy,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone)]
pub struct GroupedSamples {
    pub series: Vec<SensorSeries>,
    pub hint: EndOfDataHint,
    /// Earliest timestamp across all series (i64::MAX when everything is empty).
    pub min_sample_time: i64,
}

/// Partitions `samples` by emitted sensor name, preserving arrival order
/// (the store returns newest-first, so pre-sort truncation keeps the newest
/// page). Names with no catalog entry fail with `UnknownSensor`.
pub fn group_samples(
    samples: Vec<Sample>,
    samples_required: u32,
    catalog: &SensorCatalog,
) -> Result<GroupedSamples, EngineError> {
    let mut series: Vec<SensorSeries> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let idx = match index.get(&sample.sensor_name) {
            Some(&i) => i,
            None => {
                let info = catalog
                    .resolve(&sample.sensor_name)
                    .ok_or_else(|| EngineError::UnknownSensor(sample.sensor_name.clone()))?;
                index.insert(sample.sensor_name.clone(), series.len());
                series.push(SensorSeries {
                    name: sample.sensor_name.clone(),
                    strategy: info.bucketing,
                    samples: Vec::new(),
                });
                series.len() - 1
            }
        };
        series[idx].samples.push(sample);
    }

    let hint = if samples_required == 0 {
        EndOfDataHint::Indefinite
    } else {
        let limit = samples_required as usize;
        let mut any_exceeded = false;
        let mut all_at_limit = true;
        for s in &mut series {
            if s.samples.len() > limit {
                any_exceeded = true;
                s.samples.truncate(limit);
            } else if s.samples.len() < limit {
                all_at_limit = false;
            }
        }
        if any_exceeded {
            EndOfDataHint::MoreData
        } else if all_at_limit {
            EndOfDataHint::Indefinite
        } else {
            EndOfDataHint::Exhausted
        }
    };

    for s in &mut series {
        s.samples.sort_by_key(|sample| sample.time);
    }

    let min_sample_time = series
        .iter()
        .filter_map(|s| s.samples.first().map(|sample| sample.time))
        .min()
        .unwrap_or(i64::MAX);

    Ok(GroupedSamples {
        series,
        hint,
        min_sample_time,
    })
}
