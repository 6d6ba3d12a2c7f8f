// Widget data pipeline: window resolution -> fetch -> grouping -> horizontal
// binning -> vertical alignment -> single-value aggregation -> partitioning
// -> end-of-data resolution. One sequential pass per request over
// request-scoped data; any stage error aborts the request.

pub mod alignment;
pub mod binning;
pub mod grouping;
pub mod response;
pub mod single_value;
pub mod window;

use tracing::{debug, instrument};

use crate::catalog::SensorCatalog;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    Sample, SampleRecord, SensorFilter, WidgetCategory, WidgetDataRequest, WidgetDataResponse,
    WireBucket,
};

use grouping::EndOfDataHint;

/// Raw sample store seam. Implemented by `SampleRepo`; tests plug in
/// in-memory fakes.
pub trait SampleSource: Send + Sync {
    /// Samples for one category/filter set within the window, newest first.
    fn fetch(
        &self,
        category: &str,
        filters: &[SensorFilter],
        min_time: i64,
        max_time: i64,
    ) -> impl Future<Output = Result<Vec<SampleRecord>, EngineError>> + Send;

    /// Whether any in-scope sensor has a sample strictly before `time`.
    fn has_sample_before(
        &self,
        category: &str,
        filters: &[SensorFilter],
        time: i64,
    ) -> impl Future<Output = Result<bool, EngineError>> + Send;
}

pub struct Engine<S> {
    source: S,
    catalog: SensorCatalog,
    config: EngineConfig,
}

impl<S: SampleSource> Engine<S> {
    pub fn new(source: S, catalog: SensorCatalog, config: EngineConfig) -> Self {
        Self {
            source,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub async fn widget_data(
        &self,
        req: &WidgetDataRequest,
    ) -> Result<WidgetDataResponse, EngineError> {
        self.widget_data_at(req, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Deterministic entry point: `now_ms` pins calendar-range resolution.
    #[instrument(skip_all, fields(request_type = ?req.request_type, widget_category = ?req.widget_category))]
    pub async fn widget_data_at(
        &self,
        req: &WidgetDataRequest,
        now_ms: i64,
    ) -> Result<WidgetDataResponse, EngineError> {
        let window = window::resolve_window(req, now_ms, self.config.cache_page_size)?;

        // Categories are independent but fetched sequentially for now.
        let mut flat: Vec<Sample> = Vec::new();
        for (category, filters) in &req.sensors {
            let records = self
                .source
                .fetch(category, filters, window.min_time, window.max_time)
                .await?;
            normalize_records(records, &mut flat);
        }
        debug!(samples = flat.len(), "fetched raw samples");

        let grouped = grouping::group_samples(flat, window.samples_required, &self.catalog)?;
        let hint = grouped.hint;
        let min_sample_time = grouped.min_sample_time;

        let mut aligner_input = Vec::with_capacity(grouped.series.len());
        for series in grouped.series {
            let binned = binning::bin_series(
                &series.samples,
                series.strategy,
                self.config.horizontal_window_ms,
            );
            aligner_input.push((series.name, binned));
        }

        let mut buckets = alignment::VerticalAligner::new(
            aligner_input,
            req.widget_category,
            &req.aggregations,
            &self.config,
        )
        .run();
        debug!(buckets = buckets.len(), hint = ?hint, "aligned series");

        let min_display_time = if window.min_time > 0 {
            window.min_time
        } else {
            buckets.first().map(|b| b.time).unwrap_or(0)
        };

        if req.widget_category == WidgetCategory::Single {
            single_value::append_single_value_aggregation(
                &mut buckets,
                &req.data_range,
                &req.aggregations,
                min_display_time,
            );
        }

        let num_sensor_data = buckets.len();
        let end_of_data = self.resolve_end_of_data(req, hint, min_sample_time).await?;
        let parts = response::partition_series(buckets, req.request_type, req.widget_category);

        Ok(WidgetDataResponse {
            request_type: req.request_type,
            cached_sensor_data: to_wire(&parts.cached),
            display_sensor_data: to_wire(&parts.display),
            new_sensor_data: to_wire(&parts.new),
            num_sensor_data,
            min_display_time,
            end_of_data,
        })
    }

    /// Disambiguates the grouper's tri-state hint. Only the `Indefinite`
    /// case costs a store round trip: one existence probe before the
    /// earliest fetched sample instead of re-fetching the full window.
    async fn resolve_end_of_data(
        &self,
        req: &WidgetDataRequest,
        hint: EndOfDataHint,
        min_sample_time: i64,
    ) -> Result<bool, EngineError> {
        match hint {
            EndOfDataHint::MoreData => Ok(false),
            EndOfDataHint::Exhausted => Ok(true),
            EndOfDataHint::Indefinite => {
                for (category, filters) in &req.sensors {
                    if self
                        .source
                        .has_sample_before(category, filters, min_sample_time)
                        .await?
                    {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// Flattens store records into named samples. Single-variable groups get the
/// group's sensor name stamped onto each point.
pub fn normalize_records(records: Vec<SampleRecord>, out: &mut Vec<Sample>) {
    for record in records {
        match record {
            SampleRecord::Named { samples } => out.extend(samples),
            SampleRecord::Grouped {
                sensor_name,
                points,
            } => out.extend(
                points
                    .into_iter()
                    .map(|p| Sample::new(sensor_name.clone(), p.value, p.time)),
            ),
        }
    }
}

fn to_wire(buckets: &[crate::models::BucketedSample]) -> Vec<WireBucket> {
    buckets.iter().map(WireBucket::from).collect()
}
