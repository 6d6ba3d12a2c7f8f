// Request window resolution: descriptor -> fetch window + sample-count limit.

use chrono::{DateTime, Datelike, Days, Months, Utc};

use crate::error::EngineError;
use crate::models::{RangeUnit, RequestType, WidgetDataRequest};

/// Bounds handed to the sample store. `samples_required == 0` means
/// unbounded; `min_time`/`max_time` default to the full axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub samples_required: u32,
    pub min_time: i64,
    pub max_time: i64,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self {
            samples_required: 0,
            min_time: 0,
            max_time: i64::MAX,
        }
    }
}

/// Turns the request descriptor into a fetch window. `now_ms` pins calendar
/// ranges so callers (and tests) control the clock.
pub fn resolve_window(
    req: &WidgetDataRequest,
    now_ms: i64,
    cache_page_size: u32,
) -> Result<FetchWindow, EngineError> {
    let mut window = FetchWindow::default();
    match req.request_type {
        RequestType::First => {
            let amount = req.data_range.amount;
            if amount == 0 {
                return Err(EngineError::InvalidRequest(
                    "dataRange.amount must be > 0".into(),
                ));
            }
            match req.data_range.unit {
                RangeUnit::Sample => window.samples_required = amount,
                RangeUnit::Day => window.min_time = floor_days_back(now_ms, amount)?,
                RangeUnit::Week => window.min_time = floor_weeks_back(now_ms, amount)?,
                RangeUnit::Month => window.min_time = floor_months_back(now_ms, amount)?,
            }
        }
        RequestType::Cache => {
            window.samples_required = cache_page_size;
            window.max_time = req.cache_data_request_max_time.ok_or_else(|| {
                EngineError::InvalidRequest(
                    "cacheDataRequestMaxTime is required for cache requests".into(),
                )
            })?;
        }
        RequestType::New => {
            window.min_time = req.new_data_request_min_time.ok_or_else(|| {
                EngineError::InvalidRequest(
                    "newDataRequestMinTime is required for new requests".into(),
                )
            })?;
        }
    }
    Ok(window)
}

fn utc(ms: i64) -> Result<DateTime<Utc>, EngineError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| EngineError::InvalidRequest(format!("timestamp out of range: {ms}")))
}

fn midnight(dt: DateTime<Utc>) -> i64 {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|n| n.and_utc().timestamp_millis())
        .unwrap_or(dt.timestamp_millis())
}

/// now - `amount` days, floored to the start of that day.
fn floor_days_back(now_ms: i64, amount: u32) -> Result<i64, EngineError> {
    let dt = utc(now_ms)?
        .checked_sub_days(Days::new(amount as u64))
        .ok_or_else(|| EngineError::InvalidRequest("dataRange.amount out of range".into()))?;
    Ok(midnight(dt))
}

/// now - `amount` weeks, floored to that ISO week's Monday.
fn floor_weeks_back(now_ms: i64, amount: u32) -> Result<i64, EngineError> {
    let dt = utc(now_ms)?
        .checked_sub_days(Days::new(7 * amount as u64))
        .ok_or_else(|| EngineError::InvalidRequest("dataRange.amount out of range".into()))?;
    let back_to_monday = dt.weekday().num_days_from_monday() as u64;
    let monday = dt
        .checked_sub_days(Days::new(back_to_monday))
        .ok_or_else(|| EngineError::InvalidRequest("dataRange.amount out of range".into()))?;
    Ok(midnight(monday))
}

/// now - `amount` months, floored to the first of that month.
fn floor_months_back(now_ms: i64, amount: u32) -> Result<i64, EngineError> {
    let dt = utc(now_ms)?
        .checked_sub_months(Months::new(amount))
        .ok_or_else(|| EngineError::InvalidRequest("dataRange.amount out of range".into()))?;
    let first = dt
        .with_day(1)
        .ok_or_else(|| EngineError::InvalidRequest("dataRange.amount out of range".into()))?;
    Ok(midnight(first))
}
