// Per-timescale views into a shared series
use super::reading::{Sample, TimeSeries};
use super::timescale::TimescaleToken;
use chrono::{Local, NaiveDateTime};
use std::ops::Range;
use std::sync::Arc;

/// The trailing part of a series covering one timescale.
///
/// Holds the shared series plus an index range, so any number of slices can
/// be handed to concurrent jobs without copying samples.
#[derive(Debug, Clone)]
pub struct SeriesSlice {
    series: Arc<TimeSeries>,
    range: Range<usize>,
    pub token: TimescaleToken,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SeriesSlice {
    /// Slice anchored at the newest sample of `series`. An empty series is
    /// anchored at the current local time.
    pub fn trailing(series: &Arc<TimeSeries>, token: TimescaleToken) -> Self {
        let anchor = series
            .latest()
            .unwrap_or_else(|| Local::now().naive_local());
        Self::trailing_at(series, token, anchor)
    }

    /// Samples with timestamps in `[anchor - span, anchor]`.
    pub fn trailing_at(series: &Arc<TimeSeries>, token: TimescaleToken, anchor: NaiveDateTime) -> Self {
        let start = anchor
            .checked_sub_signed(token.span())
            .unwrap_or(NaiveDateTime::MIN);
        let samples = series.samples();
        let lo = samples.partition_point(|s| s.timestamp < start);
        let hi = samples.partition_point(|s| s.timestamp <= anchor).max(lo);

        Self {
            series: Arc::clone(series),
            range: lo..hi,
            token,
            start,
            end: anchor,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.series.samples()[self.range.clone()]
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Fewer than two points cannot make a line.
    pub fn is_degenerate(&self) -> bool {
        self.len() < 2
    }
}
