//! Time-Series Containers
//!
//! This module provides the data carried between graph sockets: a titled,
//! timestamp-ordered univariate series, and a longitudinal collection of
//! such series (panel data).
//!
//! # Ordering
//!
//! A `TimeSeries` keeps its points sorted by timestamp at all times. `push`
//! appends when the new point is at or after the current tail and falls back
//! to a sorted insert otherwise, so callers never observe an out-of-order
//! series.

use chrono::{DateTime, Duration, Utc};

/// A univariate time series: one `f64` observation per timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    title: String,
    stamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create an empty, untitled series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with the given title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build a series from evenly spaced observations starting at `start`.
    pub fn from_values(
        start: DateTime<Utc>,
        step: Duration,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        let mut series = Self::new();
        for (i, value) in values.into_iter().enumerate() {
            series.push(start + step * i as i32, value);
        }
        series
    }

    /// The series title (may be empty).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the series title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Append an observation, inserting in timestamp order when needed.
    ///
    /// Equal timestamps are kept in insertion order, after any existing
    /// point with the same stamp.
    pub fn push(&mut self, stamp: DateTime<Utc>, value: f64) {
        match self.stamps.last() {
            Some(last) if *last > stamp => {
                let at = self.stamps.partition_point(|s| *s <= stamp);
                self.stamps.insert(at, stamp);
                self.values.insert(at, value);
            }
            _ => {
                self.stamps.push(stamp);
                self.values.push(value);
            }
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// True when the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Timestamp of the observation at position `t`.
    pub fn timestamp(&self, t: usize) -> Option<DateTime<Utc>> {
        self.stamps.get(t).copied()
    }

    /// Value of the observation at position `t`.
    pub fn value(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    /// All values in timestamp order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// All timestamps in order.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.stamps
    }

    /// Step-function lookup: the value of the latest observation at or
    /// before `stamp`, or `None` when `stamp` precedes the first point.
    pub fn value_at_time(&self, stamp: DateTime<Utc>) -> Option<f64> {
        let at = self.stamps.partition_point(|s| *s <= stamp);
        if at == 0 {
            None
        } else {
            Some(self.values[at - 1])
        }
    }

    /// Iterate over `(timestamp, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.stamps.iter().copied().zip(self.values.iter().copied())
    }
}

/// Longitudinal data: an ordered collection of separate univariate series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Longitudinal {
    series: Vec<TimeSeries>,
}

impl Longitudinal {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member series.
    pub fn push(&mut self, series: TimeSeries) {
        self.series.push(series);
    }

    /// Number of member series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when there are no member series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The member series at position `i`.
    pub fn get(&self, i: usize) -> Option<&TimeSeries> {
        self.series.get(i)
    }

    /// Iterate over the member series in order.
    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.series.iter()
    }
}

impl From<Vec<TimeSeries>> for Longitudinal {
    fn from(series: Vec<TimeSeries>) -> Self {
        Self { series }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(n * 86_400, 0).unwrap()
    }

    #[test]
    fn push_keeps_timestamp_order() {
        let mut ts = TimeSeries::new();
        ts.push(day(2), 2.0);
        ts.push(day(0), 0.0);
        ts.push(day(1), 1.0);

        assert_eq!(ts.values(), &[0.0, 1.0, 2.0]);
        assert_eq!(ts.timestamp(0), Some(day(0)));
        assert_eq!(ts.timestamp(2), Some(day(2)));
    }

    #[test]
    fn from_values_spaces_evenly() {
        let ts = TimeSeries::from_values(day(0), Duration::days(1), [5.0, 6.0, 7.0]);
        assert_eq!(ts.len(), 3);
        assert_eq!(ts.timestamp(1), Some(day(1)));
        assert_eq!(ts.value(2), Some(7.0));
    }

    #[test]
    fn value_at_time_is_a_step_function() {
        let ts = TimeSeries::from_values(day(0), Duration::days(2), [1.0, 2.0, 3.0]);

        assert_eq!(ts.value_at_time(day(0)), Some(1.0));
        assert_eq!(ts.value_at_time(day(1)), Some(1.0));
        assert_eq!(ts.value_at_time(day(2)), Some(2.0));
        assert_eq!(ts.value_at_time(day(9)), Some(3.0));
    }

    #[test]
    fn value_at_time_before_first_point_is_absent() {
        let ts = TimeSeries::from_values(day(5), Duration::days(1), [1.0]);
        assert_eq!(ts.value_at_time(day(4)), None);
    }

    #[test]
    fn longitudinal_holds_member_series() {
        let mut panel = Longitudinal::new();
        panel.push(TimeSeries::with_title("a"));
        panel.push(TimeSeries::with_title("b"));

        assert_eq!(panel.len(), 2);
        assert_eq!(panel.get(1).map(TimeSeries::title), Some("b"));
    }
}
