//! Linear Combination
//!
//! Weighted sum of `n` input series, one coefficient per input socket (the
//! socket count follows the coefficient vector). Three timestamp-alignment
//! strategies, matching the transform's configuration flags:
//!
//! - `use_times_from_first`: evaluate on the first input's timestamps,
//!   reading every other input as a step function;
//! - exact matching (default): emit a point only where all inputs share a
//!   timestamp;
//! - step-function union: evaluate at every timestamp any input has,
//!   carrying the latest earlier value of the others.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::InputBank;
use crate::connect::{check_input, check_output, Connectable, InvalidSocket};
use crate::series::TimeSeries;
use crate::value::{kinds, KindSet, Value, ValueKind};

/// Linear-combination transform node.
#[derive(Debug, Clone)]
pub struct LinearCombination {
    coefficients: Vec<f64>,
    use_times_from_first: bool,
    requires_exact_time_match: bool,
    inputs: InputBank,
    combination: Option<TimeSeries>,
    valid: bool,
}

impl Default for LinearCombination {
    fn default() -> Self {
        Self::with_coefficients(vec![1.0, -1.0])
    }
}

impl LinearCombination {
    /// The default two-input difference, coefficients `[1, -1]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A combination with the given coefficients; one input socket per
    /// coefficient.
    pub fn with_coefficients(coefficients: Vec<f64>) -> Self {
        let bank = InputBank::new(coefficients.len());
        Self {
            coefficients,
            use_times_from_first: false,
            requires_exact_time_match: true,
            inputs: bank,
            combination: None,
            valid: false,
        }
    }

    /// The coefficient vector.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Replace the coefficients, resizing the input sockets to match, and
    /// recompute against current inputs.
    pub fn set_coefficients(&mut self, coefficients: Vec<f64>) {
        self.inputs.resize(coefficients.len());
        self.coefficients = coefficients;
        self.recompute();
    }

    /// Evaluate on the first input's timestamps, reading the other inputs
    /// as step functions. Overrides exact matching.
    pub fn set_use_times_from_first(&mut self, on: bool) {
        self.use_times_from_first = on;
        self.recompute();
    }

    /// Only emit points where every input has an exact timestamp match;
    /// when off, inputs are read as step functions over the union of
    /// timestamps.
    pub fn set_requires_exact_time_match(&mut self, on: bool) {
        self.requires_exact_time_match = on;
        self.recompute();
    }

    fn combine_on_first_timestamps(&self, series: &[&TimeSeries]) -> TimeSeries {
        let mut combination = TimeSeries::with_title(self.title_for(series));
        let first = series[0];
        'points: for (stamp, x0) in first.iter() {
            let mut sum = x0 * self.coefficients[0];
            for (i, ts) in series.iter().enumerate().skip(1) {
                // A point with no earlier observation in some input has no
                // defined combination; skip it.
                match ts.value_at_time(stamp) {
                    Some(x) => sum += x * self.coefficients[i],
                    None => continue 'points,
                }
            }
            combination.push(stamp, sum);
        }
        combination
    }

    fn combine_by_merge(&self, series: &[&TimeSeries]) -> TimeSeries {
        let n = series.len();
        let mut combination = TimeSeries::with_title(self.title_for(series));
        let mut cursors = vec![0usize; n];
        let counts: Vec<usize> = series.iter().map(|ts| ts.len()).collect();

        loop {
            if cursors.iter().zip(&counts).all(|(c, len)| c >= len) {
                break;
            }

            // Current stamp per input, absent once a cursor is exhausted.
            let stamps: Vec<Option<DateTime<Utc>>> = (0..n)
                .map(|i| {
                    if cursors[i] < counts[i] {
                        series[i].timestamp(cursors[i])
                    } else {
                        None
                    }
                })
                .collect();

            let minval = stamps.iter().flatten().min().copied();
            let all_dates_same =
                stamps.iter().all(|s| s.is_some()) && stamps.windows(2).all(|w| w[0] == w[1]);

            if all_dates_same {
                let mut sum = 0.0;
                for i in 0..n {
                    sum += series[i].value(cursors[i]).unwrap_or(0.0) * self.coefficients[i];
                }
                combination.push(stamps[0].expect("all stamps present"), sum);
                for cursor in cursors.iter_mut() {
                    *cursor += 1;
                }
            } else if !self.requires_exact_time_match {
                let minval = minval.expect("at least one cursor live");
                let mut sum = 0.0;
                let mut defined = true;
                for i in 0..n {
                    if stamps[i].is_some_and(|s| s <= minval) {
                        sum += self.coefficients[i] * series[i].value(cursors[i]).unwrap_or(0.0);
                    } else if cursors[i] > 0 {
                        sum += self.coefficients[i] * series[i].value(cursors[i] - 1).unwrap_or(0.0);
                    } else {
                        defined = false;
                    }
                }
                if defined {
                    combination.push(minval, sum);
                }
                for i in 0..n {
                    if stamps[i].is_some_and(|s| s <= minval) {
                        cursors[i] += 1;
                    }
                }
            } else {
                // Exact matching: advance the earliest cursor and rescan.
                if let Some(minval) = minval {
                    for i in 0..n {
                        if stamps[i] == Some(minval) {
                            cursors[i] += 1;
                            break;
                        }
                    }
                }
            }
        }

        combination
    }

    fn title_for(&self, series: &[&TimeSeries]) -> String {
        if self.coefficients.len() == 2 {
            format!(
                "{:.1}x{} {} {:.1}x{}",
                self.coefficients[0],
                series[0].title(),
                if self.coefficients[1] >= 0.0 { '+' } else { '-' },
                self.coefficients[1].abs(),
                series[1].title(),
            )
        } else {
            "Linear Comb.".to_owned()
        }
    }
}

impl Connectable for LinearCombination {
    fn num_inputs(&self) -> usize {
        self.coefficients.len()
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn input_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_input(socket, self.num_inputs())?;
        Ok(format!("Time Series #{}", socket + 1))
    }

    fn output_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_output(socket, 1)?;
        Ok("Time Series".into())
    }

    fn allowed_input_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_input(socket, self.num_inputs())?;
        Ok(kinds(&[ValueKind::Series]))
    }

    fn output_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_output(socket, 1)?;
        Ok(kinds(&[ValueKind::Series]))
    }

    fn set_input(
        &mut self,
        socket: usize,
        value: Option<Value>,
        _origin: Option<&str>,
    ) -> Result<(), InvalidSocket> {
        check_input(socket, self.num_inputs())?;
        self.inputs.store(socket, value);
        self.recompute();
        Ok(())
    }

    fn output(&self, socket: usize) -> Result<Option<Value>, InvalidSocket> {
        check_output(socket, 1)?;
        if !self.valid {
            return Ok(None);
        }
        Ok(self.combination.clone().map(Value::Series))
    }

    fn recompute(&mut self) {
        self.valid = false;
        self.combination = None;

        let Some(series) = self.inputs.all_series() else {
            return;
        };
        if series.is_empty() {
            return;
        }
        if series.len() != self.coefficients.len() {
            debug!(
                inputs = series.len(),
                coefficients = self.coefficients.len(),
                "combination arity mismatch, staying invalid"
            );
            return;
        }

        let combination = if self.use_times_from_first {
            self.combine_on_first_timestamps(&series)
        } else {
            self.combine_by_merge(&series)
        };

        if combination.is_empty() {
            return;
        }
        self.combination = Some(combination);
        self.valid = true;
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn label(&self) -> &str {
        "aX+bY"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(n * 86_400, 0).unwrap()
    }

    fn daily(values: &[f64]) -> TimeSeries {
        TimeSeries::from_values(day(0), Duration::days(1), values.iter().copied())
    }

    fn feed(node: &mut LinearCombination, socket: usize, ts: TimeSeries) {
        node.set_input(socket, Some(Value::Series(ts)), None).unwrap();
    }

    fn result(node: &LinearCombination) -> TimeSeries {
        node.output(0)
            .unwrap()
            .and_then(|v| v.as_series().cloned())
            .unwrap()
    }

    #[test]
    fn default_combination_is_a_difference() {
        let mut node = LinearCombination::new();
        feed(&mut node, 0, daily(&[5.0, 7.0]));
        feed(&mut node, 1, daily(&[1.0, 4.0]));

        let out = result(&node);
        assert_eq!(out.values(), &[4.0, 3.0]);
    }

    #[test]
    fn exact_match_skips_unshared_timestamps() {
        let mut node = LinearCombination::with_coefficients(vec![1.0, 1.0]);
        // First input observes on days 0,1,2; second only on day 1.
        feed(&mut node, 0, daily(&[10.0, 20.0, 30.0]));
        let mut sparse = TimeSeries::new();
        sparse.push(day(1), 5.0);
        feed(&mut node, 1, sparse);

        let out = result(&node);
        assert_eq!(out.len(), 1);
        assert_eq!(out.timestamp(0), Some(day(1)));
        assert_eq!(out.value(0), Some(25.0));
    }

    #[test]
    fn step_union_carries_earlier_values() {
        let mut node = LinearCombination::with_coefficients(vec![1.0, 1.0]);
        node.set_requires_exact_time_match(false);

        feed(&mut node, 0, daily(&[10.0, 20.0]));
        let mut sparse = TimeSeries::new();
        sparse.push(day(0), 1.0);
        feed(&mut node, 1, sparse);

        let out = result(&node);
        // Day 0: both fresh. Day 1: second input carries its day-0 value.
        assert_eq!(out.values(), &[11.0, 21.0]);
    }

    #[test]
    fn step_union_drops_points_before_an_input_starts() {
        let mut node = LinearCombination::with_coefficients(vec![1.0, 1.0]);
        node.set_requires_exact_time_match(false);

        // Second input starts a day late: day 0 has no defined combination.
        feed(&mut node, 0, daily(&[10.0, 20.0]));
        let mut late = TimeSeries::new();
        late.push(day(1), 5.0);
        feed(&mut node, 1, late);

        let out = result(&node);
        assert_eq!(out.len(), 1);
        assert_eq!(out.timestamp(0), Some(day(1)));
        assert_eq!(out.value(0), Some(25.0));
    }

    #[test]
    fn first_timestamps_mode_reads_others_as_steps() {
        let mut node = LinearCombination::with_coefficients(vec![2.0, 3.0]);
        node.set_use_times_from_first(true);

        feed(&mut node, 0, daily(&[1.0, 2.0, 3.0]));
        let steps = TimeSeries::from_values(day(0), Duration::days(2), [10.0, 40.0]);
        feed(&mut node, 1, steps);

        let out = result(&node);
        // Day 0: 2*1 + 3*10. Day 1: 2*2 + 3*10. Day 2: 2*3 + 3*40.
        assert_eq!(out.values(), &[32.0, 34.0, 126.0]);
    }

    #[test]
    fn missing_input_leaves_node_invalid() {
        let mut node = LinearCombination::new();
        feed(&mut node, 0, daily(&[1.0]));

        assert!(!node.is_valid());
        assert_eq!(node.output(0).unwrap(), None);
    }

    #[test]
    fn disjoint_exact_match_produces_no_output() {
        let mut node = LinearCombination::new();
        feed(&mut node, 0, daily(&[1.0]));
        let mut other = TimeSeries::new();
        other.push(day(7), 2.0);
        feed(&mut node, 1, other);

        assert!(!node.is_valid());
    }

    #[test]
    fn coefficient_count_drives_socket_count() {
        let mut node = LinearCombination::with_coefficients(vec![1.0, 1.0, 1.0]);
        assert_eq!(node.num_inputs(), 3);
        assert!(node.input_name(2).is_ok());
        assert!(node.input_name(3).is_err());

        node.set_coefficients(vec![1.0]);
        assert_eq!(node.num_inputs(), 1);
        assert!(node.set_input(1, None, None).is_err());
    }

    #[test]
    fn three_way_combination_sums_all_inputs() {
        let mut node = LinearCombination::with_coefficients(vec![1.0, 2.0, 3.0]);
        feed(&mut node, 0, daily(&[1.0, 1.0]));
        feed(&mut node, 1, daily(&[1.0, 2.0]));
        feed(&mut node, 2, daily(&[1.0, 3.0]));

        let out = result(&node);
        assert_abs_diff_eq!(out.value(0).unwrap(), 6.0);
        assert_abs_diff_eq!(out.value(1).unwrap(), 14.0);
    }

    #[test]
    fn two_input_title_names_both_series() {
        let mut node = LinearCombination::new();
        feed(&mut node, 0, {
            let mut ts = daily(&[1.0]);
            ts.set_title("spot");
            ts
        });
        feed(&mut node, 1, {
            let mut ts = daily(&[2.0]);
            ts.set_title("future");
            ts
        });

        assert_eq!(result(&node).title(), "1.0xspot - 1.0xfuture");
    }
}
