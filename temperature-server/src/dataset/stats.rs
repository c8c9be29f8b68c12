//! Aggregation over present readings.
//!
//! Every function here skips absent and non-finite inputs before
//! aggregating, so callers never rely on NaN propagation.

use serde::Serialize;

/// Summary statistics over a set of readings.
///
/// All fields except `count` are `None` when no readings remain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    /// The summary of no readings.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: None,
            std: None,
            min: None,
            max: None,
        }
    }
}

/// Running totals for a single pass over the readings.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }
}

fn finite(values: impl IntoIterator<Item = Option<f64>>) -> impl Iterator<Item = f64> {
    values.into_iter().flatten().filter(|v| v.is_finite())
}

/// Arithmetic mean of the finite values, `None` if there are none.
pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut acc = Accumulator::default();
    finite(values).for_each(|v| acc.push(v));
    (acc.count > 0).then(|| acc.sum / acc.count as f64)
}

/// Population standard deviation (divisor = count) of the finite values.
pub fn population_std(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let values: Vec<f64> = finite(values).collect();
    let mean = mean(values.iter().copied().map(Some))?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Count, mean, population standard deviation, min and max of the finite values.
pub fn summarize(values: impl IntoIterator<Item = Option<f64>>) -> Summary {
    let values: Vec<f64> = finite(values).collect();

    let mut acc = Accumulator::default();
    values.iter().for_each(|&v| acc.push(v));
    if acc.count == 0 {
        return Summary::empty();
    }

    Summary {
        count: acc.count,
        mean: mean(values.iter().copied().map(Some)),
        std: population_std(values.iter().copied().map(Some)),
        min: Some(acc.min),
        max: Some(acc.max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn summarize_basic() {
        let s = summarize(some(&[1.0, 3.0, 5.0, 7.0]));
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(4.0));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(7.0));
        // Population variance: (9 + 1 + 1 + 9) / 4 = 5
        assert!((s.std.unwrap() - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summarize_empty() {
        assert_eq!(summarize(Vec::new()), Summary::empty());
        assert_eq!(summarize(vec![None, None]), Summary::empty());
    }

    #[test]
    fn summarize_skips_missing_and_non_finite() {
        let s = summarize(vec![
            Some(2.0),
            None,
            Some(f64::NAN),
            Some(f64::INFINITY),
            Some(4.0),
        ]);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, Some(3.0));
        assert_eq!(s.std, Some(1.0));
    }

    #[test]
    fn single_value_has_zero_std() {
        let s = summarize(some(&[-2.5]));
        assert_eq!(s.count, 1);
        assert_eq!(s.std, Some(0.0));
        assert_eq!(s.min, Some(-2.5));
        assert_eq!(s.max, Some(-2.5));
    }

    #[test]
    fn population_not_sample_std() {
        // Sample std of [1, 3] would be sqrt(2)
        assert_eq!(population_std(some(&[1.0, 3.0])), Some(1.0));
    }

    #[test]
    fn mean_and_std_of_nothing() {
        assert_eq!(mean(vec![None]), None);
        assert_eq!(population_std(Vec::new()), None);
    }

    #[test]
    fn empty_summary_serializes_nulls() {
        let json = serde_json::to_value(Summary::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"count": 0, "mean": null, "std": null, "min": null, "max": null})
        );
    }
}
