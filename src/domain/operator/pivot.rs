//! Pivot high / pivot low detection.
//!
//! A pivot is confirmed at bar `i` when the bar `right` positions back is the
//! extremum of the window `[i - right - left, i]`. The result is recorded at
//! the confirming bar `i`, not at the pivot bar itself.

use crate::domain::operator::Op;
use crate::domain::series::NumericSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PivotKind {
    High,
    Low,
}

/// Pivot values by confirming bar; `None` where no pivot is confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotSeries {
    pub op: Op,
    pub values: Vec<Option<f64>>,
}

impl PivotSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(confirming bar, pivot value)` pairs.
    pub fn pivots(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|value| (i, value)))
    }

    /// Numeric view with `fill` wherever there is no pivot.
    pub fn filled(&self, fill: f64) -> NumericSeries {
        NumericSeries::new(
            self.op,
            self.values.iter().map(|v| v.unwrap_or(fill)).collect(),
        )
    }
}

/// `right` defaults to `left` when `None` or zero.
pub fn pivot_high(source: &NumericSeries, left: usize, right: Option<usize>) -> PivotSeries {
    detect(PivotKind::High, &source.values, left, right)
}

/// `right` defaults to `left` when `None` or zero.
pub fn pivot_low(source: &NumericSeries, left: usize, right: Option<usize>) -> PivotSeries {
    detect(PivotKind::Low, &source.values, left, right)
}

fn detect(kind: PivotKind, values: &[f64], left: usize, right: Option<usize>) -> PivotSeries {
    let right = match right {
        Some(r) if r > 0 => r,
        _ => left,
    };
    // A span that does not fit in usize is longer than any input.
    let span = left.saturating_add(right);
    let mut out = vec![None; values.len()];

    for i in span..values.len() {
        let window = &values[i - span..=i];
        let extremum = match kind {
            PivotKind::High => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            PivotKind::Low => window.iter().copied().fold(f64::INFINITY, f64::min),
        };
        if values[i - right] == extremum {
            out[i] = Some(extremum);
        }
    }

    PivotSeries {
        op: Op::Pivot { kind, left, right },
        values: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highs() -> NumericSeries {
        NumericSeries::raw(vec![1.0, 3.0, 5.0, 4.0, 2.0, 6.0, 1.0])
    }

    #[test]
    fn pivot_high_confirms_after_right_bars() {
        let out = pivot_high(&highs(), 2, None);
        // bar 2 (value 5) is the max of bars 0..=4, confirmed at bar 4
        assert_eq!(out.pivots().collect::<Vec<_>>(), vec![(4, 5.0)]);
        assert_eq!(
            out.op,
            Op::Pivot {
                kind: PivotKind::High,
                left: 2,
                right: 2
            }
        );
    }

    #[test]
    fn pivot_low_asymmetric() {
        let lows = NumericSeries::raw(vec![5.0, 4.0, 2.0, 3.0, 6.0, 1.0]);
        let out = pivot_low(&lows, 2, Some(1));
        assert_eq!(out.pivots().collect::<Vec<_>>(), vec![(3, 2.0)]);
    }

    #[test]
    fn oversized_window_confirms_nothing() {
        let left = usize::MAX / 2 + 1;
        let out = pivot_high(&highs(), left, None);
        assert_eq!(out.len(), 7);
        assert!(out.values.iter().all(Option::is_none));
        assert!(pivot_low(&highs(), usize::MAX, Some(usize::MAX)).pivots().next().is_none());
    }

    #[test]
    fn leading_bars_have_no_pivot() {
        let out = pivot_high(&highs(), 2, Some(2));
        assert!(out.values[..4].iter().all(Option::is_none));
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn zero_right_defaults_to_left() {
        assert_eq!(
            pivot_high(&highs(), 2, Some(0)),
            pivot_high(&highs(), 2, None)
        );
    }

    #[test]
    fn zero_valued_pivot_is_distinguishable() {
        let s = NumericSeries::raw(vec![1.0, 0.0, 1.0]);
        let out = pivot_low(&s, 1, None);
        assert_eq!(out.values, vec![None, None, Some(0.0)]);
    }

    #[test]
    fn filled_uses_fill_value() {
        let out = pivot_high(&highs(), 2, None).filled(0.0);
        assert_eq!(out.values, vec![0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn detection_is_repeatable() {
        let first = pivot_low(&highs(), 1, None);
        let second = pivot_low(&highs(), 1, None);
        assert_eq!(first, second);
    }

    #[test]
    fn shorter_than_window_has_no_pivots() {
        let s = NumericSeries::raw(vec![1.0, 2.0]);
        assert_eq!(pivot_high(&s, 2, None).pivots().count(), 0);
    }
}
