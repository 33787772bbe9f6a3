//! Pairwise and sliding-window extrema (MIN, MAX, HHV, LLV).
//!
//! HHV(n)/LLV(n) emit one value per full window of `n` bars, so the output
//! has `len - n + 1` values and carries no padding for the leading bars.
//! The sliding pass keeps a monotonic deque of candidate indices, O(len).

use crate::domain::error::FormulaError;
use crate::domain::operator::Op;
use crate::domain::series::{align, NumericSeries, Operand};
use std::collections::VecDeque;

pub fn minimum<'a>(
    s1: impl Into<Operand<'a>>,
    s2: impl Into<Operand<'a>>,
) -> Result<NumericSeries, FormulaError> {
    pairwise(Op::Min, s1.into(), s2.into(), f64::min)
}

pub fn maximum<'a>(
    s1: impl Into<Operand<'a>>,
    s2: impl Into<Operand<'a>>,
) -> Result<NumericSeries, FormulaError> {
    pairwise(Op::Max, s1.into(), s2.into(), f64::max)
}

fn pairwise(
    op: Op,
    s1: Operand<'_>,
    s2: Operand<'_>,
    pick: fn(f64, f64) -> f64,
) -> Result<NumericSeries, FormulaError> {
    if s1.len() == Some(0) || s2.len() == Some(0) {
        return Err(FormulaError::EmptyInput { op });
    }
    let [a, b] = align(op, [s1, s2])?;
    let values = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| if x.is_nan() || y.is_nan() { f64::NAN } else { pick(x, y) })
        .collect();
    Ok(NumericSeries::new(op, values))
}

/// Highest value over each window of `n` bars.
pub fn hhv(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    sliding(Op::Hhv(n), &series.values, n, |incoming, held| incoming >= held)
}

/// Lowest value over each window of `n` bars.
pub fn llv(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    sliding(Op::Llv(n), &series.values, n, |incoming, held| incoming <= held)
}

/// `evicts(incoming, held)` is true when `incoming` makes `held` useless as a
/// future window extremum.
fn sliding(
    op: Op,
    values: &[f64],
    n: usize,
    evicts: fn(f64, f64) -> bool,
) -> Result<NumericSeries, FormulaError> {
    if n == 0 || n > values.len() {
        return Err(FormulaError::InvalidWindow {
            op,
            window: n,
            len: values.len(),
        });
    }

    let mut out = Vec::with_capacity(values.len() - n + 1);
    let mut candidates: VecDeque<usize> = VecDeque::with_capacity(n);
    let mut last_nan: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            last_nan = Some(i);
        } else {
            while candidates.back().is_some_and(|&j| evicts(v, values[j])) {
                candidates.pop_back();
            }
            candidates.push_back(i);
        }

        if i + 1 < n {
            continue;
        }
        let start = i + 1 - n;
        while candidates.front().is_some_and(|&j| j < start) {
            candidates.pop_front();
        }

        // NaN anywhere in the window poisons it.
        let extremum = if last_nan.is_some_and(|j| j >= start) {
            f64::NAN
        } else {
            candidates.front().map_or(f64::NAN, |&j| values[j])
        };
        out.push(extremum);
    }

    Ok(NumericSeries::new(op, out))
}
