//! Crossover / crossunder detection.
//!
//! CROSS(a, b) fires on the bar where `a > b` and on the previous bar `a <= b`.
//! CROSSUNDER mirrors it with `a < b` now and `a >= b` before.
//! The output is one bar shorter than the aligned inputs: the oldest aligned
//! bar has no predecessor to compare against.

use crate::domain::error::FormulaError;
use crate::domain::operator::{CmpOp, Op};
use crate::domain::series::{align, tail, BoolSeries, Operand};

pub fn cross_over<'a>(
    s1: impl Into<Operand<'a>>,
    s2: impl Into<Operand<'a>>,
) -> Result<BoolSeries, FormulaError> {
    crossing(Op::CrossOver, s1.into(), s2.into(), CmpOp::Gt, CmpOp::Le)
}

pub fn cross_under<'a>(
    s1: impl Into<Operand<'a>>,
    s2: impl Into<Operand<'a>>,
) -> Result<BoolSeries, FormulaError> {
    crossing(Op::CrossUnder, s1.into(), s2.into(), CmpOp::Lt, CmpOp::Ge)
}

fn crossing(
    op: Op,
    s1: Operand<'_>,
    s2: Operand<'_>,
    now: CmpOp,
    before: CmpOp,
) -> Result<BoolSeries, FormulaError> {
    let [a, b] = align(op, [s1, s2])?;
    let current: Vec<bool> = a.iter().zip(b.iter()).map(|(&x, &y)| now.test(x, y)).collect();

    let [pa, pb] = align(op, [s1.shift(1), s2.shift(1)])?;
    let prior: Vec<bool> = pa
        .iter()
        .zip(pb.iter())
        .map(|(&x, &y)| before.test(x, y))
        .collect();

    // Shifting shortened the prior condition; realign before combining.
    let len = current.len().min(prior.len());
    let values = tail(&current, len)
        .iter()
        .zip(tail(&prior, len))
        .map(|(&c, &p)| c && p)
        .collect();

    Ok(BoolSeries::new(op, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::NumericSeries;

    fn s1() -> NumericSeries {
        NumericSeries::raw(vec![1.0, 2.0, 3.0, 0.0, 5.0])
    }

    fn s2() -> NumericSeries {
        NumericSeries::raw(vec![2.0; 5])
    }

    #[test]
    fn crossover_fires_when_relation_flips_up() {
        let out = cross_over(&s1(), &s2()).unwrap();
        // aligned bars 1..=4
        assert_eq!(out.values, vec![false, true, false, true]);
        assert_eq!(out.op, Op::CrossOver);
    }

    #[test]
    fn crossunder_fires_when_relation_flips_down() {
        let out = cross_under(&s1(), &s2()).unwrap();
        assert_eq!(out.values, vec![false, false, true, false]);
        assert_eq!(out.op, Op::CrossUnder);
    }

    #[test]
    fn touching_then_rising_counts_as_cross() {
        let a = NumericSeries::raw(vec![2.0, 3.0]);
        let out = cross_over(&a, 2.0).unwrap();
        assert_eq!(out.values, vec![true]);
    }

    #[test]
    fn staying_above_is_not_a_cross() {
        let a = NumericSeries::raw(vec![3.0, 4.0, 5.0]);
        let out = cross_over(&a, 2.0).unwrap();
        assert_eq!(out.values, vec![false, false]);
    }

    #[test]
    fn unequal_lengths_align_on_recent_bars() {
        let long = NumericSeries::raw(vec![9.0, 9.0, 1.0, 3.0]);
        let short = NumericSeries::raw(vec![2.0, 2.0]);
        let out = cross_over(&long, &short).unwrap();
        assert_eq!(out.values, vec![true]);
    }

    #[test]
    fn single_bar_is_empty_input() {
        let a = NumericSeries::raw(vec![1.0]);
        let err = cross_over(&a, 0.0).unwrap_err();
        assert!(matches!(err, FormulaError::EmptyInput { op: Op::CrossOver }));
    }

    #[test]
    fn nan_never_crosses() {
        let a = NumericSeries::raw(vec![f64::NAN, 5.0, f64::NAN]);
        let out = cross_over(&a, 2.0).unwrap();
        assert_eq!(out.values, vec![false, false]);
    }
}
