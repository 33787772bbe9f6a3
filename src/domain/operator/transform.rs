//! Elementwise transforms: ABS, REF, CHANGE, MOD.

use crate::domain::error::FormulaError;
use crate::domain::operator::{ArithOp, Op};
use crate::domain::sanitize;
use crate::domain::series::{align, arithmetic, NumericSeries, Operand};

/// Absolute value; infinities count as 0.
pub fn abs(series: &NumericSeries) -> NumericSeries {
    NumericSeries::new(
        Op::Abs,
        sanitize::infinite_to_zero(&series.values)
            .into_iter()
            .map(f64::abs)
            .collect(),
    )
}

/// The series `n` bars back.
pub fn reference(series: &NumericSeries, n: usize) -> NumericSeries {
    series.shift(n)
}

/// `series - REF(series, n)`.
pub fn change(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    let previous = series.shift(n);
    let diff = arithmetic(series, &previous, ArithOp::Sub).map_err(|err| match err {
        FormulaError::EmptyInput { .. } => FormulaError::EmptyInput { op: Op::Change(n) },
        other => other,
    })?;
    Ok(NumericSeries::new(Op::Change(n), diff.values))
}

/// Remainder taking the sign of the divisor: `a - b * floor(a / b)`.
pub fn modulo<'a>(
    a: impl Into<Operand<'a>>,
    b: impl Into<Operand<'a>>,
) -> Result<NumericSeries, FormulaError> {
    let op = Op::Mod;
    let [x, y] = align(op, [a.into(), b.into()])?;
    let values = x
        .iter()
        .zip(y.iter())
        .map(|(&a, &b)| a - b * (a / b).floor())
        .collect();
    Ok(NumericSeries::new(op, values))
}
