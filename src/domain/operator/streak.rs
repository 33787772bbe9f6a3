//! COUNT and EVERY over trailing windows of a condition.

use crate::domain::error::FormulaError;
use crate::domain::operator::Op;
use crate::domain::series::{BoolSeries, NumericSeries};

/// Number of true bars in each trailing window of `n`.
///
/// The output has `len - n` values; `out[i]` covers `cond[i+1 ..= i+n]`,
/// i.e. the window ending at bar `i + n`.
pub fn count(cond: &BoolSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    let op = Op::Count(n);
    let values = &cond.values;
    let len = values.len();
    if n == 0 || n >= len {
        return Err(FormulaError::InvalidWindow { op, window: n, len });
    }

    let mut running = values[1..=n].iter().filter(|&&b| b).count();
    let mut out = Vec::with_capacity(len - n);
    out.push(running as f64);

    for i in 1..len - n {
        if values[i + n] {
            running += 1;
        }
        if values[i] {
            running -= 1;
        }
        out.push(running as f64);
    }

    Ok(NumericSeries::new(op, out))
}

/// True where all of the last `n` bars satisfied the condition.
pub fn every(cond: &BoolSeries, n: usize) -> Result<BoolSeries, FormulaError> {
    let counts = count(cond, n)?;
    let full = n as f64;
    Ok(BoolSeries::new(
        Op::Every(n),
        counts.values.iter().map(|&c| c == full).collect(),
    ))
}
