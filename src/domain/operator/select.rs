//! IF(cond, a, b): elementwise select.

use crate::domain::error::FormulaError;
use crate::domain::operator::Op;
use crate::domain::series::{common_len, tail, BoolSeries, NumericSeries, Operand};

pub fn iif<'a>(
    cond: &BoolSeries,
    when_true: impl Into<Operand<'a>>,
    when_false: impl Into<Operand<'a>>,
) -> Result<NumericSeries, FormulaError> {
    let op = Op::Iif;
    let (when_true, when_false) = (when_true.into(), when_false.into());
    let len = common_len(op, &[Some(cond.len()), when_true.len(), when_false.len()])?;

    let picks = tail(&cond.values, len);
    let yes = when_true.trailing(len);
    let no = when_false.trailing(len);

    let values = picks
        .iter()
        .zip(yes.iter().zip(no.iter()))
        .map(|(&pick, (&y, &n))| if pick { y } else { n })
        .collect();
    Ok(NumericSeries::new(op, values))
}
