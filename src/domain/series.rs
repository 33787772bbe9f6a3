//! Numeric and boolean series with trailing alignment.
//!
//! Index 0 is the oldest bar. Operators never mutate their inputs: every
//! call allocates a new series tagged with the [`Op`] that produced it.
//!
//! Operands of different lengths are aligned on their most recent bars:
//! `align` keeps the common trailing window so that index `i` in every
//! aligned operand refers to the same bar. Scalars broadcast to that window.

use crate::domain::error::FormulaError;
use crate::domain::operator::{ArithOp, CmpOp, LogicOp, Op};
use std::borrow::Cow;

/// Distance value meaning "no qualifying event yet". Exactly representable in f64.
pub const NO_EVENT: f64 = 1e16;

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries {
    pub op: Op,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolSeries {
    pub op: Op,
    pub values: Vec<bool>,
}

impl NumericSeries {
    pub fn new(op: Op, values: Vec<f64>) -> Self {
        Self { op, values }
    }

    pub fn raw(values: Vec<f64>) -> Self {
        Self::new(Op::Raw, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent value.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// The series as seen `n` bars earlier: the last `n` bars are dropped.
    pub fn shift(&self, n: usize) -> NumericSeries {
        let keep = self.values.len().saturating_sub(n);
        NumericSeries::new(Op::Ref(n), self.values[..keep].to_vec())
    }
}

impl BoolSeries {
    pub fn new(op: Op, values: Vec<bool>) -> Self {
        Self { op, values }
    }

    pub fn raw(values: Vec<bool>) -> Self {
        Self::new(Op::Raw, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<bool> {
        self.values.last().copied()
    }

    /// 1.0 where true, 0.0 where false.
    pub fn to_numeric(&self) -> NumericSeries {
        NumericSeries::new(
            self.op,
            self.values
                .iter()
                .map(|&b| if b { 1.0 } else { 0.0 })
                .collect(),
        )
    }

    pub fn negate(&self) -> BoolSeries {
        BoolSeries::new(Op::Not, self.values.iter().map(|b| !b).collect())
    }
}

/// A series-or-scalar argument to an n-ary operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a> {
    Series(&'a [f64]),
    Scalar(f64),
}

impl<'a> Operand<'a> {
    /// `None` for scalars, which take whatever length the series operands agree on.
    pub fn len(&self) -> Option<usize> {
        match self {
            Operand::Series(values) => Some(values.len()),
            Operand::Scalar(_) => None,
        }
    }

    pub fn shift(self, n: usize) -> Operand<'a> {
        match self {
            Operand::Series(values) => {
                Operand::Series(&values[..values.len().saturating_sub(n)])
            }
            scalar => scalar,
        }
    }

    /// The last `len` values; scalars are materialised to `len` copies.
    pub fn trailing(self, len: usize) -> Cow<'a, [f64]> {
        match self {
            Operand::Series(values) => Cow::Borrowed(tail(values, len)),
            Operand::Scalar(v) => Cow::Owned(vec![v; len]),
        }
    }
}

impl<'a> From<&'a NumericSeries> for Operand<'a> {
    fn from(series: &'a NumericSeries) -> Self {
        Operand::Series(&series.values)
    }
}

impl<'a> From<&'a [f64]> for Operand<'a> {
    fn from(values: &'a [f64]) -> Self {
        Operand::Series(values)
    }
}

impl<'a> From<&'a Vec<f64>> for Operand<'a> {
    fn from(values: &'a Vec<f64>) -> Self {
        Operand::Series(values)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

/// The last `len` elements of `values` (all of them when shorter).
pub fn tail<T>(values: &[T], len: usize) -> &[T] {
    &values[values.len().saturating_sub(len)..]
}

/// Shortest length among the series operands; scalars are ignored and an
/// all-scalar list aligns to a single bar.
pub fn common_len(op: Op, lens: &[Option<usize>]) -> Result<usize, FormulaError> {
    let len = lens.iter().flatten().copied().min().unwrap_or(1);
    if len == 0 {
        return Err(FormulaError::EmptyInput { op });
    }
    Ok(len)
}

/// Trim every operand to the common trailing window.
pub fn align<'a, const N: usize>(
    op: Op,
    operands: [Operand<'a>; N],
) -> Result<[Cow<'a, [f64]>; N], FormulaError> {
    let len = common_len(op, &operands.map(|o| o.len()))?;
    Ok(operands.map(|o| o.trailing(len)))
}

pub fn compare<'a>(
    lhs: impl Into<Operand<'a>>,
    rhs: impl Into<Operand<'a>>,
    cmp: CmpOp,
) -> Result<BoolSeries, FormulaError> {
    let op = Op::Compare(cmp);
    let [a, b] = align(op, [lhs.into(), rhs.into()])?;
    let values = a.iter().zip(b.iter()).map(|(&x, &y)| cmp.test(x, y)).collect();
    Ok(BoolSeries::new(op, values))
}

pub fn arithmetic<'a>(
    lhs: impl Into<Operand<'a>>,
    rhs: impl Into<Operand<'a>>,
    arith: ArithOp,
) -> Result<NumericSeries, FormulaError> {
    let op = Op::Arith(arith);
    let [a, b] = align(op, [lhs.into(), rhs.into()])?;
    let values = a.iter().zip(b.iter()).map(|(&x, &y)| arith.apply(x, y)).collect();
    Ok(NumericSeries::new(op, values))
}

pub fn logical(
    lhs: &BoolSeries,
    rhs: &BoolSeries,
    logic: LogicOp,
) -> Result<BoolSeries, FormulaError> {
    let op = Op::Logic(logic);
    let len = common_len(op, &[Some(lhs.len()), Some(rhs.len())])?;
    let values = tail(&lhs.values, len)
        .iter()
        .zip(tail(&rhs.values, len))
        .map(|(&a, &b)| logic.apply(a, b))
        .collect();
    Ok(BoolSeries::new(op, values))
}
