//! Series operators.
//!
//! This module provides the identity of every operator:
//! - `Op`: operator identity + parameters (carried by every output series)
//! - `CmpOp`, `ArithOp`, `LogicOp`: elementwise operator kinds
//!
//! The algorithms live in the submodules, one per operator family.

pub mod cross;
pub mod event;
pub mod extrema;
pub mod limit_price;
pub mod moving_average;
pub mod pivot;
pub mod recurrence;
pub mod select;
pub mod session;
pub mod streak;
pub mod transform;

use crate::domain::field::Field;
use crate::domain::operator::pivot::PivotKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Raw,
    Field(Field),
    CrossOver,
    CrossUnder,
    Min,
    Max,
    Hhv(usize),
    Llv(usize),
    Count(usize),
    Every(usize),
    Sma(usize),
    Rma(usize),
    BarsLast,
    ValueWhen { occurrence: usize },
    Pivot {
        kind: PivotKind,
        left: usize,
        right: usize,
    },
    Iif,
    Ref(usize),
    Change(usize),
    Ma(usize),
    Ema(usize),
    Wma(usize),
    Std(usize),
    Sum(usize),
    Abs,
    Mod,
    Arith(ArithOp),
    Compare(CmpOp),
    Logic(LogicOp),
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl CmpOp {
    /// Exact IEEE comparison; any comparison involving NaN is false except `Ne`.
    pub fn test(self, a: f64, b: f64) -> bool {
        match self {
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

impl ArithOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

impl LogicOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Raw => write!(f, "RAW"),
            Op::Field(field) => write!(f, "{}", field),
            Op::CrossOver => write!(f, "CROSS"),
            Op::CrossUnder => write!(f, "CROSSUNDER"),
            Op::Min => write!(f, "MIN"),
            Op::Max => write!(f, "MAX"),
            Op::Hhv(n) => write!(f, "HHV({})", n),
            Op::Llv(n) => write!(f, "LLV({})", n),
            Op::Count(n) => write!(f, "COUNT({})", n),
            Op::Every(n) => write!(f, "EVERY({})", n),
            Op::Sma(n) => write!(f, "SMA({})", n),
            Op::Rma(n) => write!(f, "RMA({})", n),
            Op::BarsLast => write!(f, "BARSLAST"),
            Op::ValueWhen { occurrence } => write!(f, "VALUEWHEN({})", occurrence),
            Op::Pivot { kind, left, right } => match kind {
                PivotKind::High => write!(f, "PIVOTHIGH({},{})", left, right),
                PivotKind::Low => write!(f, "PIVOTLOW({},{})", left, right),
            },
            Op::Iif => write!(f, "IF"),
            Op::Ref(n) => write!(f, "REF({})", n),
            Op::Change(n) => write!(f, "CHANGE({})", n),
            Op::Ma(n) => write!(f, "MA({})", n),
            Op::Ema(n) => write!(f, "EMA({})", n),
            Op::Wma(n) => write!(f, "WMA({})", n),
            Op::Std(n) => write!(f, "STD({})", n),
            Op::Sum(n) => write!(f, "SUM({})", n),
            Op::Abs => write!(f, "ABS"),
            Op::Mod => write!(f, "MOD"),
            Op::Arith(arith) => write!(f, "{}", arith.symbol()),
            Op::Compare(cmp) => write!(f, "{}", cmp.symbol()),
            Op::Logic(LogicOp::And) => write!(f, "AND"),
            Op::Logic(LogicOp::Or) => write!(f, "OR"),
            Op::Not => write!(f, "NOT"),
        }
    }
}
