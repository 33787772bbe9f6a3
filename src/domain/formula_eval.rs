//! Formula evaluation.
//!
//! Walks an [`Expr`] over a bar slice and produces a [`Value`].
//!
//! # Evaluation Semantics
//!
//! - Number literals stay scalars; arithmetic on two scalars folds to a scalar
//! - Fields select a series over every bar in the context
//! - Series results are trailing-aligned: the last value belongs to the last bar
//! - Booleans in numeric positions read as 1/0
//! - Numbers used as conditions are true when non-zero and not NaN
//! - Scalars in series positions broadcast to the bar count
//! - Window and count arguments must be non-negative whole-number scalars

use crate::domain::error::FormulaError;
use crate::domain::field::Field;
use crate::domain::formula::{Expr, Function};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::operator::{
    cross, event, extrema, limit_price, moving_average, pivot, recurrence, select, session,
    streak, transform, ArithOp, CmpOp, Op,
};
use crate::domain::series::{arithmetic, compare, logical, BoolSeries, NumericSeries, Operand};
use chrono::NaiveTime;
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Numeric(NumericSeries),
    Bool(BoolSeries),
}

impl Value {
    /// `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::Numeric(s) => Some(s.len()),
            Value::Bool(b) => Some(b.len()),
        }
    }

    /// Every value as a number, oldest first; booleans read as 1/0.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            Value::Scalar(v) => vec![*v],
            Value::Numeric(s) => s.values.clone(),
            Value::Bool(b) => b.to_numeric().values,
        }
    }

    pub fn last(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Numeric(s) => s.last(),
            Value::Bool(b) => b.last().map(|v| if v { 1.0 } else { 0.0 }),
        }
    }
}

/// Bars to evaluate over, plus the wall-clock time FROMOPEN reads.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    bars: &'a [OhlcvBar],
    session_time: Option<NaiveTime>,
}

impl<'a> EvalContext<'a> {
    pub fn new(bars: &'a [OhlcvBar]) -> Self {
        Self {
            bars,
            session_time: None,
        }
    }

    pub fn with_session_time(mut self, time: NaiveTime) -> Self {
        self.session_time = Some(time);
        self
    }

    pub fn bars(&self) -> &'a [OhlcvBar] {
        self.bars
    }
}

pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, FormulaError> {
    debug!(formula = %expr, bars = ctx.bars.len(), "evaluating formula");
    let mut evaluator = Evaluator {
        ctx,
        fields: HashMap::new(),
    };
    let value = evaluator.eval(expr)?;
    debug!(len = ?value.len(), "formula evaluated");
    Ok(value)
}

/// A value in a numeric position.
enum Num {
    Scalar(f64),
    Series(NumericSeries),
}

impl Num {
    fn from_value(value: Value) -> Num {
        match value {
            Value::Scalar(v) => Num::Scalar(v),
            Value::Numeric(s) => Num::Series(s),
            Value::Bool(b) => Num::Series(b.to_numeric()),
        }
    }

    fn operand(&self) -> Operand<'_> {
        match self {
            Num::Scalar(v) => Operand::Scalar(*v),
            Num::Series(s) => Operand::from(s),
        }
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Num::Scalar(_))
    }

    fn into_series(self, len: usize) -> NumericSeries {
        match self {
            Num::Scalar(v) => NumericSeries::raw(vec![v; len]),
            Num::Series(s) => s,
        }
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

/// Collapse a one-bar result back to a scalar when every input was scalar.
fn fold(series: NumericSeries, scalar: bool) -> Value {
    match (scalar, series.last()) {
        (true, Some(v)) => Value::Scalar(v),
        _ => Value::Numeric(series),
    }
}

struct Evaluator<'c, 'a> {
    ctx: &'c EvalContext<'a>,
    fields: HashMap<Field, NumericSeries>,
}

impl Evaluator<'_, '_> {
    fn bar_count(&self) -> usize {
        self.ctx.bars.len()
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, FormulaError> {
        match expr {
            Expr::Number(n) => Ok(Value::Scalar(*n)),
            Expr::Field(field) => Ok(Value::Numeric(self.field(*field))),
            Expr::Call { func, args } => self.call(*func, args),
            Expr::Binary { op, left, right } => {
                let (a, b) = (self.num(left)?, self.num(right)?);
                let out = arithmetic(a.operand(), b.operand(), *op)?;
                Ok(fold(out, a.is_scalar() && b.is_scalar()))
            }
            Expr::Compare { op, left, right } => {
                let (a, b) = (self.num(left)?, self.num(right)?);
                self.compare(a, b, *op).map(Value::Bool)
            }
            Expr::Logic { op, left, right } => {
                let (a, b) = (self.cond(left)?, self.cond(right)?);
                logical(&a, &b, *op).map(Value::Bool)
            }
            Expr::Not(inner) => Ok(Value::Bool(self.cond(inner)?.negate())),
            Expr::Neg(inner) => Ok(match self.num(inner)? {
                Num::Scalar(v) => Value::Scalar(-v),
                Num::Series(s) => Value::Numeric(NumericSeries::new(
                    Op::Arith(ArithOp::Sub),
                    s.values.iter().map(|v| -v).collect(),
                )),
            }),
        }
    }

    fn field(&mut self, field: Field) -> NumericSeries {
        let bars = self.ctx.bars;
        self.fields
            .entry(field)
            .or_insert_with(|| field.select(bars))
            .clone()
    }

    fn compare(&self, a: Num, b: Num, op: CmpOp) -> Result<BoolSeries, FormulaError> {
        if let (Num::Scalar(x), Num::Scalar(y)) = (&a, &b) {
            return Ok(BoolSeries::new(
                Op::Compare(op),
                vec![op.test(*x, *y); self.bar_count()],
            ));
        }
        compare(a.operand(), b.operand(), op)
    }

    fn num(&mut self, expr: &Expr) -> Result<Num, FormulaError> {
        self.eval(expr).map(Num::from_value)
    }

    fn series(&mut self, expr: &Expr) -> Result<NumericSeries, FormulaError> {
        let len = self.bar_count();
        Ok(self.num(expr)?.into_series(len))
    }

    fn cond(&mut self, expr: &Expr) -> Result<BoolSeries, FormulaError> {
        Ok(match self.eval(expr)? {
            Value::Bool(b) => b,
            Value::Numeric(s) => {
                BoolSeries::new(s.op, s.values.iter().map(|&v| truthy(v)).collect())
            }
            Value::Scalar(v) => BoolSeries::raw(vec![truthy(v); self.bar_count()]),
        })
    }

    fn constant(&mut self, func: Function, expr: &Expr) -> Result<f64, FormulaError> {
        match self.eval(expr)? {
            Value::Scalar(v) => Ok(v),
            _ => Err(invalid(func, "argument must be a constant".to_string())),
        }
    }

    fn window(&mut self, func: Function, expr: &Expr) -> Result<usize, FormulaError> {
        let v = self.constant(func, expr)?;
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
            return Err(invalid(
                func,
                format!("window must be a non-negative whole number, got {}", v),
            ));
        }
        Ok(v as usize)
    }

    fn optional_window(
        &mut self,
        func: Function,
        expr: Option<&Expr>,
    ) -> Result<Option<usize>, FormulaError> {
        expr.map(|e| self.window(func, e)).transpose()
    }

    fn latest(&mut self, func: Function, expr: &Expr) -> Result<f64, FormulaError> {
        self.eval(expr)?
            .last()
            .ok_or_else(|| invalid(func, "no bars to read a price from".to_string()))
    }

    fn call(&mut self, func: Function, args: &[Expr]) -> Result<Value, FormulaError> {
        trace!(function = %func, args = args.len(), "evaluating call");
        let (min, max) = func.arity();
        if args.len() < min || args.len() > max {
            return Err(invalid(
                func,
                format!("expected {}..={} arguments, got {}", min, max, args.len()),
            ));
        }

        let value = match func {
            Function::Cross | Function::CrossUnder => {
                let (a, b) = (self.num(&args[0])?, self.num(&args[1])?);
                let out = if func == Function::Cross {
                    cross::cross_over(a.operand(), b.operand())?
                } else {
                    cross::cross_under(a.operand(), b.operand())?
                };
                Value::Bool(out)
            }
            Function::Min | Function::Max => {
                let (a, b) = (self.num(&args[0])?, self.num(&args[1])?);
                let out = if func == Function::Min {
                    extrema::minimum(a.operand(), b.operand())?
                } else {
                    extrema::maximum(a.operand(), b.operand())?
                };
                fold(out, a.is_scalar() && b.is_scalar())
            }
            Function::Hhv | Function::Llv => {
                let s = self.series(&args[0])?;
                let n = self.window(func, &args[1])?;
                Value::Numeric(if func == Function::Hhv {
                    extrema::hhv(&s, n)?
                } else {
                    extrema::llv(&s, n)?
                })
            }
            Function::Count => {
                let c = self.cond(&args[0])?;
                let n = self.window(func, &args[1])?;
                Value::Numeric(streak::count(&c, n)?)
            }
            Function::Every => {
                let c = self.cond(&args[0])?;
                let n = self.window(func, &args[1])?;
                Value::Bool(streak::every(&c, n)?)
            }
            Function::Sma | Function::Rma => {
                let s = self.series(&args[0])?;
                let n = self.window(func, &args[1])?;
                Value::Numeric(if func == Function::Sma {
                    recurrence::sma(&s, n)?
                } else {
                    recurrence::rma(&s, n)?
                })
            }
            Function::BarsLast => Value::Numeric(event::bars_last(&self.cond(&args[0])?)),
            Function::ValueWhen => {
                let c = self.cond(&args[0])?;
                let src = self.num(&args[1])?;
                let occurrence = self.optional_window(func, args.get(2))?.unwrap_or(0);
                Value::Numeric(event::value_when(&c, src.operand(), occurrence)?)
            }
            Function::PivotHigh | Function::PivotLow => {
                let s = self.series(&args[0])?;
                let left = self.window(func, &args[1])?;
                let right = self.optional_window(func, args.get(2))?;
                let pivots = if func == Function::PivotHigh {
                    pivot::pivot_high(&s, left, right)
                } else {
                    pivot::pivot_low(&s, left, right)
                };
                Value::Numeric(pivots.filled(0.0))
            }
            Function::If => {
                let c = self.cond(&args[0])?;
                let (a, b) = (self.num(&args[1])?, self.num(&args[2])?);
                Value::Numeric(select::iif(&c, a.operand(), b.operand())?)
            }
            Function::Ref => {
                let s = self.series(&args[0])?;
                let n = self.window(func, &args[1])?;
                Value::Numeric(transform::reference(&s, n))
            }
            Function::Change => {
                let s = self.series(&args[0])?;
                let n = self.optional_window(func, args.get(1))?.unwrap_or(1);
                Value::Numeric(transform::change(&s, n)?)
            }
            Function::Ma | Function::Ema | Function::Wma | Function::Std | Function::Sum => {
                let s = self.series(&args[0])?;
                let n = self.window(func, &args[1])?;
                let out = match func {
                    Function::Ma => moving_average::ma(&s, n)?,
                    Function::Ema => moving_average::ema(&s, n)?,
                    Function::Wma => moving_average::wma(&s, n)?,
                    Function::Std => moving_average::std_dev(&s, n)?,
                    _ => moving_average::sum(&s, n)?,
                };
                Value::Numeric(out)
            }
            Function::Abs => match self.num(&args[0])? {
                Num::Scalar(v) => Value::Scalar(if v.is_infinite() { 0.0 } else { v.abs() }),
                Num::Series(s) => Value::Numeric(transform::abs(&s)),
            },
            Function::Mod => {
                let (a, b) = (self.num(&args[0])?, self.num(&args[1])?);
                let out = transform::modulo(a.operand(), b.operand())?;
                fold(out, a.is_scalar() && b.is_scalar())
            }
            Function::ZtPrice | Function::DtPrice => {
                let close = self.latest(func, &args[0])?;
                let max_move = self.constant(func, &args[1])?;
                Value::Scalar(if func == Function::ZtPrice {
                    limit_price::limit_up(close, max_move)?
                } else {
                    limit_price::limit_down(close, max_move)?
                })
            }
            Function::FromOpen => {
                let time = self
                    .ctx
                    .session_time
                    .ok_or_else(|| invalid(func, "no session time available".to_string()))?;
                Value::Scalar(session::minutes_from_open(time) as f64)
            }
        };
        Ok(value)
    }
}

fn invalid(func: Function, reason: String) -> FormulaError {
    FormulaError::InvalidArgument {
        function: func.name().to_string(),
        reason,
    }
}
