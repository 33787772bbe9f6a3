//! Formula AST.
//!
//! - `Function`: the callable names of the formula language and their arity
//! - `Expr`: the expression tree produced by the parser
//!
//! `Display` renders an expression back to formula text, fully
//! parenthesised; `tree` renders it as an indented operator tree.

use crate::domain::field::Field;
use crate::domain::operator::{ArithOp, CmpOp, LogicOp};
use std::fmt;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Cross,
    CrossUnder,
    Min,
    Max,
    Hhv,
    Llv,
    Count,
    Every,
    Sma,
    Rma,
    BarsLast,
    ValueWhen,
    PivotHigh,
    PivotLow,
    If,
    Ref,
    Change,
    Ma,
    Ema,
    Wma,
    Std,
    Sum,
    Abs,
    Mod,
    ZtPrice,
    DtPrice,
    FromOpen,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        let func = match name {
            "CROSS" | "CROSSOVER" => Function::Cross,
            "CROSSUNDER" => Function::CrossUnder,
            "MIN" => Function::Min,
            "MAX" => Function::Max,
            "HHV" => Function::Hhv,
            "LLV" => Function::Llv,
            "COUNT" => Function::Count,
            "EVERY" => Function::Every,
            "SMA" => Function::Sma,
            "RMA" => Function::Rma,
            "BARSLAST" => Function::BarsLast,
            "VALUEWHEN" => Function::ValueWhen,
            "PIVOTHIGH" => Function::PivotHigh,
            "PIVOTLOW" => Function::PivotLow,
            "IF" | "IIF" => Function::If,
            "REF" => Function::Ref,
            "CHANGE" => Function::Change,
            "MA" => Function::Ma,
            "EMA" => Function::Ema,
            "WMA" => Function::Wma,
            "STD" => Function::Std,
            "SUM" => Function::Sum,
            "ABS" => Function::Abs,
            "MOD" => Function::Mod,
            "ZTPRICE" => Function::ZtPrice,
            "DTPRICE" => Function::DtPrice,
            "FROMOPEN" => Function::FromOpen,
            _ => return None,
        };
        Some(func)
    }

    /// Canonical name; aliases resolve to this on display.
    pub fn name(self) -> &'static str {
        match self {
            Function::Cross => "CROSS",
            Function::CrossUnder => "CROSSUNDER",
            Function::Min => "MIN",
            Function::Max => "MAX",
            Function::Hhv => "HHV",
            Function::Llv => "LLV",
            Function::Count => "COUNT",
            Function::Every => "EVERY",
            Function::Sma => "SMA",
            Function::Rma => "RMA",
            Function::BarsLast => "BARSLAST",
            Function::ValueWhen => "VALUEWHEN",
            Function::PivotHigh => "PIVOTHIGH",
            Function::PivotLow => "PIVOTLOW",
            Function::If => "IF",
            Function::Ref => "REF",
            Function::Change => "CHANGE",
            Function::Ma => "MA",
            Function::Ema => "EMA",
            Function::Wma => "WMA",
            Function::Std => "STD",
            Function::Sum => "SUM",
            Function::Abs => "ABS",
            Function::Mod => "MOD",
            Function::ZtPrice => "ZTPRICE",
            Function::DtPrice => "DTPRICE",
            Function::FromOpen => "FROMOPEN",
        }
    }

    /// `(min, max)` number of arguments.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Function::FromOpen => (0, 0),
            Function::BarsLast | Function::Abs => (1, 1),
            Function::Change => (1, 2),
            Function::ValueWhen | Function::PivotHigh | Function::PivotLow => (2, 3),
            Function::If => (3, 3),
            _ => (2, 2),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Field(Field),
    Call {
        func: Function,
        args: Vec<Expr>,
    },
    Binary {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logic {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    pub fn call(func: Function, args: Vec<Expr>) -> Expr {
        Expr::Call { func, args }
    }

    /// Indented operator tree, one node per line.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let children: Vec<&Expr> = match self {
            Expr::Number(n) => {
                let _ = writeln!(out, "{indent}{n}");
                return;
            }
            Expr::Field(field) => {
                let _ = writeln!(out, "{indent}{field}");
                return;
            }
            Expr::Call { func, args } => {
                let _ = writeln!(out, "{indent}{func}");
                args.iter().collect()
            }
            Expr::Binary { op, left, right } => {
                let _ = writeln!(out, "{indent}{}", op.symbol());
                vec![left.as_ref(), right.as_ref()]
            }
            Expr::Compare { op, left, right } => {
                let _ = writeln!(out, "{indent}{}", op.symbol());
                vec![left.as_ref(), right.as_ref()]
            }
            Expr::Logic { op, left, right } => {
                let _ = writeln!(out, "{indent}{}", logic_keyword(*op));
                vec![left.as_ref(), right.as_ref()]
            }
            Expr::Not(inner) => {
                let _ = writeln!(out, "{indent}NOT");
                vec![inner.as_ref()]
            }
            Expr::Neg(inner) => {
                let _ = writeln!(out, "{indent}NEG");
                vec![inner.as_ref()]
            }
        };
        for child in children {
            child.write_tree(out, depth + 1);
        }
    }
}

fn logic_keyword(op: LogicOp) -> &'static str {
    match op {
        LogicOp::And => "AND",
        LogicOp::Or => "OR",
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Field(field) => write!(f, "{}", field),
            Expr::Call { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Logic { op, left, right } => {
                write!(f, "({} {} {})", left, logic_keyword(*op), right)
            }
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::Neg(inner) => write!(f, "-{}", inner),
        }
    }
}
