//! Formula parser.
//!
//! Recursive descent over the formula grammar, lowest precedence first:
//! OR, AND, comparison, `+ -`, `* /`, unary `- NOT`, primary. Errors carry
//! the byte offset of the offending token.

use crate::domain::error::ParseError;
use crate::domain::field::Field;
use crate::domain::formula::{Expr, Function};
use crate::domain::operator::{ArithOp, CmpOp, LogicOp};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: String, position: usize) -> ParseError {
        ParseError { message, position }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(
                format!("expected '{}', found '{}'", expected, ch),
                self.pos,
            )),
            None => Err(self.error(
                format!("expected '{}', found end of input", expected),
                self.pos,
            )),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn consume_exact(&mut self, s: &str) -> bool {
        if self.remaining().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> &'a str {
        let remaining = self.remaining();
        let end = remaining
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(remaining.len());
        &remaining[..end]
    }

    fn describe_next(&self) -> String {
        let word = self.peek_word();
        if !word.is_empty() {
            word.to_string()
        } else {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error("expected number".to_string(), start));
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number: {}", num_str), start))
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.consume_keyword("OR") || self.consume_exact("||") {
                let right = self.parse_and()?;
                left = logic(LogicOp::Or, left, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            self.skip_whitespace();
            if self.consume_keyword("AND") || self.consume_exact("&&") {
                let right = self.parse_comparison()?;
                left = logic(LogicOp::And, left, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn comparison_operator(&mut self) -> Option<CmpOp> {
        // Two-character operators first so ">=" is not read as ">".
        const OPERATORS: [(&str, CmpOp); 8] = [
            (">=", CmpOp::Ge),
            ("<=", CmpOp::Le),
            ("==", CmpOp::Eq),
            ("!=", CmpOp::Ne),
            ("<>", CmpOp::Ne),
            (">", CmpOp::Gt),
            ("<", CmpOp::Lt),
            ("=", CmpOp::Eq),
        ];
        OPERATORS
            .iter()
            .find(|(symbol, _)| self.remaining().starts_with(symbol))
            .map(|&(symbol, op)| {
                self.pos += symbol.len();
                op
            })
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_sum()?;
        self.skip_whitespace();
        match self.comparison_operator() {
            Some(op) => {
                let right = self.parse_sum()?;
                Ok(Expr::Compare {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            None => Ok(left),
        }
    }

    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => ArithOp::Add,
                Some('-') => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') => ArithOp::Mul,
                Some('/') => ArithOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.consume_keyword("NOT") {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();

        match self.peek() {
            Some('(') => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect_char(')')?;
                return Ok(inner);
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => {
                return self.parse_number().map(Expr::Number);
            }
            _ => {}
        }

        let start = self.pos;
        let word = self.peek_word();
        if word.is_empty() {
            return Err(self.error(
                format!("expected expression, found '{}'", self.describe_next()),
                start,
            ));
        }
        self.pos += word.len();

        if let Some(field) = Field::from_name(word) {
            return Ok(Expr::Field(field));
        }
        let Some(func) = Function::from_name(word) else {
            return Err(self.error(format!("unknown name '{}'", word), start));
        };

        self.skip_whitespace();
        let args = if self.peek() == Some('(') {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        let (min, max) = func.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                format!("{}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.error(
                format!(
                    "{} expects {} arguments, found {}",
                    func,
                    expected,
                    args.len()
                ),
                start,
            ));
        }
        Ok(Expr::call(func, args))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_char('(')?;
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_or()?);
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                return Ok(args);
            }
            self.expect_char(',')?;
        }
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(
                format!("unexpected input after formula: '{}'", self.remaining()),
                self.pos,
            ));
        }
        Ok(expr)
    }
}

fn binary(op: ArithOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn logic(op: LogicOp, left: Expr, right: Expr) -> Expr {
    Expr::Logic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
