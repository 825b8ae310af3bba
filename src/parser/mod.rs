//! Operator-precedence parser for meadow expressions
//!
//! Operands are reduced to standard meadow forms as soon as an operator is
//! popped, so parsing and simplification happen in a single pass.

mod lexer;

pub use lexer::{Lexer, Operator, Token};

use crate::algebra::{self, Algebraic, Equation, Expression};
use crate::error::ParseError;
use std::fmt;

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Paren,
    Operator(Operator),
}

impl fmt::Display for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pending::Paren => write!(f, "("),
            Pending::Operator(op) => write!(f, "{}", op),
        }
    }
}

#[derive(Default)]
struct Stacks {
    operands: Vec<Expression>,
    operators: Vec<Pending>,
}

impl Stacks {
    fn reduce(&mut self) -> Result<(), ParseError> {
        let op = match self.operators.pop() {
            Some(Pending::Operator(op)) => op,
            Some(Pending::Paren) | None => return Err(ParseError::UnbalancedParentheses),
        };

        let unexpected = || ParseError::UnexpectedOperator {
            operator: op.symbol(),
        };
        let rhs = self.operands.pop().ok_or_else(unexpected)?;
        let lhs = self.operands.pop().ok_or_else(unexpected)?;

        let (lhs, rhs) = match (lhs, rhs) {
            (Expression::Algebraic(l), Expression::Algebraic(r)) => (l, r),
            _ => {
                return Err(ParseError::EquationOperand {
                    operator: op.symbol(),
                })
            }
        };

        self.operands.push(apply(op, &lhs, &rhs));
        Ok(())
    }

    fn reduce_while_binding(&mut self, incoming: Operator) -> Result<(), ParseError> {
        while let Some(Pending::Operator(top)) = self.operators.last() {
            if top.precedence() < incoming.precedence() {
                break;
            }
            self.reduce()?;
        }
        Ok(())
    }

    fn reduce_until_paren(&mut self) -> Result<(), ParseError> {
        loop {
            match self.operators.last() {
                Some(Pending::Paren) => {
                    self.operators.pop();
                    return Ok(());
                }
                Some(Pending::Operator(_)) => self.reduce()?,
                None => return Err(ParseError::UnbalancedParentheses),
            }
        }
    }

    fn trace(&self) {
        tracing::debug!(
            "Expression stack: [{}]",
            join(self.operands.iter().map(ToString::to_string))
        );
        tracing::debug!(
            "Operator stack:   [{}]",
            join(self.operators.iter().map(ToString::to_string))
        );
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn apply(op: Operator, lhs: &Algebraic, rhs: &Algebraic) -> Expression {
    match op {
        Operator::Equals => Expression::Equation(Equation::new(lhs.clone(), rhs.clone())),
        Operator::Plus => Expression::Algebraic(algebra::add(lhs, rhs)),
        Operator::Minus => Expression::Algebraic(algebra::sub(lhs, rhs)),
        Operator::Times => Expression::Algebraic(algebra::mul(lhs, rhs)),
        Operator::Divide => Expression::Algebraic(algebra::div(lhs, rhs)),
    }
}

/// Parse `input` into an equation or a single value in standard meadow form
pub fn parse(input: &str) -> Result<Expression, ParseError> {
    let _span = tracing::debug_span!("parse", input).entered();
    let mut stacks = Stacks::default();

    for token in Lexer::new(input) {
        match token? {
            Token::Operand(p) => stacks.operands.push(Expression::Algebraic(p.into())),
            Token::Operator(op) => {
                stacks.reduce_while_binding(op)?;
                stacks.operators.push(Pending::Operator(op));
            }
            Token::LeftParen => stacks.operators.push(Pending::Paren),
            Token::RightParen => stacks.reduce_until_paren()?,
        }
        stacks.trace();
    }

    while !stacks.operators.is_empty() {
        stacks.reduce()?;
        stacks.trace();
    }

    let mut operands = stacks.operands;
    match operands.len() {
        0 => Err(ParseError::Empty),
        1 => operands.pop().ok_or(ParseError::Empty),
        _ => Err(ParseError::MissingOperator),
    }
}
