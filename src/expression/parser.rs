//! Parser for derivation expressions such as `({0} + {1}) / {2}`.
//!
//! Precedence is implicit: a (sub)expression is first split at its rightmost
//! top-level `+`/`-`, and only if there is none at its rightmost top-level
//! `* / . x`. Whatever is left must be a `{i}` placeholder or the literal `1`.
use super::ast::{BinaryOp, Expr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty expression or operand")]
    Empty,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("placeholder {{{index}}} is out of range for {operands} operand(s)")]
    UnknownPlaceholder { index: usize, operands: usize },
    #[error("malformed term '{0}'")]
    MalformedTerm(String),
}

const TERM_OPERATORS: &[u8] = b"+-";
const FACTOR_OPERATORS: &[u8] = b"*/.x";

/// Parses `expression` over a signature of `operands` slots.
pub fn parse(expression: &str, operands: usize) -> Result<Expr, ParseError> {
    let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(c) = stripped.chars().find(|c| !is_permitted(*c)) {
        return Err(ParseError::UnexpectedCharacter(c));
    }
    check_balance(&stripped)?;

    Parser { operands }.parse(&stripped)
}

fn is_permitted(c: char) -> bool {
    c.is_ascii_digit() || "{}()+-*/.x".contains(c)
}

fn check_balance(expression: &str) -> Result<(), ParseError> {
    let mut depth = 0i32;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth == 0 { Ok(()) } else { Err(ParseError::UnbalancedParentheses) }
}

struct Parser {
    operands: usize,
}

impl Parser {
    // Input is ASCII only (checked in `parse`), so byte indices are char boundaries.
    fn parse(&self, expression: &str) -> Result<Expr, ParseError> {
        if expression.is_empty() {
            return Err(ParseError::Empty);
        }

        if is_wrapped(expression) {
            return self.parse(&expression[1..expression.len() - 1]);
        }

        let split = find_last_top_level(expression, TERM_OPERATORS)
            .or_else(|| find_last_top_level(expression, FACTOR_OPERATORS));

        match split {
            Some(position) => {
                let symbol = char::from(expression.as_bytes()[position]);
                let op = BinaryOp::from_symbol(symbol).ok_or(ParseError::UnexpectedCharacter(symbol))?;
                let rhs = self.parse(&expression[position + 1..])?;
                let lhs = self.parse(&expression[..position])?;
                Ok(Expr::binary(op, lhs, rhs))
            }
            None => self.parse_term(expression),
        }
    }

    fn parse_term(&self, term: &str) -> Result<Expr, ParseError> {
        if term == "1" {
            return Ok(Expr::Constant);
        }

        let digits = term
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| ParseError::MalformedTerm(term.to_string()))?;

        let index: usize = digits.parse().map_err(|_| ParseError::MalformedTerm(term.to_string()))?;
        if index >= self.operands {
            return Err(ParseError::UnknownPlaceholder { index, operands: self.operands });
        }
        Ok(Expr::Leaf(index))
    }
}

/// Whether the first and last characters are one matching pair of parentheses.
fn is_wrapped(expression: &str) -> bool {
    let bytes = expression.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
        return false;
    }

    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
        if depth == 0 && i < bytes.len() - 1 {
            return false;
        }
    }
    true
}

/// Scans right-to-left for an operator outside any parentheses.
fn find_last_top_level(expression: &str, operators: &[u8]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, &b) in expression.as_bytes().iter().enumerate().rev() {
        match b {
            b')' => depth += 1,
            b'(' => depth -= 1,
            _ if depth == 0 && operators.contains(&b) => return Some(i),
            _ => {}
        }
    }
    None
}
