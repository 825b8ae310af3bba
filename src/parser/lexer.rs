//! Tokenizer for meadow expressions
//!
//! Recognizes:
//! - Parentheses: `(`, `)`
//! - Operators: `=`, `+`, `-`, `*`, `/`
//! - Identifiers: a letter followed by letters, digits or `_`
//! - Numbers: `12`, `1.5`, `3.`

use crate::algebra::Poly;
use crate::error::ParseError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Alphabetic}[\p{Alphabetic}\p{N}_]*").unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]*)?").unwrap());

/// Binary operators, all left associative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Plus,
    Minus,
    Times,
    Divide,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Operator::Equals),
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Times),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Equals => '=',
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::Times => '*',
            Operator::Divide => '/',
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Equals => 0,
            Operator::Plus | Operator::Minus => 1,
            Operator::Times | Operator::Divide => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LeftParen,
    RightParen,
    Operator(Operator),
    Operand(Poly),
}

/// Iterator over the tokens of an expression; stops after the first error
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.offset..];
        let trimmed = rest.trim_start();
        self.offset += rest.len() - trimmed.len();
    }

    fn read_token(&mut self, rest: &'a str) -> Result<Token, ParseError> {
        if let Some(m) = IDENTIFIER_RE.find(rest) {
            self.offset += m.end();
            return Ok(Token::Operand(Poly::var(m.as_str())));
        }

        if let Some(m) = NUMBER_RE.find(rest) {
            self.offset += m.end();
            let literal = m.as_str();
            return Poly::parse_decimal(literal)
                .map(Token::Operand)
                .ok_or_else(|| ParseError::invalid_number(literal));
        }

        // Both regexes failed, so `rest` starts with a single-char token or garbage
        let c = rest.chars().next().ok_or(ParseError::Empty)?;
        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => match Operator::from_char(c) {
                Some(op) => Token::Operator(op),
                None => {
                    let position = self.input[..self.offset].chars().count();
                    return Err(ParseError::invalid_character(c, position));
                }
            },
        };
        self.offset += c.len_utf8();
        Ok(token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        if self.offset >= self.input.len() {
            return None;
        }

        let rest = &self.input[self.offset..];
        let result = self.read_token(rest);
        if result.is_err() {
            self.offset = self.input.len();
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Result<Vec<Token>, ParseError> {
        Lexer::new(input).collect()
    }

    #[test]
    fn test_simple_expression() {
        let result = tokens("x + 1").unwrap();
        assert_eq!(
            result,
            vec![
                Token::Operand(Poly::var("x")),
                Token::Operator(Operator::Plus),
                Token::Operand(Poly::one()),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_optional() {
        assert_eq!(tokens("(x*y)").unwrap().len(), 5);
        assert_eq!(tokens("  \t( x * y )  ").unwrap().len(), 5);
    }

    #[test]
    fn test_identifiers() {
        let result = tokens("alpha_1 β2").unwrap();
        assert_eq!(
            result,
            vec![
                Token::Operand(Poly::var("alpha_1")),
                Token::Operand(Poly::var("β2")),
            ]
        );
    }

    #[test]
    fn test_identifier_cannot_start_with_underscore() {
        let err = tokens("_x").unwrap_err();
        assert_eq!(err, ParseError::invalid_character('_', 0));
    }

    #[test]
    fn test_numbers() {
        let result = tokens("12 1.25 3.").unwrap();
        assert_eq!(
            result,
            vec![
                Token::Operand(Poly::from_integer(12)),
                Token::Operand(Poly::parse_decimal("1.25").unwrap()),
                Token::Operand(Poly::from_integer(3)),
            ]
        );
    }

    #[test]
    fn test_number_followed_by_identifier() {
        // `2x` lexes as two operands; the parser rejects it
        let result = tokens("2x").unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_all_operators() {
        let result = tokens("= + - * /").unwrap();
        let ops: Vec<char> = result
            .iter()
            .filter_map(|t| match t {
                Token::Operator(op) => Some(op.symbol()),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec!['=', '+', '-', '*', '/']);
    }

    #[test]
    fn test_invalid_character_position() {
        let err = tokens("x + $").unwrap_err();
        assert_eq!(err, ParseError::invalid_character('$', 4));
    }

    #[test]
    fn test_stops_after_error() {
        let mut lexer = Lexer::new("x ^ y");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_precedence() {
        assert!(Operator::Times.precedence() > Operator::Plus.precedence());
        assert_eq!(Operator::Plus.precedence(), Operator::Minus.precedence());
        assert_eq!(Operator::Equals.precedence(), 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").unwrap().is_empty());
        assert!(tokens("   ").unwrap().is_empty());
    }
}
