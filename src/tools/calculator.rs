//! Arithmetic over a fixed grammar. Nothing outside of it is ever evaluated.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! `**` is right-associative and binds tighter than a leading minus, so
//! `-2 ** 2` is `-4`.
use serde::Deserialize;
use serde_json::Value;

use super::{parse_arguments, ToolExecutor, ToolOutput, CALCULATOR};
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::{ParamType, ToolSpec};

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    LParen,
    RParen,
}

fn eval_error<S: Into<String>>(message: S) -> AgentError {
    AgentError::Evaluation(message.into())
}

fn tokenize(input: &str) -> AgentResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Optional exponent, e.g. 1.5e3 or 2E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| eval_error(format!("invalid number '{}'", literal)))?;
                tokens.push(Token::Number(value));
            }
            other => {
                return Err(eval_error(format!(
                    "unexpected character '{}' at position {}",
                    other, i
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> AgentResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(eval_error("expression is nested too deeply"));
        }
        Ok(())
    }

    fn expr(&mut self) -> AgentResult<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> AgentResult<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(eval_error("division by zero"));
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> AgentResult<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(-value)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(value)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> AgentResult<f64> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Power) {
            self.pos += 1;
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            if base == 0.0 && exponent < 0.0 {
                return Err(eval_error("zero cannot be raised to a negative power"));
            }
            let value = base.powf(exponent);
            if value.is_nan() {
                return Err(eval_error("result is not a real number"));
            }
            return Ok(value);
        }
        Ok(base)
    }

    fn primary(&mut self) -> AgentResult<f64> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(eval_error("missing closing parenthesis")),
                }
            }
            Some(token) => Err(eval_error(format!("unexpected token {:?}", token))),
            None => Err(eval_error("unexpected end of expression")),
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str) -> AgentResult<f64> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(eval_error("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(eval_error(format!("unexpected token {:?}", token)));
    }
    if !value.is_finite() {
        return Err(eval_error("result is too large"));
    }
    Ok(value)
}

/// Whole results print without a fractional part
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Evaluate and format, reporting failures as an `Error: ...` string
pub fn calculator(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => format_number(value),
        Err(e) => format!("Error: {}", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CalculatorArgs {
    expression: String,
}

pub struct CalculatorTool;

impl CalculatorTool {
    pub fn spec() -> ToolSpec {
        ToolSpec::new(CALCULATOR, "Evaluate a mathematical expression")
            .required("expression", ParamType::String)
            .described("The mathematical expression to evaluate, e.g., '2 + 2' or '5 * (3 + 2)'")
    }
}

impl ToolExecutor for CalculatorTool {
    fn execute(&self, arguments: &Value) -> AgentResult<ToolOutput> {
        let args: CalculatorArgs = parse_arguments(arguments)?;
        Ok(match evaluate(&args.expression) {
            Ok(value) => ToolOutput::text(format_number(value)),
            Err(e) => ToolOutput::failure(e.to_string()),
        })
    }
}
