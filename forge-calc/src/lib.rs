//! Forge Calc - the calculator a reference pipeline run produced
//!
//! Four-function arithmetic over `f64`. Invalid operators and division by zero
//! are reported as [`CalcError`] values.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from the calculator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Division by zero
    #[error("Division by zero is not allowed")]
    DivisionByZero,

    /// Operator other than + - * /
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// `calculate` called before both inputs and the operator were set
    #[error("Missing input: {0}")]
    MissingInput(&'static str),
}

/// An arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// All operators
    pub fn all() -> &'static [Operator] {
        &[
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
        ]
    }

    /// The operator's symbol
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            other => Err(CalcError::InvalidOperator(other.to_string())),
        }
    }
}

/// Apply `op` to `a` and `b`
pub fn calculate(a: f64, b: f64, op: Operator) -> Result<f64, CalcError> {
    match op {
        Operator::Add => Ok(a + b),
        Operator::Subtract => Ok(a - b),
        Operator::Multiply => Ok(a * b),
        Operator::Divide if b == 0.0 => Err(CalcError::DivisionByZero),
        Operator::Divide => Ok(a / b),
    }
}

/// Stateful calculator mirroring the generated app's menu
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    first: Option<f64>,
    second: Option<f64>,
    operator: Option<Operator>,
    result: Option<f64>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_first(&mut self, value: f64) {
        self.first = Some(value);
    }

    pub fn set_second(&mut self, value: f64) {
        self.second = Some(value);
    }

    /// Parse and set the operator
    pub fn set_operator(&mut self, op: &str) -> Result<(), CalcError> {
        self.operator = Some(op.parse()?);
        Ok(())
    }

    /// Compute and store the result
    pub fn calculate(&mut self) -> Result<f64, CalcError> {
        let a = self.first.ok_or(CalcError::MissingInput("first value"))?;
        let b = self.second.ok_or(CalcError::MissingInput("second value"))?;
        let op = self.operator.ok_or(CalcError::MissingInput("operator"))?;

        let value = calculate(a, b, op)?;
        self.result = Some(value);
        Ok(value)
    }

    /// Reset inputs and result
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn result(&self) -> Option<f64> {
        self.result
    }
}
