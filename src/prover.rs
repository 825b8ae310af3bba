//! Deciding meadow equations by case splitting on free variables
//!
//! An equation `lhs = rhs` holds when `lhs - rhs` evaluates to the zero
//! polynomial under every assignment of zero/nonzero to its variables.

use crate::algebra::{Algebraic, Assumptions, Expression};
use crate::error::{AlgebraError, AppError};
use crate::parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Default limit on the number of variables in a case split
pub const DEFAULT_MAX_VARIABLES: usize = 16;

/// Whether a variable is assumed zero or nonzero in a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableCase {
    Zero,
    Nonzero,
}

impl fmt::Display for VariableCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableCase::Zero => write!(f, "zero"),
            VariableCase::Nonzero => write!(f, "nonzero"),
        }
    }
}

/// Assignment under which an equation fails
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Counterexample(pub BTreeMap<String, VariableCase>);

impl Counterexample {
    pub fn get(&self, var: &str) -> Option<VariableCase> {
        self.0.get(var).copied()
    }

    fn assumptions(&self) -> Assumptions {
        let vars_with = |case: VariableCase| {
            self.0
                .iter()
                .filter(move |(_, c)| **c == case)
                .map(|(v, _)| v.as_str())
        };
        Assumptions::from_variables(
            vars_with(VariableCase::Zero),
            vars_with(VariableCase::Nonzero),
        )
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(var, case)| format!("{}: {}", var, case))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// What the prover concluded about an input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The equation holds in every case
    Proven,
    /// The equation fails for `counterexample`, where `residue = 0` is what remains
    Refuted {
        counterexample: Counterexample,
        residue: String,
    },
    /// The input was a value, not an equation
    Simplified { form: String },
    /// Parsing or deciding failed
    Error { message: String },
}

/// Everything reported about one input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smf: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ProofReport {
    fn new(input: &str, outcome: Outcome) -> Self {
        Self {
            input: input.to_string(),
            equation: None,
            smf: None,
            outcome,
        }
    }

    /// `Some(true)` if proven, `Some(false)` if refuted, `None` otherwise
    pub fn verdict(&self) -> Option<bool> {
        match self.outcome {
            Outcome::Proven => Some(true),
            Outcome::Refuted { .. } => Some(false),
            Outcome::Simplified { .. } | Outcome::Error { .. } => None,
        }
    }
}

/// Equation prover with a bound on the case split
#[derive(Debug, Clone, Copy)]
pub struct Prover {
    max_variables: usize,
}

impl Default for Prover {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VARIABLES)
    }
}

impl Prover {
    pub fn new(max_variables: usize) -> Self {
        Self { max_variables }
    }

    pub fn max_variables(&self) -> usize {
        self.max_variables
    }

    /// Parse and decide one input line. Errors become `Outcome::Error`.
    pub fn prove(&self, input: &str) -> ProofReport {
        let _span = tracing::info_span!("prove", input).entered();

        match self.try_prove(input) {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decide");
                ProofReport::new(
                    input,
                    Outcome::Error {
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    fn try_prove(&self, input: &str) -> Result<ProofReport, AppError> {
        let equation = match parser::parse(input)? {
            Expression::Algebraic(value) => {
                let form = value.to_string();
                tracing::debug!(%form, "input is not an equation");
                let mut report =
                    ProofReport::new(input, Outcome::Simplified { form: form.clone() });
                report.smf = Some(form);
                return Ok(report);
            }
            Expression::Equation(equation) => equation,
        };

        tracing::debug!("Checking equation: {}", equation);
        let diff = equation.difference();
        let outcome = self.decide(&diff)?;

        Ok(ProofReport {
            input: input.to_string(),
            equation: Some(equation.to_string()),
            smf: Some(diff.to_string()),
            outcome,
        })
    }

    /// Decide whether `diff` is zero under every zero/nonzero assignment
    pub fn decide(&self, diff: &Algebraic) -> Result<Outcome, AlgebraError> {
        let vars: Vec<String> = diff.free_variables().into_iter().collect();
        if vars.len() > self.max_variables {
            return Err(AlgebraError::TooManyVariables {
                count: vars.len(),
                limit: self.max_variables,
            });
        }

        for mask in 0u64..(1u64 << vars.len()) {
            let counterexample = Counterexample(
                vars.iter()
                    .enumerate()
                    .map(|(i, var)| {
                        let case = if mask & (1 << i) != 0 {
                            VariableCase::Nonzero
                        } else {
                            VariableCase::Zero
                        };
                        (var.clone(), case)
                    })
                    .collect(),
            );

            let assumptions = counterexample.assumptions();
            let result = diff.eval(&assumptions);
            tracing::debug!(case = %counterexample, %result, "evaluated case");

            if !result.is_zero() {
                return Ok(Outcome::Refuted {
                    counterexample,
                    residue: result.to_string(),
                });
            }
        }

        Ok(Outcome::Proven)
    }
}
