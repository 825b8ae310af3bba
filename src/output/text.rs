//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Proof verdicts with the residue and counterexample of false equations
//! - Per-line test results and the final tally

use crate::output::{OutputFormatter, Verbosity};
use crate::prover::{Outcome, ProofReport};
use crate::runner::{TestCaseResult, TestSummary};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn error_prefix(&self) -> String {
        if self.color {
            "ERROR".red().bold().to_string()
        } else {
            "ERROR".to_string()
        }
    }

    fn verdict_line(&self, verdict: bool, input: &str) -> String {
        let label = if verdict { "TRUE" } else { "FALSE" };
        if !self.color {
            return format!("Proven to be {}: {}", label, input);
        }
        let label = if verdict {
            label.green().bold()
        } else {
            label.red().bold()
        };
        format!("Proven to be {}: {}", label, input)
    }

    fn status_label(&self, passed: bool) -> String {
        match (passed, self.color) {
            (true, true) => "succ".green().to_string(),
            (false, true) => "fail".red().to_string(),
            (true, false) => "succ".to_string(),
            (false, false) => "fail".to_string(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &ProofReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            if let Some(ref equation) = report.equation {
                writeln!(writer, "Checking equation: {}", equation)?;
            }
        }
        if self.verbosity == Verbosity::Verbose && report.equation.is_some() {
            if let Some(ref smf) = report.smf {
                writeln!(writer, "Standard meadow form: {} = 0", smf)?;
            }
        }

        match &report.outcome {
            Outcome::Proven => {
                writeln!(writer, "{}", self.verdict_line(true, &report.input))?;
            }
            Outcome::Refuted {
                counterexample,
                residue,
            } => {
                if !counterexample.0.is_empty() {
                    writeln!(writer, "Counterexample: {}", counterexample)?;
                }
                writeln!(writer, "{}", self.verdict_line(false, &report.input))?;
                writeln!(writer, "Resulting expression: {} = 0", residue)?;
            }
            Outcome::Simplified { form } => {
                writeln!(writer, "{}", form)?;
            }
            Outcome::Error { message } => {
                writeln!(writer, "{} {}", self.error_prefix(), message)?;
            }
        }

        Ok(())
    }

    fn format_test_case(
        &self,
        case: &TestCaseResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !case.passed {
            match case.expected {
                Some(expected) => writeln!(
                    writer,
                    "{} Expression \"{}\" expected to be {}",
                    self.error_prefix(),
                    case.expression,
                    expected
                )?,
                None => writeln!(
                    writer,
                    "{} Malformed test line \"{}\", expected TRUE, FALSE or ERROR",
                    self.error_prefix(),
                    case.line
                )?,
            }
        }

        if case.passed && self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        writeln!(
            writer,
            "{}/{}\t{}  {}",
            case.index,
            case.total,
            self.status_label(case.passed),
            case.line
        )
    }

    fn format_test_summary(
        &self,
        summary: &TestSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let line = format!(
            "{} / {} tests succeeded!",
            summary.succeeded, summary.total
        );
        if !self.color {
            return writeln!(writer, "{}", line);
        }
        if summary.failed() == 0 {
            writeln!(writer, "{}", line.green().bold())
        } else {
            writeln!(writer, "{}", line.yellow().bold())
        }
    }
}
