//! JSON output formatter for machine processing
//!
//! Every report, test case and summary is written as one JSON object on its
//! own line, tagged by `type`.

use crate::output::{OutputFormatter, Verbosity};
use crate::prover::ProofReport;
use crate::runner::{TestCaseResult, TestSummary};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Quiet mode drops passing test cases
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn write_line(&self, record: &JsonRecord<'_>, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string(record).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// One line of JSON output
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonRecord<'a> {
    Report(&'a ProofReport),
    TestCase(&'a TestCaseResult),
    Summary {
        succeeded: usize,
        failed: usize,
        total: usize,
    },
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ProofReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_line(&JsonRecord::Report(report), writer)
    }

    fn format_test_case(
        &self,
        case: &TestCaseResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if case.passed && self.verbosity == Verbosity::Quiet {
            return Ok(());
        }
        self.write_line(&JsonRecord::TestCase(case), writer)
    }

    fn format_test_summary(
        &self,
        summary: &TestSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_line(
            &JsonRecord::Summary {
                succeeded: summary.succeeded,
                failed: summary.failed(),
                total: summary.total,
            },
            writer,
        )
    }
}
