//! Batch and test drivers over expression files

use crate::error::IoError;
use crate::output::OutputFormatter;
use crate::progress::Progress;
use crate::prover::{ProofReport, Prover};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::LazyLock;

static TEST_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(TRUE|FALSE|ERROR)\s+(.+)$").unwrap());

/// Expected outcome of a test line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Expectation {
    True,
    False,
    /// Anything without a verdict: parse errors, algebra errors, bare values
    Error,
}

impl Expectation {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "TRUE" => Some(Expectation::True),
            "FALSE" => Some(Expectation::False),
            "ERROR" => Some(Expectation::Error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Expectation::True => "TRUE",
            Expectation::False => "FALSE",
            Expectation::Error => "ERROR",
        }
    }

    pub fn verdict(&self) -> Option<bool> {
        match self {
            Expectation::True => Some(true),
            Expectation::False => Some(false),
            Expectation::Error => None,
        }
    }

    pub fn matches(&self, report: &ProofReport) -> bool {
        self.verdict() == report.verdict()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Split `TRUE x = x` into its expectation and expression
pub fn parse_test_line(line: &str) -> Option<(Expectation, &str)> {
    let caps = TEST_LINE_RE.captures(line)?;
    let expectation = Expectation::from_label(caps.get(1)?.as_str())?;
    Some((expectation, caps.get(2)?.as_str().trim()))
}

/// Trimmed, non-empty lines of `content` that are not `#` comments
pub fn expression_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Read the expressions of every file, in order
pub fn read_expressions(files: &[PathBuf]) -> Result<Vec<String>, IoError> {
    let mut expressions = Vec::new();
    for path in files {
        let content =
            std::fs::read_to_string(path).map_err(|e| IoError::read_error(path, e))?;
        let before = expressions.len();
        expressions.extend(expression_lines(&content).map(str::to_string));
        tracing::debug!(
            path = %path.display(),
            count = expressions.len() - before,
            "read expressions"
        );
    }
    Ok(expressions)
}

/// Outcome of a single test line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseResult {
    pub index: usize,
    pub total: usize,
    pub line: String,
    /// None when the line does not start with TRUE, FALSE or ERROR
    pub expected: Option<Expectation>,
    pub expression: String,
    pub verdict: Option<bool>,
    pub passed: bool,
}

impl TestCaseResult {
    pub fn is_malformed(&self) -> bool {
        self.expected.is_none()
    }
}

/// Tally of a test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub succeeded: usize,
    pub total: usize,
}

impl TestSummary {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.succeeded += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Number of failures, saturated to fit a process exit status
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.failed()).unwrap_or(u8::MAX)
    }
}

/// Proves expressions and writes their reports through a formatter
pub struct Runner<'a> {
    prover: Prover,
    formatter: &'a dyn OutputFormatter,
    show_reports: bool,
}

impl<'a> Runner<'a> {
    pub fn new(prover: Prover, formatter: &'a dyn OutputFormatter) -> Self {
        Self {
            prover,
            formatter,
            show_reports: true,
        }
    }

    /// Whether proof reports are written in test mode
    pub fn with_reports(mut self, show_reports: bool) -> Self {
        self.show_reports = show_reports;
        self
    }

    /// Prove and report one expression
    pub fn prove(&self, expression: &str, writer: &mut dyn Write) -> io::Result<ProofReport> {
        let report = self.prover.prove(expression);
        self.formatter.format_report(&report, writer)?;
        Ok(report)
    }

    /// Prove every expression in order
    pub fn prove_all(&self, expressions: &[String], writer: &mut dyn Write) -> io::Result<()> {
        for expression in expressions {
            self.prove(expression, writer)?;
        }
        Ok(())
    }

    /// Check one `EXPECT expr` line; `index` is 1-based
    pub fn run_test_case(
        &self,
        index: usize,
        total: usize,
        line: &str,
        writer: &mut dyn Write,
    ) -> io::Result<TestCaseResult> {
        let Some((expected, expression)) = parse_test_line(line) else {
            tracing::debug!(line, "malformed test line");
            return Ok(TestCaseResult {
                index,
                total,
                line: line.to_string(),
                expected: None,
                expression: line.to_string(),
                verdict: None,
                passed: false,
            });
        };

        let report = self.prover.prove(expression);
        if self.show_reports {
            self.formatter.format_report(&report, writer)?;
        }

        Ok(TestCaseResult {
            index,
            total,
            line: line.to_string(),
            expected: Some(expected),
            expression: expression.to_string(),
            verdict: report.verdict(),
            passed: expected.matches(&report),
        })
    }

    /// Check every test line, then write the summary
    pub fn run_tests(
        &self,
        lines: &[String],
        writer: &mut dyn Write,
        progress: &mut Progress,
    ) -> io::Result<TestSummary> {
        let total = lines.len();
        let mut summary = TestSummary::default();
        progress.start(total as u64, "Testing");

        for (i, line) in lines.iter().enumerate() {
            let case = self.run_test_case(i + 1, total, line, writer)?;
            summary.record(case.passed);
            progress.suspend(|| self.formatter.format_test_case(&case, writer))?;
            progress.inc();
            if summary.failed() > 0 {
                progress.set_message(&format!("Testing ({} failed)", summary.failed()));
            }
        }

        progress.finish_and_clear();
        self.formatter.format_test_summary(&summary, writer)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputConfig, OutputFormat, Verbosity};
    use tempfile::NamedTempFile;

    fn text_formatter(verbosity: Verbosity) -> Box<dyn OutputFormatter> {
        crate::output::create_formatter(
            OutputConfig::new(OutputFormat::Text, verbosity).with_color(false),
        )
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_test_line() {
        assert_eq!(
            parse_test_line("TRUE x = x"),
            Some((Expectation::True, "x = x"))
        );
        assert_eq!(
            parse_test_line("FALSE\tx / x = 1"),
            Some((Expectation::False, "x / x = 1"))
        );
        assert_eq!(
            parse_test_line("ERROR x + = y"),
            Some((Expectation::Error, "x + = y"))
        );
    }

    #[test]
    fn test_parse_test_line_malformed() {
        assert_eq!(parse_test_line("x = x"), None);
        assert_eq!(parse_test_line("MAYBE x = x"), None);
        assert_eq!(parse_test_line("TRUE"), None);
        assert_eq!(parse_test_line("TRUEx = x"), None);
    }

    #[test]
    fn test_expectation_matches() {
        let prover = Prover::default();
        assert!(Expectation::True.matches(&prover.prove("x = x")));
        assert!(Expectation::False.matches(&prover.prove("x / x = 1")));
        assert!(Expectation::Error.matches(&prover.prove("x +")));
        assert!(Expectation::Error.matches(&prover.prove("x + 1")));
        assert!(!Expectation::True.matches(&prover.prove("x / x = 1")));
    }

    #[test]
    fn test_expression_lines() {
        let content = "# header\n\n  x = x  \n#comment\ny = y\n   \n";
        let found: Vec<&str> = expression_lines(content).collect();
        assert_eq!(found, vec!["x = x", "y = y"]);
    }

    #[test]
    fn test_read_expressions_from_files() {
        let mut a = NamedTempFile::new().unwrap();
        writeln!(a, "x = x\n# skip").unwrap();
        let mut b = NamedTempFile::new().unwrap();
        writeln!(b, "\ny = y").unwrap();

        let found = read_expressions(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(found, vec!["x = x", "y = y"]);
    }

    #[test]
    fn test_read_expressions_missing_file() {
        let err = read_expressions(&[PathBuf::from("/nonexistent/exprs.txt")]).unwrap_err();
        assert!(matches!(err, IoError::ReadError { .. }));
    }

    #[test]
    fn test_summary_exit_code() {
        let summary = TestSummary {
            succeeded: 3,
            total: 5,
        };
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.exit_code(), 2);

        let summary = TestSummary {
            succeeded: 0,
            total: 300,
        };
        assert_eq!(summary.exit_code(), 255);
    }

    #[test]
    fn test_run_tests_counts_failures() {
        let formatter = text_formatter(Verbosity::Normal);
        let runner = Runner::new(Prover::default(), formatter.as_ref()).with_reports(false);
        let mut output = Vec::new();

        let summary = runner
            .run_tests(
                &lines(&["TRUE x = x", "TRUE x / x = 1", "MAYBE y = y"]),
                &mut output,
                &mut Progress::disabled(),
            )
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("1/3\tsucc  TRUE x = x"));
        assert!(text.contains("ERROR Expression \"x / x = 1\" expected to be TRUE"));
        assert!(text.contains("2/3\tfail  TRUE x / x = 1"));
        assert!(text.contains("3/3\tfail  MAYBE y = y"));
        assert!(text.contains("1 / 3 tests succeeded!"));
        assert!(!text.contains("Proven to be"));
    }

    #[test]
    fn test_run_tests_with_reports() {
        let formatter = text_formatter(Verbosity::Verbose);
        let runner = Runner::new(Prover::default(), formatter.as_ref());
        let mut output = Vec::new();

        runner
            .run_tests(&lines(&["TRUE x = x"]), &mut output, &mut Progress::disabled())
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Proven to be TRUE: x = x"));
    }

    #[test]
    fn test_prove_all() {
        let formatter = text_formatter(Verbosity::Normal);
        let runner = Runner::new(Prover::default(), formatter.as_ref());
        let mut output = Vec::new();

        runner
            .prove_all(&lines(&["x = x", "x / x = 1"]), &mut output)
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Proven to be TRUE: x = x"));
        assert!(text.contains("Proven to be FALSE: x / x = 1"));
        assert!(text.contains("Counterexample: {x: zero}"));
    }
}
