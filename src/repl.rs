//! Interactive session with line editing and persistent history

use crate::error::IoError;
use crate::runner::Runner;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Prompt shown when stdin is a terminal
pub const PROMPT: &str = "Expression (^D to quit): ";

/// Source of input lines; `None` ends the session
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, IoError>;

    /// Remember a line for later sessions
    fn remember(&mut self, _line: &str) {}
}

/// Line editor backed by rustyline
pub struct Editor {
    editor: DefaultEditor,
    histfile: PathBuf,
}

impl Editor {
    /// Create an editor and load history from `histfile` if it exists
    pub fn new(histfile: impl Into<PathBuf>) -> Result<Self, IoError> {
        let histfile = histfile.into();
        let mut editor = DefaultEditor::new().map_err(IoError::editor)?;

        match editor.load_history(&histfile) {
            Ok(()) => tracing::debug!(path = %histfile.display(), "loaded history"),
            Err(e) => {
                tracing::debug!(path = %histfile.display(), error = %e, "no history loaded")
            }
        }

        Ok(Self { editor, histfile })
    }

    pub fn histfile(&self) -> &Path {
        &self.histfile
    }

    /// Write the history file
    pub fn save(&mut self) -> Result<(), IoError> {
        self.editor
            .save_history(&self.histfile)
            .map_err(|e| IoError::history_write(&self.histfile, e))
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, IoError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(IoError::editor(e)),
        }
    }

    fn remember(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::debug!(error = %e, "failed to add history entry");
        }
    }
}

/// The prompt for the current stdin
pub fn prompt() -> &'static str {
    if std::io::stdin().is_terminal() {
        PROMPT
    } else {
        ""
    }
}

/// Prove each non-empty line until the source is exhausted
pub fn run_session(
    source: &mut dyn LineSource,
    runner: &Runner<'_>,
    prompt: &str,
    writer: &mut dyn Write,
) -> Result<usize, IoError> {
    let mut proved = 0;

    while let Some(line) = source.read_line(prompt)? {
        let expression = line.trim();
        if !expression.is_empty() {
            source.remember(expression);
            runner.prove(expression, writer)?;
            proved += 1;
        }
        writeln!(writer)?;
        writer.flush()?;
    }

    tracing::debug!(proved, "session ended");
    Ok(proved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{create_formatter, OutputConfig, OutputFormat, Verbosity};
    use crate::prover::Prover;
    use std::collections::VecDeque;

    struct Scripted {
        lines: VecDeque<String>,
        remembered: Vec<String>,
    }

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                remembered: Vec::new(),
            }
        }
    }

    impl LineSource for Scripted {
        fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, IoError> {
            Ok(self.lines.pop_front())
        }

        fn remember(&mut self, line: &str) {
            self.remembered.push(line.to_string());
        }
    }

    #[test]
    fn test_session_proves_each_line() {
        let formatter = create_formatter(
            OutputConfig::new(OutputFormat::Text, Verbosity::Normal).with_color(false),
        );
        let runner = Runner::new(Prover::default(), formatter.as_ref());
        let mut source = Scripted::new(&["x = x", "   ", "x / x = 1"]);
        let mut output = Vec::new();

        let proved = run_session(&mut source, &runner, "", &mut output).unwrap();
        assert_eq!(proved, 2);
        assert_eq!(source.remembered, vec!["x = x", "x / x = 1"]);

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Checking equation: (x) = (x)\nProven to be TRUE: x = x\n\n"));
        assert!(text.contains("Proven to be FALSE: x / x = 1"));
        // a blank line follows every input, including the empty one
        assert!(text.contains("x = x\n\n\n"));
        assert!(text.ends_with("Resulting expression: -1 = 0\n\n"));
    }

    #[test]
    fn test_session_empty_source() {
        let formatter = create_formatter(OutputConfig::default().with_color(false));
        let runner = Runner::new(Prover::default(), formatter.as_ref());
        let mut source = Scripted::new(&[]);
        let mut output = Vec::new();

        assert_eq!(run_session(&mut source, &runner, PROMPT, &mut output).unwrap(), 0);
        assert!(output.is_empty());
    }
}
