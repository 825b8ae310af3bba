//! foxi - Theorem prover in the theory of meadows
//!
//! Reads equations from files or an interactive prompt and decides them:
//! - `foxi FILE...` proves every expression in the files
//! - `foxi --test FILE...` checks expected outcomes and exits with the failure count
//! - `foxi` starts an interactive session

use clap::Parser;
use foxi::cli::CliArgs;
use foxi::config::Settings;
use foxi::logging::init_logger;
use foxi::output::{create_formatter, OutputConfig};
use foxi::progress::Progress;
use foxi::prover::Prover;
use foxi::repl::{self, Editor};
use foxi::runner::{read_expressions, Runner};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logger(args.debug);

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::resolve(&args)?;
    tracing::debug!(?settings, "resolved settings");

    let output_config =
        OutputConfig::from_cli(settings.json, settings.debug, settings.quiet, settings.color);
    let formatter = create_formatter(output_config);
    let prover = Prover::new(settings.max_variables);
    let runner =
        Runner::new(prover, formatter.as_ref()).with_reports(!settings.test || settings.debug);

    if args.is_interactive() {
        let mut editor = Editor::new(&settings.histfile)?;
        let mut stdout = io::stdout();
        repl::run_session(&mut editor, &runner, repl::prompt(), &mut stdout)?;

        if let Err(e) = editor.save() {
            tracing::warn!(path = %editor.histfile().display(), error = %e, "history not saved");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let expressions = read_expressions(&settings.files)?;
    let mut stdout = io::stdout().lock();

    if settings.test {
        let mut progress = Progress::new(settings.quiet);
        let summary = runner.run_tests(&expressions, &mut stdout, &mut progress)?;
        stdout.flush()?;
        return Ok(ExitCode::from(summary.exit_code()));
    }

    runner.prove_all(&expressions, &mut stdout)?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
