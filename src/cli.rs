//! CLI argument parsing module for foxi

use clap::Parser;
use std::path::PathBuf;

/// Upper bound accepted for `--max-variables`; the case split has 2^N branches
pub const MAX_VARIABLES_LIMIT: usize = 30;

/// Parse a variable limit in 1..=MAX_VARIABLES_LIMIT
pub fn parse_max_variables(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", s))?;

    if n == 0 || n > MAX_VARIABLES_LIMIT {
        return Err(format!(
            "must be between 1 and {}, got {}",
            MAX_VARIABLES_LIMIT, n
        ));
    }
    Ok(n)
}

/// Theorem prover in the theory of meadows
#[derive(Parser, Debug, Clone)]
#[command(name = "foxi", version, about = "Theorem prover in the theory of meadows")]
pub struct CliArgs {
    /// Files to read expressions from, one per line. Empty lines and lines
    /// starting with a # are ignored. Without files, read from the terminal.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output intermediary steps, generates a lot of extra output
    #[arg(short, long)]
    pub debug: bool,

    /// Each line of the input files starts with TRUE, FALSE or ERROR,
    /// the expected outcome of the expression
    #[arg(short, long)]
    pub test: bool,

    /// File to write expression input history to [default: ./.foxi-history]
    #[arg(short = 'H', long, value_name = "PATH")]
    pub histfile: Option<PathBuf>,

    /// Only print failing tests and the summary
    #[arg(short, long)]
    pub quiet: bool,

    // Output options
    /// Output results in JSON format, one object per line
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Refuse equations with more free variables than this [default: 16]
    #[arg(long, value_name = "N", value_parser = parse_max_variables)]
    pub max_variables: Option<usize>,

    /// Configuration file [default: ./foxi.toml if present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// True when there is no file to read and input comes from the terminal
    pub fn is_interactive(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["foxi"]);
        assert!(args.files.is_empty());
        assert!(!args.debug);
        assert!(!args.test);
        assert!(args.histfile.is_none());
        assert!(!args.quiet);
        assert!(!args.json);
        assert!(!args.no_color);
        assert!(args.max_variables.is_none());
        assert!(args.config.is_none());
        assert!(args.is_interactive());
    }

    #[test]
    fn test_files_argument() {
        let args = CliArgs::parse_from(["foxi", "a.txt", "b.txt"]);
        assert_eq!(
            args.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_debug_flags() {
        assert!(CliArgs::parse_from(["foxi", "-d"]).debug);
        assert!(CliArgs::parse_from(["foxi", "--debug"]).debug);
    }

    #[test]
    fn test_test_flags() {
        assert!(CliArgs::parse_from(["foxi", "-t", "cases.txt"]).test);
        assert!(CliArgs::parse_from(["foxi", "--test", "cases.txt"]).test);
    }

    #[test]
    fn test_histfile() {
        let args = CliArgs::parse_from(["foxi", "-H", "/tmp/hist"]);
        assert_eq!(args.histfile, Some(PathBuf::from("/tmp/hist")));

        let args = CliArgs::parse_from(["foxi", "--histfile", "/tmp/hist"]);
        assert_eq!(args.histfile, Some(PathBuf::from("/tmp/hist")));
    }

    #[test]
    fn test_quiet_flags() {
        assert!(CliArgs::parse_from(["foxi", "-q"]).quiet);
        assert!(CliArgs::parse_from(["foxi", "--quiet"]).quiet);
    }

    #[test]
    fn test_output_flags() {
        let args = CliArgs::parse_from(["foxi", "--json", "--no-color"]);
        assert!(args.json);
        assert!(args.no_color);
    }

    #[test]
    fn test_max_variables() {
        let args = CliArgs::parse_from(["foxi", "--max-variables", "8"]);
        assert_eq!(args.max_variables, Some(8));
    }

    #[test]
    fn test_max_variables_out_of_range() {
        assert!(CliArgs::try_parse_from(["foxi", "--max-variables", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["foxi", "--max-variables", "31"]).is_err());
        assert!(CliArgs::try_parse_from(["foxi", "--max-variables", "many"]).is_err());
    }

    #[test]
    fn test_parse_max_variables() {
        assert_eq!(parse_max_variables("1"), Ok(1));
        assert_eq!(parse_max_variables(" 30 "), Ok(30));
        assert!(parse_max_variables("").is_err());
        assert!(parse_max_variables("-1").is_err());
    }

    #[test]
    fn test_config_path() {
        let args = CliArgs::parse_from(["foxi", "--config", "custom.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "foxi",
            "-t",
            "-q",
            "--json",
            "--max-variables",
            "4",
            "tests/basic.txt",
        ]);
        assert!(args.test);
        assert!(args.quiet);
        assert!(args.json);
        assert_eq!(args.max_variables, Some(4));
        assert_eq!(args.files, vec![PathBuf::from("tests/basic.txt")]);
    }
}
