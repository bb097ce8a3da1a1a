//! Command-line arguments for the `scout` binary

use std::path::PathBuf;

pub const DEFAULT_CURVE_RUNS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Single run of the configured policy
    Run,
    /// One run per policy
    Compare,
    /// Choice-probability curves over many runs per policy
    Curves,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub log: bool,
    pub runs: usize,
    pub out: Option<PathBuf>,
    pub sequential: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::Run,
            config_path: None,
            log: false,
            runs: DEFAULT_CURVE_RUNS,
            out: None,
            sequential: false,
        }
    }
}

impl Args {
    pub fn usage() -> &'static str {
        "\
scout - Bayesian market scout simulation

USAGE:
  scout [COMMAND] [CONFIG] [FLAGS]

COMMANDS:
  run        Single run of the configured policy (default)
  compare    One run each of greedy, epsilon-greedy and Thompson
  curves     Choice-probability curves over many runs per policy

CONFIG:
  Path to a JSON config. Missing fields and a missing file argument
  fall back to the embedded defaults.

FLAGS:
  --log              Include the per-period log (run only)
  --runs N           Runs per policy for curves (default: 500)
  --out PATH         Write the JSON report to PATH instead of stdout
  --sequential       Disable parallel batch runs
  --help             Show this help

Log level follows RUST_LOG (default: info).
"
    }

    pub fn parse_or_exit() -> Self {
        match Self::parse_from(std::env::args().skip(1)) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("{e}\n\n{}", Self::usage());
                std::process::exit(2);
            }
        }
    }

    /// Parse arguments, excluding the program name
    pub fn parse_from<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Args::default();
        let mut command_seen = false;
        let mut it = args.into_iter();

        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{}", Self::usage());
                    std::process::exit(0);
                }
                "--log" => out.log = true,
                "--sequential" => out.sequential = true,
                "--runs" => {
                    let v = it
                        .next()
                        .ok_or_else(|| "Missing value for --runs".to_string())?;
                    out.runs = parse_runs(&v)?;
                }
                "--out" => {
                    let v = it
                        .next()
                        .ok_or_else(|| "Missing value for --out".to_string())?;
                    out.out = Some(PathBuf::from(v));
                }
                _ if arg.starts_with("--runs=") => {
                    out.runs = parse_runs(&arg["--runs=".len()..])?;
                }
                _ if arg.starts_with("--out=") => {
                    out.out = Some(PathBuf::from(&arg["--out=".len()..]));
                }
                other if other.starts_with('-') => {
                    return Err(format!("Unknown argument: {other}"));
                }
                other => {
                    let command = match other {
                        "run" => Some(Command::Run),
                        "compare" => Some(Command::Compare),
                        "curves" => Some(Command::Curves),
                        _ => None,
                    };
                    match command {
                        Some(c) if !command_seen && out.config_path.is_none() => {
                            out.command = c;
                            command_seen = true;
                        }
                        _ if out.config_path.is_none() => {
                            out.config_path = Some(PathBuf::from(other));
                        }
                        _ => return Err(format!("Unexpected argument: {other}")),
                    }
                }
            }
        }

        Ok(out)
    }
}

fn parse_runs(v: &str) -> Result<usize, String> {
    let runs = v
        .parse::<usize>()
        .map_err(|_| "Invalid --runs (expected integer)".to_string())?;
    if runs == 0 {
        return Err("--runs must be >= 1".to_string());
    }
    Ok(runs)
}
