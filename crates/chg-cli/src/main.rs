//! Hypergraph simulation CLI.
//!
//! Provides the `simulate-chg` binary: loads a hypergraph document, solves
//! it for one output node with inputs from a recorded frame, and prints a
//! single JSON report to stdout.
//!
//! Uses the same `chg_core::simulate()` pipeline as library callers, with the
//! bundled `chg_engine::SearchSolver` as the solving engine. Logging goes to
//! stderr so stdout only ever carries the report.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use chg_core::{load_document, simulate, ErrorReport, Report, SolveOptions, NO_SOLUTION_MESSAGE};
use chg_engine::SearchSolver;

/// Simulate a constraint hypergraph for one output node.
#[derive(Parser, Debug)]
#[command(name = "simulate-chg", about = "Simulate a constraint hypergraph for one output node")]
struct Cli {
    /// Path to the hypergraph JSON document.
    file_path: PathBuf,

    /// Label of the node to solve for.
    output_node: String,

    /// Frame supplying input values (default: no inputs).
    frame_key: Option<String>,

    /// Print the solution tree to stderr: true/false.
    #[arg(default_value = "true", value_parser = parse_flag, action = ArgAction::Set)]
    to_print: bool,

    /// Minimum search index of the solution.
    #[arg(default_value_t = 0)]
    min_index: usize,

    /// Logging level (10 debug, 20 info, 30 warning, 40 error); 0 leaves it unset.
    #[arg(default_value_t = 0)]
    logging_level: u8,

    /// Comma-separated node labels to trace during search.
    debug_nodes: Option<String>,

    /// Comma-separated edge labels to trace during search.
    debug_edges: Option<String>,
}

impl Cli {
    fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            to_print: self.to_print,
            min_index: self.min_index,
            logging_level: (self.logging_level > 0).then_some(self.logging_level),
            debug_nodes: split_list(self.debug_nodes.as_deref()),
            debug_edges: split_list(self.debug_edges.as_deref()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let exit_code = match run_simulate(&cli) {
        Ok(report) => {
            emit(&report);
            0
        }
        Err(message) => {
            emit(&ErrorReport::new(message));
            1
        }
    };
    process::exit(exit_code);
}

/// Execute one simulation, returning the report or the error message.
fn run_simulate(cli: &Cli) -> Result<Report, String> {
    let document = load_document(&cli.file_path).map_err(|e| e.to_string())?;
    let frame_key = cli.frame_key.as_deref().unwrap_or("");
    let options = cli.solve_options();

    tracing::debug!(file = %cli.file_path.display(), output_node = %cli.output_node, frame_key, "simulating");

    let solver = SearchSolver::default();
    match simulate(&solver, &document, &cli.output_node, frame_key, &options) {
        Ok(Some(solution)) => Ok(Report::from_solution(&cli.output_node, &solution)),
        Ok(None) => Err(NO_SOLUTION_MESSAGE.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Print a report as a single JSON line on stdout.
fn emit<T: Serialize>(report: &T) {
    let json = serde_json::to_string(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e));
    println!("{}", json);
}

/// Install a stderr subscriber for the requested logging level.
fn init_logging(cli: &Cli) {
    let watching = cli.debug_nodes.is_some() || cli.debug_edges.is_some();
    tracing_subscriber::fmt()
        .with_max_level(max_level(cli.logging_level, watching))
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Map a logging level to a max level. Debug filters report at INFO, so
/// watching any node or edge keeps INFO visible.
fn max_level(logging_level: u8, watching: bool) -> LevelFilter {
    let level = match logging_level {
        0 => LevelFilter::WARN,
        1..=10 => LevelFilter::DEBUG,
        11..=20 => LevelFilter::INFO,
        21..=30 => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    };
    if watching {
        level.max(LevelFilter::INFO)
    } else {
        level
    }
}

/// Parse a boolean argument.
fn parse_flag(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(format!("invalid boolean '{}', expected true/false", s)),
    }
}

fn split_list(list: Option<&str>) -> Vec<String> {
    list.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_positionals() {
        let cli = Cli::try_parse_from([
            "simulate-chg", "doc.json", "out", "f1", "False", "2", "20", "a, b", "e1",
        ])
        .unwrap();
        let options = cli.solve_options();
        assert_eq!(cli.frame_key.as_deref(), Some("f1"));
        assert!(!options.to_print);
        assert_eq!(options.min_index, 2);
        assert_eq!(options.logging_level, Some(20));
        assert_eq!(options.debug_nodes, ["a", "b"]);
        assert_eq!(options.debug_edges, ["e1"]);
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["simulate-chg", "doc.json", "out"]).unwrap();
        assert_eq!(cli.frame_key, None);
        assert_eq!(cli.solve_options(), SolveOptions::default());
    }

    #[test]
    fn debug_filters_raise_level_to_info() {
        assert_eq!(max_level(0, false), LevelFilter::WARN);
        assert_eq!(max_level(0, true), LevelFilter::INFO);
        assert_eq!(max_level(40, true), LevelFilter::INFO);
        assert_eq!(max_level(10, true), LevelFilter::DEBUG);
    }

    #[test]
    fn rejects_bad_flag() {
        assert!(Cli::try_parse_from(["simulate-chg", "doc.json", "out", "f1", "maybe"]).is_err());
    }
}
