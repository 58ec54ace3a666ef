//! Command-line entry point: reads a graph, runs the solver, validates the
//! resulting cover, and prints it in the reference's `s vc`/vertex-list
//! format.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use peaty_mwvc::checker::check_vertex_cover;
use peaty_mwvc::formats::read_graph;
use peaty_mwvc::params::{FileFormat, Params};
use peaty_mwvc::solver::solve;
use peaty_mwvc::stats::Stats;
use peaty_mwvc::SolverError;

#[derive(Parser, Debug)]
#[command(name = "peaty-mwvc", about = "Exact minimum weight vertex cover solver")]
struct Cli {
    /// Input file (defaults to stdin).
    input: Option<PathBuf>,

    /// Suppress `c `-prefixed progress comments.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Ignore vertex weights when ordering branch candidates.
    #[arg(short = 'u', long = "unweighted-sort")]
    unweighted_sort: bool,

    /// Colouring bound variant: 0 (plain greedy), 2 (unit-prop), 3 (class-enlarging, default).
    #[arg(short = 'c', long = "colouring-variant", default_value_t = 3)]
    colouring_variant: i32,

    /// Max-SAT unit-propagation level; -1 for unlimited.
    #[arg(short = 'm', long = "max-sat-level", default_value_t = -1)]
    max_sat_level: i32,

    /// Reserved algorithm selector; only `5` changes thread handling.
    #[arg(short = 'a', long = "algorithm", default_value_t = 0)]
    algorithm: i32,

    /// Number of worker threads (only honoured when --algorithm=5).
    #[arg(short = 't', long = "num-threads", default_value_t = 1)]
    num_threads: u32,

    /// Input dialect: "pace" or "dimacs".
    #[arg(short = 'f', long = "file-format", default_value = "pace")]
    file_format: String,

    /// Write a JSON diagnostics summary to this file.
    #[arg(long = "stats")]
    stats: Option<PathBuf>,
}

fn parse_file_format(s: &str) -> Result<FileFormat, SolverError> {
    match s {
        "pace" => Ok(FileFormat::Pace),
        "dimacs" => Ok(FileFormat::Dimacs),
        other => Err(SolverError::InputParse(format!("unknown file format: {}", other))),
    }
}

fn run() -> Result<(), SolverError> {
    let cli = Cli::parse();
    let file_format = parse_file_format(&cli.file_format)?;
    let params = Params::new(
        cli.colouring_variant,
        cli.max_sat_level,
        cli.algorithm,
        cli.num_threads,
        cli.quiet,
        cli.unweighted_sort,
        file_format,
    );

    let mut input_text = String::new();
    match &cli.input {
        Some(path) => {
            let mut file =
                BufReader::new(File::open(path).map_err(|e| SolverError::InputParse(e.to_string()))?);
            file.read_to_string(&mut input_text).map_err(|e| SolverError::InputParse(e.to_string()))?;
        }
        None => {
            io::stdin().read_to_string(&mut input_text).map_err(|e| SolverError::InputParse(e.to_string()))?;
        }
    }

    let g = read_graph(input_text.as_bytes(), params.file_format)?;
    let num_vertices = g.n;
    let num_edges: usize = g.adjlist.iter().map(|adj| adj.len()).sum::<usize>() / 2;
    let g_for_check = g.clone();

    let start = Instant::now();
    let result = solve(g, params)?;
    let elapsed_seconds = start.elapsed().as_secs_f64();

    check_vertex_cover(&g_for_check, &result.vertex_cover).map_err(SolverError::SolutionInvalid)?;

    if let Some(stats_path) = &cli.stats {
        let stats = Stats::new(num_vertices, num_edges, &result, elapsed_seconds);
        stats.write_to_file(stats_path).map_err(|e| SolverError::InputParse(e.to_string()))?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !params.quiet {
        writeln!(out, "c search nodes {}", result.search_node_count).ok();
        writeln!(out, "c cover weight {}", result.total_weight).ok();
    }
    writeln!(out, "s vc {} {}", num_vertices, result.vertex_cover.len()).ok();
    let mut sorted = result.vertex_cover.clone();
    sorted.sort_unstable();
    for v in sorted {
        writeln!(out, "{}", v + 1).ok();
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
