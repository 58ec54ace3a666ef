//! Diagnostic export: a JSON-serialisable summary of one solve, written to a
//! file when `--stats FILE` is given on the command line.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use serde::Serialize;

use crate::solver::SolveResult;

/// A snapshot of one run, independent of the `SolverError`/`Result` plumbing
/// used for the cover itself: this is diagnostic output, never consulted to
/// decide correctness.
#[derive(Serialize)]
pub struct Stats {
    pub num_vertices: usize,
    pub num_edges: usize,
    pub num_components: usize,
    pub component_sizes: Vec<usize>,
    pub search_node_count: u64,
    pub elapsed_seconds: f64,
    pub cover_size: usize,
    pub cover_weight: i64,
}

impl Stats {
    pub fn new(num_vertices: usize, num_edges: usize, result: &SolveResult, elapsed_seconds: f64) -> Self {
        Stats {
            num_vertices,
            num_edges,
            num_components: result.component_sizes.len(),
            component_sizes: result.component_sizes.clone(),
            search_node_count: result.search_node_count,
            elapsed_seconds,
            cover_size: result.vertex_cover.len(),
            cover_weight: result.total_weight,
        }
    }

    /// Writes this summary as pretty-printed JSON to `path`.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        Ok(())
    }
}
