//! Fatal-error taxonomy for the solver. Every error is fatal: there are no
//! retries, and `main` is the only place that turns one into a process exit.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// Malformed input: bad header, non-numeric token, edge-count mismatch.
    InputParse(String),
    /// Internal consistency violation (adjacency asymmetry, duplicate edges
    /// surviving dedup) - indicates a solver bug, not bad input.
    Integrity(String),
    /// The computed cover failed the independent-set validity check.
    SolutionInvalid(String),
    /// Vertex or edge counts outside the representable range.
    OutOfBounds(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InputParse(msg) => write!(f, "input parse error: {}", msg),
            SolverError::Integrity(msg) => write!(f, "integrity error: {}", msg),
            SolverError::SolutionInvalid(msg) => write!(f, "solution invalid: {}", msg),
            SolverError::OutOfBounds(msg) => write!(f, "out of bounds: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {}

pub type Result<T> = std::result::Result<T, SolverError>;
