//! Exact solver for minimum weight vertex cover, via maximum weight clique
//! search on the complement graph: bit-parallel branch-and-bound pruned by a
//! weighted-colouring/unit-propagation bound, with graph reductions run
//! ahead of search and a tabu local search feeding the incumbent bound.

pub mod bitset;
pub mod bnb;
pub mod checker;
pub mod colouring;
pub mod components;
pub mod degeneracy;
pub mod dense_graph;
pub mod error;
pub mod formats;
pub mod fractional_chromatic;
pub mod local_search;
pub mod params;
pub mod reductions;
pub mod solver;
pub mod sparse_graph;
pub mod stats;

pub use error::{Result, SolverError};
pub use params::{FileFormat, Params};
pub use solver::{solve, SolveResult};
