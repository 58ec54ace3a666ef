//! Immutable per-invocation configuration, threaded by reference through the
//! whole read/reduce/solve/check/print pipeline.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Pace,
    Dimacs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    pub colouring_variant: i32,
    pub max_sat_level: i32,
    pub algorithm_num: i32,
    pub num_threads: u32,
    pub quiet: bool,
    pub unweighted_sort: bool,
    pub file_format: FileFormat,
}

impl Params {
    pub fn new(
        colouring_variant: i32,
        max_sat_level: i32,
        algorithm_num: i32,
        num_threads: u32,
        quiet: bool,
        unweighted_sort: bool,
        file_format: FileFormat,
    ) -> Self {
        // The reference tool forces sequential execution unless algorithm_num
        // selects the (never implemented) parallel variant 5.
        let num_threads = if algorithm_num == 5 { num_threads } else { 1 };
        Params {
            colouring_variant,
            max_sat_level,
            algorithm_num,
            num_threads,
            quiet,
            unweighted_sort,
            file_format,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::new(3, -1, 0, 1, false, false, FileFormat::Pace)
    }
}
