//! Readers for the two accepted graph dialects (DIMACS-clique and PACE-vc),
//! plus edge de-duplication and loop detection shared by both.
//!
//! Each non-comment line is parsed independently with small `nom` combinators,
//! in the style of the DIMACS reader this crate descends from; the original
//! C++ reader works the same way, one `std::getline` at a time.

use std::io::BufRead;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::map_res;
use nom::sequence::preceded;
use nom::IResult;

use crate::error::{Result, SolverError};
use crate::sparse_graph::SparseGraph;

const MAX_VERTEX_COUNT: i64 = i32::MAX as i64;

enum Line {
    Comment,
    Header { n: usize, m: usize },
    Edge { v: usize, w: usize },
    Weight { v: usize, wt: i64 },
    Blank,
}

fn uint(s: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(s)
}

fn int(s: &str) -> IResult<&str, i64> {
    map_res(digit1, str::parse::<i64>)(s)
}

fn header_line(s: &str) -> IResult<&str, Line> {
    let (s, _) = tag("p")(s)?;
    let (s, _) = space1(s)?;
    let (s, _) = alt((tag("edge"), tag("td")))(s)?;
    let (s, _) = space1(s)?;
    let (s, n) = uint(s)?;
    let (s, _) = space1(s)?;
    let (s, m) = uint(s)?;
    let (s, _) = space0(s)?;
    Ok((s, Line::Header { n, m }))
}

fn dimacs_edge_line(s: &str) -> IResult<&str, Line> {
    let (s, _) = preceded(tag("e"), space1)(s)?;
    let (s, v) = uint(s)?;
    let (s, _) = space1(s)?;
    let (s, w) = uint(s)?;
    Ok((s, Line::Edge { v, w }))
}

fn dimacs_weight_line(s: &str) -> IResult<&str, Line> {
    let (s, _) = preceded(tag("n"), space1)(s)?;
    let (s, v) = uint(s)?;
    let (s, _) = space1(s)?;
    let (s, wt) = int(s)?;
    Ok((s, Line::Weight { v, wt }))
}

fn pace_edge_line(s: &str) -> IResult<&str, Line> {
    let (s, v) = uint(s)?;
    let (s, _) = space1(s)?;
    let (s, w) = uint(s)?;
    Ok((s, Line::Edge { v, w }))
}

fn parse_line(line: &str, format: FileFormat) -> Option<Line> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return Some(Line::Blank);
    }
    if trimmed.starts_with('c') {
        return Some(Line::Comment);
    }
    if trimmed.starts_with('p') {
        return header_line(trimmed).ok().map(|(_, l)| l);
    }
    match format {
        FileFormat::Dimacs => {
            if let Ok((_, l)) = dimacs_edge_line(trimmed) {
                return Some(l);
            }
            if let Ok((_, l)) = dimacs_weight_line(trimmed) {
                return Some(l);
            }
            None
        }
        FileFormat::Pace => pace_edge_line(trimmed).ok().map(|(_, l)| l),
    }
}

pub use crate::params::FileFormat;

/// Reads a graph from `reader` in the given dialect. One-based vertex ids in
/// the text are converted to zero-based; reflexive edges (`v == w`) are
/// recorded as self-loops instead of edges, matching the reference reader.
pub fn read_graph<R: BufRead>(reader: R, format: FileFormat) -> Result<SparseGraph> {
    let mut g = SparseGraph::new(0);
    let mut medges: Option<usize> = None;
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut edges_read = 0usize;

    for line_result in reader.lines() {
        let line = line_result.map_err(|e| SolverError::InputParse(e.to_string()))?;
        let parsed = parse_line(&line, format);
        match parsed {
            Some(Line::Comment) | Some(Line::Blank) => {}
            Some(Line::Header { n, m }) => {
                if n as i64 > MAX_VERTEX_COUNT {
                    return Err(SolverError::OutOfBounds("too many vertices".into()));
                }
                if m as i64 > MAX_VERTEX_COUNT {
                    return Err(SolverError::OutOfBounds("too many edges".into()));
                }
                medges = Some(m);
                g = SparseGraph::new(n);
            }
            Some(Line::Edge { v, w }) => {
                if v == 0 || w == 0 || v > g.n || w > g.n {
                    return Err(SolverError::InputParse(format!(
                        "edge endpoint out of range: {} {}",
                        v, w
                    )));
                }
                let (v, w) = (v - 1, w - 1);
                if v < w {
                    edges.push((v, w));
                } else if v > w {
                    edges.push((w, v));
                } else {
                    edges.push((v, v));
                }
                edges_read += 1;
                if format == FileFormat::Pace {
                    if let Some(m) = medges {
                        if edges_read >= m {
                            break;
                        }
                    }
                }
            }
            Some(Line::Weight { v, wt }) => {
                if v == 0 || v > g.n {
                    return Err(SolverError::InputParse(format!("weight line out of range: {}", v)));
                }
                g.weight[v - 1] = wt;
            }
            None => return Err(SolverError::InputParse(format!("unrecognised line: {}", line))),
        }
    }

    if let Some(m) = medges {
        if m > 0 && edges.len() != m {
            return Err(SolverError::InputParse("unexpected number of edges".into()));
        }
    }

    deduplicate_and_add_edges(&mut g, edges);
    Ok(g)
}

fn deduplicate_and_add_edges(g: &mut SparseGraph, mut edges: Vec<(usize, usize)>) {
    edges.sort_unstable();
    edges.dedup();
    for (v, w) in edges {
        if v == w {
            g.add_loop(v);
        } else {
            g.add_edge(v, w);
        }
    }
    g.sort_adj_lists();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_pace_triangle() {
        let input = "p td 3 3\n1 2\n2 3\n1 3\n";
        let g = read_graph(Cursor::new(input), FileFormat::Pace).unwrap();
        assert_eq!(g.n, 3);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 2));
        assert!(g.has_edge(0, 2));
    }

    #[test]
    fn reads_dimacs_with_weights_and_comments() {
        let input = "c a comment\np edge 3 2\nn 1 5\ne 1 2\ne 2 3\n";
        let g = read_graph(Cursor::new(input), FileFormat::Dimacs).unwrap();
        assert_eq!(g.n, 3);
        assert_eq!(g.weight[0], 5);
        assert_eq!(g.weight[1], 1);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 2));
    }

    #[test]
    fn reflexive_edge_becomes_loop() {
        let input = "p edge 2 1\ne 1 1\n";
        let g = read_graph(Cursor::new(input), FileFormat::Dimacs).unwrap();
        assert!(g.vertex_has_loop[0]);
        assert!(g.adjlist[0].is_empty());
    }

    #[test]
    fn duplicate_edges_are_deduplicated() {
        let input = "p edge 2 2\ne 1 2\ne 2 1\n";
        let g = read_graph(Cursor::new(input), FileFormat::Dimacs).unwrap();
        assert_eq!(g.adjlist[0], vec![1]);
    }

    #[test]
    fn bad_header_is_input_parse_error() {
        let input = "p wat 2 1\n";
        let err = read_graph(Cursor::new(input), FileFormat::Dimacs).unwrap_err();
        assert!(matches!(err, SolverError::InputParse(_)));
    }

    #[test]
    fn edge_count_mismatch_is_rejected() {
        let input = "p edge 3 2\ne 1 2\n";
        let err = read_graph(Cursor::new(input), FileFormat::Dimacs).unwrap_err();
        assert!(matches!(err, SolverError::InputParse(_)));
    }
}
