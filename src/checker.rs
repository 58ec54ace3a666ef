//! Final validity check on a computed cover: every looped vertex must be
//! included, and every remaining edge must have at least one endpoint in it.

use crate::sparse_graph::SparseGraph;

/// Checks `vc` is a valid vertex cover of `g`. On failure, returns a
/// diagnostic describing the first violation found.
pub fn check_vertex_cover(g: &SparseGraph, vc: &[usize]) -> Result<(), String> {
    let mut in_vc = vec![false; g.n];
    for &v in vc {
        in_vc[v] = true;
    }

    for i in 0..g.n {
        if g.vertex_has_loop[i] && !in_vc[i] {
            return Err(format!("vertex {} has a loop but is not in the vertex cover", i));
        }
    }

    for i in 0..g.n {
        if !in_vc[i] {
            for &v in &g.adjlist[i] {
                if !in_vc[v] {
                    return Err(format!("edge {},{} is uncovered", i, v));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_valid_cover() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        assert!(check_vertex_cover(&g, &[1]).is_ok());
    }

    #[test]
    fn rejects_an_uncovered_edge() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        assert!(check_vertex_cover(&g, &[0]).is_err());
    }

    #[test]
    fn rejects_a_missing_looped_vertex() {
        let mut g = SparseGraph::new(2);
        g.add_loop(0);
        assert!(check_vertex_cover(&g, &[]).is_err());
    }

    #[test]
    fn empty_cover_is_valid_for_edgeless_graph() {
        let g = SparseGraph::new(3);
        assert!(check_vertex_cover(&g, &[]).is_ok());
    }
}
