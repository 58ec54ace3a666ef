//! Connected-component decomposition of the post-reduction graph: each
//! component is solved independently by the branch-and-bound driver.

use bit_set::BitSet;

use crate::sparse_graph::SparseGraph;

/// Splits the live (non-isolated) vertices of `g` into connected components
/// via BFS. Vertices with empty adjacency are isolated and excluded - they
/// contribute nothing to the cover.
pub fn make_list_of_components(g: &SparseGraph) -> Vec<Vec<usize>> {
    let mut components = Vec::new();
    let mut used = BitSet::with_capacity(g.n);
    for i in 0..g.n {
        if g.adjlist[i].is_empty() {
            used.insert(i);
        }
    }

    for i in 0..g.n {
        if used.contains(i) {
            continue;
        }
        let mut component = vec![i];
        used.insert(i);
        let mut to_explore = vec![i];
        while let Some(v) = to_explore.pop() {
            for &w in &g.adjlist[v] {
                if !used.contains(w) {
                    component.push(w);
                    to_explore.push(w);
                    used.insert(w);
                }
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_vertices_are_excluded() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        let components = make_list_of_components(&g);
        assert_eq!(components.len(), 1);
        let mut sorted = components[0].clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn two_disjoint_edges_are_two_components() {
        let mut g = SparseGraph::new(4);
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        let mut components = make_list_of_components(&g);
        for c in &mut components {
            c.sort_unstable();
        }
        components.sort();
        assert_eq!(components, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let g = SparseGraph::new(0);
        assert!(make_list_of_components(&g).is_empty());
    }
}
