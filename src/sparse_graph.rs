//! Sparse adjacency-list graph representation, used during parsing and
//! reduction. Unlike `dense_graph::Graph`, this form is mutated in place by
//! the reduction pipeline.

use crate::dense_graph::Graph;

#[derive(Clone, Debug)]
pub struct SparseGraph {
    pub n: usize,
    pub adjlist: Vec<Vec<usize>>,
    pub weight: Vec<i64>,
    pub vertex_has_loop: Vec<bool>,
}

impl SparseGraph {
    pub fn new(n: usize) -> Self {
        SparseGraph {
            n,
            adjlist: vec![Vec::new(); n],
            weight: vec![1; n],
            vertex_has_loop: vec![false; n],
        }
    }

    pub fn add_loop(&mut self, v: usize) {
        self.vertex_has_loop[v] = true;
    }

    pub fn add_edge(&mut self, v: usize, w: usize) {
        self.adjlist[v].push(w);
        self.adjlist[w].push(v);
    }

    pub fn has_edge(&self, v: usize, w: usize) -> bool {
        let (v, w) = if self.adjlist[w].len() < self.adjlist[v].len() { (w, v) } else { (v, w) };
        self.adjlist[v].contains(&w)
    }

    pub fn vv_are_clique(&self, vv: &[usize]) -> bool {
        for i in 0..vv.len() {
            let v = vv[i];
            for &w in &vv[i + 1..] {
                if !self.adjlist[v].contains(&w) {
                    return false;
                }
            }
        }
        true
    }

    pub fn remove_edges_incident_to_loopy_vertices(&mut self) {
        for i in 0..self.n {
            if self.vertex_has_loop[i] {
                self.adjlist[i].clear();
            } else {
                let has_loop = &self.vertex_has_loop;
                self.adjlist[i].retain(|&v| !has_loop[v]);
            }
        }
    }

    pub fn sort_adj_lists(&mut self) {
        for list in &mut self.adjlist {
            list.sort_unstable();
        }
    }

    /// Builds the dense complement of the induced subgraph on `vv`: edges
    /// of the result are exactly the non-edges of the induced subgraph.
    pub fn complement_of_induced_subgraph(&self, vv: &[usize]) -> Graph {
        let mut old_to_new: Vec<i64> = vec![-1; self.n];
        let mut subgraph = Graph::new(vv.len());
        for (i, &v) in vv.iter().enumerate() {
            old_to_new[v] = i as i64;
        }

        for i in 0..vv.len() {
            for j in 0..vv.len() {
                if i != j {
                    subgraph.add_edge(i, j);
                }
            }
        }

        for &old_v in vv {
            let new_v = old_to_new[old_v] as usize;
            for &old_w in &self.adjlist[old_v] {
                if old_w > old_v {
                    continue;
                }
                let new_w = old_to_new[old_w];
                if new_w != -1 {
                    subgraph.remove_edge(new_v, new_w as usize);
                }
            }
        }
        for (i, &v) in vv.iter().enumerate() {
            subgraph.weight[i] = self.weight[v];
        }
        subgraph
    }

    /// Builds the induced sparse subgraph on `vv` (renumbered `vv[i] -> i`).
    pub fn induced_subgraph(&self, vv: &[usize]) -> SparseGraph {
        let mut old_to_new: Vec<i64> = vec![-1; self.n];
        for (i, &v) in vv.iter().enumerate() {
            old_to_new[v] = i as i64;
        }
        let mut subgraph = SparseGraph::new(vv.len());
        for &old_v in vv {
            let new_v = old_to_new[old_v] as usize;
            for &old_w in &self.adjlist[old_v] {
                if old_w > old_v {
                    continue;
                }
                let new_w = old_to_new[old_w];
                if new_w != -1 {
                    subgraph.add_edge(new_v, new_w as usize);
                }
            }
        }
        for (i, &v) in vv.iter().enumerate() {
            subgraph.weight[i] = self.weight[v];
        }
        subgraph
    }

    pub fn resize(&mut self, new_n: usize) {
        self.n = new_n;
        self.weight.resize(new_n, 1);
        self.vertex_has_loop.resize(new_n, false);
        self.adjlist.resize(new_n, Vec::new());
        for list in &mut self.adjlist {
            list.clear();
        }
    }

    /// Debug helper matching the original's DIMACS dump, used for manual
    /// inspection of reduced instances; not on the hot path.
    pub fn to_dimacs_string(&self) -> String {
        let endpoint_count: usize = self.adjlist.iter().map(|l| l.len()).sum();
        let mut out = format!("p edge {} {}\n", self.n, endpoint_count / 2);
        for i in 0..self.n {
            out.push_str(&format!("n {} {}\n", i + 1, self.weight[i]));
        }
        for i in 0..self.n {
            for &j in &self.adjlist[i] {
                if j > i {
                    break;
                }
                out.push_str(&format!("e {} {}\n", i + 1, j + 1));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_edge_searches_smaller_list() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 0));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn vv_are_clique_detects_missing_edge() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        assert!(!g.vv_are_clique(&[0, 1, 2]));
        g.add_edge(0, 2);
        assert!(g.vv_are_clique(&[0, 1, 2]));
    }

    #[test]
    fn remove_edges_incident_to_loopy_vertices_clears_both_sides() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_loop(1);
        g.remove_edges_incident_to_loopy_vertices();
        assert!(g.adjlist[1].is_empty());
        assert!(!g.adjlist[0].contains(&1));
        assert!(!g.adjlist[2].contains(&1));
    }

    #[test]
    fn complement_of_induced_subgraph_is_dual_to_adjacency() {
        let mut g = SparseGraph::new(4);
        g.add_edge(0, 1);
        let dense = g.complement_of_induced_subgraph(&[0, 1, 2, 3]);
        // (0,1) is an edge in g, so it must be a non-edge (bit set) in the complement.
        assert!(dense.bit_complement_nd[0].test_bit(1));
        // (0,2) is a non-edge in g, so it must be an edge (bit unset) in the complement.
        assert!(!dense.bit_complement_nd[0].test_bit(2));
    }

    #[test]
    fn induced_subgraph_renumbers_and_keeps_weights() {
        let mut g = SparseGraph::new(4);
        g.weight = vec![10, 20, 30, 40];
        g.add_edge(1, 2);
        let sub = g.induced_subgraph(&[1, 2, 3]);
        assert_eq!(sub.weight, vec![20, 30, 40]);
        assert!(sub.has_edge(0, 1));
        assert!(!sub.has_edge(0, 2));
    }
}
