//! Dense graph representation used by the branch-and-bound core and the
//! colouring bound. Each vertex owns the bit-set of its *non*-neighbours
//! ("bit-complement neighbourhood"), so that a clique in `Graph` corresponds
//! to an independent set in the graph it was built from.

use crate::bitset::{num_words, Bitset};

#[derive(Clone, Debug)]
pub struct Graph {
    pub n: usize,
    pub numwords: usize,
    pub weight: Vec<i64>,
    pub bit_complement_nd: Vec<Bitset>,
}

impl Graph {
    pub fn new(n: usize) -> Self {
        let numwords = num_words(n);
        let mut bit_complement_nd = vec![Bitset::new(numwords); n];
        for (i, bcn) in bit_complement_nd.iter_mut().enumerate() {
            bcn.set_first_n_bits(n);
            bcn.unset_bit(i);
        }
        Graph { n, numwords, weight: vec![0; n], bit_complement_nd }
    }

    pub fn add_edge(&mut self, v: usize, w: usize) {
        self.bit_complement_nd[v].unset_bit(w);
        self.bit_complement_nd[w].unset_bit(v);
    }

    pub fn remove_edge(&mut self, v: usize, w: usize) {
        self.bit_complement_nd[v].set_bit(w);
        self.bit_complement_nd[w].set_bit(v);
    }
}

/// Builds the induced subgraph on `vv` (renumbered `vv[i] -> i`), preserving
/// weights and the complement-edge relation.
pub fn induced_subgraph(g: &Graph, vv: &[usize]) -> Graph {
    let mut subg = Graph::new(vv.len());
    for i in 0..subg.n {
        let row = &g.bit_complement_nd[vv[i]];
        for j in (i + 1)..subg.n {
            if !row.test_bit(vv[j]) {
                subg.bit_complement_nd[i].unset_bit(j);
                subg.bit_complement_nd[j].unset_bit(i);
            }
        }
    }
    for i in 0..subg.n {
        subg.weight[i] = g.weight[vv[i]];
    }
    subg
}

#[derive(Clone, Debug)]
pub struct VtxList {
    pub total_wt: i64,
    pub vv: Vec<usize>,
}

impl VtxList {
    pub fn new(capacity: usize) -> Self {
        VtxList { total_wt: 0, vv: Vec::with_capacity(capacity) }
    }

    pub fn clear(&mut self) {
        self.total_wt = 0;
        self.vv.clear();
    }

    pub fn push_vtx_graph(&mut self, v: usize, g: &Graph) {
        self.vv.push(v);
        self.total_wt += g.weight[v];
    }

    pub fn pop_vtx_graph(&mut self, g: &Graph) {
        let v = *self.vv.last().expect("pop_vtx_graph on empty VtxList");
        self.total_wt -= g.weight[v];
        self.vv.pop();
    }

    pub fn push_vtx(&mut self, v: usize, weight: i64) {
        self.vv.push(v);
        self.total_wt += weight;
    }

    pub fn pop_vtx(&mut self, weight: i64) {
        self.total_wt -= weight;
        self.vv.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_graph_is_complete_in_complement() {
        let g = Graph::new(5);
        for v in 0..5 {
            assert_eq!(g.bit_complement_nd[v].popcount(), 4);
            assert!(!g.bit_complement_nd[v].test_bit(v));
        }
    }

    #[test]
    fn add_edge_is_symmetric_and_reversible() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        assert!(!g.bit_complement_nd[0].test_bit(1));
        assert!(!g.bit_complement_nd[1].test_bit(0));
        g.remove_edge(0, 1);
        assert!(g.bit_complement_nd[0].test_bit(1));
        assert!(g.bit_complement_nd[1].test_bit(0));
    }

    #[test]
    fn induced_subgraph_preserves_weights_and_edges() {
        let mut g = Graph::new(4);
        g.weight = vec![1, 2, 3, 4];
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        // vv = [1, 2, 3] -> new indices 0=old1, 1=old2, 2=old3
        let sub = induced_subgraph(&g, &[1, 2, 3]);
        assert_eq!(sub.weight, vec![2, 3, 4]);
        // old edge (2,3) survives as new edge (1,2)
        assert!(!sub.bit_complement_nd[1].test_bit(2));
        // old1 has no edge to old2 or old3 in g
        assert!(sub.bit_complement_nd[0].test_bit(1));
        assert!(sub.bit_complement_nd[0].test_bit(2));
    }

    #[test]
    fn vtx_list_push_pop_round_trip() {
        let mut g = Graph::new(3);
        g.weight = vec![5, 7, 9];
        let mut vl = VtxList::new(3);
        vl.push_vtx_graph(0, &g);
        vl.push_vtx_graph(2, &g);
        assert_eq!(vl.total_wt, 14);
        vl.pop_vtx_graph(&g);
        assert_eq!(vl.total_wt, 5);
        assert_eq!(vl.vv, vec![0]);
    }
}
