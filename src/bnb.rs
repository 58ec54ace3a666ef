//! The branch-and-bound driver: searches for a maximum-weight clique in the
//! dense complement graph, pruning with the colouring bound and periodically
//! consulting the local-search and fractional-chromatic helpers on graphs
//! large enough to benefit from them.

use std::sync::atomic::AtomicBool;

use crate::bitset::Bitset;
use crate::colouring::Colourer;
use crate::dense_graph::{Graph, VtxList};
use crate::fractional_chromatic::{ColouringGraph, ColouringNumberFinder};
use crate::local_search::LocalSearcher;
use crate::params::Params;

/// One independent per-component search. Holds scratch buffers indexed by
/// recursion depth so sibling calls at the same depth reuse the same
/// allocation instead of allocating fresh bitsets on every node.
pub struct Mwc<'a> {
    g: &'a Graph,
    #[allow(dead_code)]
    params: Params,
    colourer: Box<dyn Colourer + 'a>,
    vertex_numbers_in_original_graph: Vec<usize>,
    branch_vv_bitsets: Vec<Bitset>,
    new_p_bitsets: Vec<Bitset>,
    local_searcher: LocalSearcher<'a>,
    cg: ColouringGraph,
    exact_colourer1: ColouringNumberFinder,
    exact_colourer2: ColouringNumberFinder,
    terminate_early: AtomicBool,
}

impl<'a> Mwc<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        g: &'a Graph,
        params: Params,
        colourer: Box<dyn Colourer + 'a>,
        vertex_numbers_in_original_graph: Vec<usize>,
        local_searcher: LocalSearcher<'a>,
        cg: ColouringGraph,
        exact_colourer1: ColouringNumberFinder,
        exact_colourer2: ColouringNumberFinder,
    ) -> Self {
        let depth_slots = g.n.max(1);
        Mwc {
            g,
            params,
            colourer,
            vertex_numbers_in_original_graph,
            branch_vv_bitsets: vec![Bitset::new(g.numwords); depth_slots],
            new_p_bitsets: vec![Bitset::new(g.numwords); depth_slots],
            local_searcher,
            cg,
            exact_colourer1,
            exact_colourer2,
            terminate_early: AtomicBool::new(false),
        }
    }

    fn update_incumbent_if_necessary(&self, c: &VtxList, incumbent: &mut VtxList) {
        if c.total_wt > incumbent.total_wt {
            incumbent.total_wt = c.total_wt;
            incumbent.vv = c.vv.iter().map(|&v| self.vertex_numbers_in_original_graph[v]).collect();
        }
    }

    fn expand(&mut self, c: &mut VtxList, p_bitset: &mut Bitset, search_node_count: &mut u64, incumbent: &mut VtxList) {
        *search_node_count += 1;

        if p_bitset.is_empty() {
            self.update_incumbent_if_necessary(c, incumbent);
            return;
        }

        if self.g.n > 30 {
            if *search_node_count > self.local_searcher.time() {
                self.local_searcher.search(incumbent);
            }
            if *search_node_count > self.exact_colourer1.search_node_count() * 50 {
                self.exact_colourer1.search(&self.cg, &self.terminate_early);
            }
            if let Some(colouring_num) = self.exact_colourer1.colouring_number() {
                if incumbent.vv.len() == colouring_num {
                    return;
                }
            }
            if self.exact_colourer1.colouring_number().is_some()
                && *search_node_count > self.exact_colourer2.search_node_count() * 1000
            {
                self.exact_colourer2.search(&self.cg, &self.terminate_early);
            }
            if let Some(fractional_num) = self.exact_colourer2.colouring_number() {
                if incumbent.vv.len() == fractional_num / 2 {
                    return;
                }
            }
        }

        let depth = c.vv.len();
        let mut branch_vv = std::mem::replace(&mut self.branch_vv_bitsets[depth], Bitset::new(0));
        branch_vv.clear();

        let target = incumbent.total_wt - c.total_wt;
        let must_branch = self.colourer.colouring_bound(p_bitset, &mut branch_vv, target);

        if must_branch {
            let mut new_p = std::mem::replace(&mut self.new_p_bitsets[depth], Bitset::new(0));

            p_bitset.intersect_with_complement(&branch_vv);

            while let Some(v) = branch_vv.first_set_bit() {
                branch_vv.unset_bit(v);
                p_bitset.intersection_with_complement_into(&self.g.bit_complement_nd[v], &mut new_p);
                c.push_vtx_graph(v, self.g);
                self.expand(c, &mut new_p, search_node_count, incumbent);
                p_bitset.set_bit(v);
                c.pop_vtx_graph(self.g);
            }

            self.new_p_bitsets[depth] = new_p;
        }

        self.branch_vv_bitsets[depth] = branch_vv;
    }

    pub fn run(&mut self, c: &mut VtxList, search_node_count: &mut u64, incumbent: &mut VtxList) {
        let mut p = Bitset::new(self.g.numwords);
        p.set_first_n_bits(self.g.n);
        self.expand(c, &mut p, search_node_count, incumbent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colouring::create_colourer;
    use crate::params::FileFormat;
    use crate::sparse_graph::SparseGraph;

    fn default_params() -> Params {
        Params::new(3, -1, 0, 1, false, false, FileFormat::Pace)
    }

    #[test]
    fn finds_full_clique_on_edgeless_original_graph() {
        // G has no edges on 3 vertices => H = complement(G) is a triangle;
        // the max-weight clique in H is all 3 vertices.
        let mut g = Graph::new(3);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    g.add_edge(i, j);
                }
            }
        }
        g.weight = vec![3, 4, 5];

        let colourer = create_colourer(&g, default_params());
        let sg = SparseGraph::new(3);
        let local_searcher = LocalSearcher::new(&sg);
        let cg = ColouringGraph::new(3);
        let exact_colourer1 = ColouringNumberFinder::new(&cg, 1);
        let exact_colourer2 = ColouringNumberFinder::new(&cg, 2);

        let mut mwc =
            Mwc::new(&g, default_params(), colourer, vec![0, 1, 2], local_searcher, cg, exact_colourer1, exact_colourer2);

        let mut c = VtxList::new(3);
        let mut incumbent = VtxList::new(3);
        let mut search_node_count = 0u64;
        mwc.run(&mut c, &mut search_node_count, &mut incumbent);

        assert_eq!(incumbent.total_wt, 12);
        let mut vv = incumbent.vv.clone();
        vv.sort_unstable();
        assert_eq!(vv, vec![0, 1, 2]);
    }

    #[test]
    fn finds_heaviest_singleton_when_graph_is_totally_disconnected_in_h() {
        // H has no edges at all (G is complete) => max clique in H is a
        // single vertex: the heaviest one.
        let mut g = Graph::new(3);
        g.weight = vec![3, 9, 5];

        let colourer = create_colourer(&g, default_params());
        let sg = SparseGraph::new(3);
        let local_searcher = LocalSearcher::new(&sg);
        let cg = ColouringGraph::new(3);
        let exact_colourer1 = ColouringNumberFinder::new(&cg, 1);
        let exact_colourer2 = ColouringNumberFinder::new(&cg, 2);

        let mut mwc =
            Mwc::new(&g, default_params(), colourer, vec![0, 1, 2], local_searcher, cg, exact_colourer1, exact_colourer2);

        let mut c = VtxList::new(3);
        let mut incumbent = VtxList::new(3);
        let mut search_node_count = 0u64;
        mwc.run(&mut c, &mut search_node_count, &mut incumbent);

        assert_eq!(incumbent.total_wt, 9);
        assert_eq!(incumbent.vv, vec![1]);
    }
}
