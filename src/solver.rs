//! Top-level orchestration: loopy-vertex forcing, reduction fixpoint,
//! per-component branch-and-bound, and LIFO reduction unwinding.

use crate::bnb::Mwc;
use crate::colouring::create_colourer;
use crate::components::make_list_of_components;
use crate::degeneracy;
use crate::dense_graph::VtxList;
use crate::error::Result;
use crate::fractional_chromatic::{ColouringGraph, ColouringNumberFinder};
use crate::local_search::LocalSearcher;
use crate::params::Params;
use crate::reductions::{check_adj_list_integrity, reduce_to_fixpoint};
use crate::sparse_graph::SparseGraph;

pub struct SolveResult {
    pub vertex_cover: Vec<usize>,
    pub total_weight: i64,
    pub search_node_count: u64,
    pub component_sizes: Vec<usize>,
}

/// Solves one connected component, mirroring the reference's per-component
/// setup: a warm-started local searcher, the two fractional-chromatic
/// helpers, a degeneracy-reordered dense complement graph, and the
/// branch-and-bound driver over it.
fn solve_component(g: &SparseGraph, component: &[usize], params: Params) -> (Vec<usize>, u64) {
    let mut component = component.to_vec();
    component.sort_unstable();
    let subgraph = g.induced_subgraph(&component);

    let mut search_node_count = 0u64;
    let mut incumbent = VtxList::new(subgraph.n);

    let mut local_searcher = LocalSearcher::new(&subgraph);
    if subgraph.n > 30 {
        for _ in 0..10 {
            local_searcher.search(&mut incumbent);
        }
    }

    let mut cg = ColouringGraph::new(subgraph.n);
    for v in 0..subgraph.n {
        for &w in &subgraph.adjlist[v] {
            if v < w {
                cg.add_edge(v, w);
            }
        }
    }
    cg.make_adjacency_lists();

    let exact_colourer1 = ColouringNumberFinder::new(&cg, 1);
    let exact_colourer2 = ColouringNumberFinder::new(&cg, 2);

    let vv0 = degeneracy::initialise(&subgraph);
    let mut ordered_graph = subgraph.induced_subgraph(&vv0);
    ordered_graph.sort_adj_lists();

    let vv1: Vec<usize> = (0..ordered_graph.n).collect();
    let ordered_subgraph = ordered_graph.complement_of_induced_subgraph(&vv1);
    let colourer = create_colourer(&ordered_subgraph, params);

    let mut mwc =
        Mwc::new(&ordered_subgraph, params, colourer, vv0, local_searcher, cg, exact_colourer1, exact_colourer2);
    let mut c = VtxList::new(ordered_subgraph.n);
    mwc.run(&mut c, &mut search_node_count, &mut incumbent);

    let mut vtx_is_in_ind_set = vec![false; subgraph.n];
    for &v in &incumbent.vv {
        vtx_is_in_ind_set[v] = true;
    }
    let mut vertex_cover = Vec::new();
    for (i, &original_v) in component.iter().enumerate() {
        if !vtx_is_in_ind_set[i] {
            vertex_cover.push(original_v);
        }
    }
    (vertex_cover, search_node_count)
}

/// Runs the full pipeline on a parsed, unreduced graph: forces looped
/// vertices into the cover, reduces to fixpoint, solves each connected
/// component independently, then unwinds reductions in LIFO order.
///
/// The structural reductions (isolated-vertex removal, domination, folding,
/// funnel) force a fixed choice between a vertex and its neighbourhood
/// without weighing the two against each other - sound for unweighted cover
/// (the reference's only real usage, the PACE track) but not in general for
/// non-uniform weights. They only run when every live vertex carries the
/// same weight; otherwise pre-processing is skipped and the weight-aware
/// branch-and-bound driver runs directly on the untouched graph.
pub fn solve(mut g: SparseGraph, params: Params) -> Result<SolveResult> {
    let mut in_cover = g.vertex_has_loop.clone();
    let mut deleted = g.vertex_has_loop.clone();
    g.remove_edges_incident_to_loopy_vertices();

    let uniformly_weighted = g.weight.windows(2).all(|pair| pair[0] == pair[1]);
    let reductions = if uniformly_weighted {
        reduce_to_fixpoint(&mut g, &mut in_cover, &mut deleted)
    } else {
        Vec::new()
    };
    check_adj_list_integrity(&g)?;

    let components = make_list_of_components(&g);
    let component_sizes: Vec<usize> = components.iter().map(|c| c.len()).collect();

    let mut total_search_node_count = 0u64;
    for component in &components {
        if !params.quiet {
            println!("c COMPONENT {}", component.len());
        }
        let (vertex_cover_of_subgraph, search_node_count) = solve_component(&g, component, params);
        total_search_node_count += search_node_count;
        for v in vertex_cover_of_subgraph {
            in_cover[v] = true;
        }
    }

    for reduction in reductions.iter().rev() {
        reduction.unwind(&mut in_cover);
    }

    let mut vertex_cover = Vec::new();
    let mut total_weight = 0i64;
    for v in 0..g.n {
        if in_cover[v] {
            vertex_cover.push(v);
            total_weight += g.weight[v];
        }
    }

    Ok(SolveResult { vertex_cover, total_weight, search_node_count: total_search_node_count, component_sizes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FileFormat;

    fn default_params() -> Params {
        Params::new(3, -1, 0, 1, true, false, FileFormat::Pace)
    }

    #[test]
    fn triangle_needs_two_vertices_in_cover() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(0, 2);
        let result = solve(g, default_params()).unwrap();
        assert_eq!(result.vertex_cover.len(), 2);
    }

    #[test]
    fn star_graph_covers_with_just_the_centre() {
        let mut g = SparseGraph::new(5);
        for leaf in 1..5 {
            g.add_edge(0, leaf);
        }
        let result = solve(g, default_params()).unwrap();
        assert_eq!(result.vertex_cover, vec![0]);
        assert_eq!(result.total_weight, 1);
    }

    #[test]
    fn isolated_vertices_need_no_cover() {
        let g = SparseGraph::new(4);
        let result = solve(g, default_params()).unwrap();
        assert!(result.vertex_cover.is_empty());
    }

    #[test]
    fn two_disjoint_triangles_solved_as_separate_components() {
        let mut g = SparseGraph::new(6);
        for &(v, w) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
            g.add_edge(v, w);
        }
        let result = solve(g, default_params()).unwrap();
        assert_eq!(result.vertex_cover.len(), 4);
    }

    #[test]
    fn looped_vertex_is_forced_into_the_cover() {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_loop(1);
        let result = solve(g, default_params()).unwrap();
        assert!(result.vertex_cover.contains(&1));
    }

    #[test]
    fn weighted_path_picks_the_cheaper_endpoint_pair() {
        // path 0-1-2 with weights [1, 100, 1]: covering with {0,2} (weight 2)
        // beats covering with {1} (weight 100).
        let mut g = SparseGraph::new(3);
        g.weight = vec![1, 100, 1];
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let result = solve(g, default_params()).unwrap();
        assert_eq!(result.total_weight, 2);
        let mut vv = result.vertex_cover.clone();
        vv.sort_unstable();
        assert_eq!(vv, vec![0, 2]);
    }

    #[test]
    fn matches_brute_force_optimum_on_small_weighted_graphs() {
        use crate::checker::check_vertex_cover;

        // A handful of small weighted graphs (n <= 8), each checked against
        // the optimum found by exhaustively trying every subset.
        let cases: Vec<(usize, Vec<(usize, usize)>, Vec<i64>)> = vec![
            (4, vec![(0, 1), (1, 2), (2, 3), (3, 0)], vec![5, 1, 5, 1]),
            (5, vec![(0, 1), (0, 2), (0, 3), (0, 4)], vec![1, 3, 3, 3, 3]),
            (6, vec![(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)], vec![2, 2, 2, 7, 1, 7]),
            (5, vec![(0, 1), (1, 2), (2, 3), (3, 4)], vec![4, 1, 4, 1, 4]),
        ];

        for (n, edges, weight) in cases {
            let mut g = SparseGraph::new(n);
            g.weight = weight.clone();
            for &(v, w) in &edges {
                g.add_edge(v, w);
            }

            let mut best = i64::MAX;
            for mask in 0u32..(1 << n) {
                let subset: Vec<usize> = (0..n).filter(|&v| mask & (1 << v) != 0).collect();
                if check_vertex_cover(&g, &subset).is_ok() {
                    let w: i64 = subset.iter().map(|&v| weight[v]).sum();
                    best = best.min(w);
                }
            }

            let result = solve(g, default_params()).unwrap();
            assert_eq!(result.total_weight, best, "mismatch for edges {:?}", edges);
        }
    }
}
