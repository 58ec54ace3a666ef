//! Fractional-chromatic-number helper: an f-fold colouring CSP search used to
//! strengthen the clique bound with an auxiliary upper bound on the search
//! graph's fractional chromatic number. An edge in the `ColouringGraph` here
//! means "may share a colour class" - the same compatibility relation the
//! greedy colouring bound classes are built from.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bitset::{num_words, Bitset};

#[derive(Clone, Debug)]
pub struct ColouringGraph {
    pub n: usize,
    pub adj_matrix: Vec<Vec<bool>>,
    pub adjlist: Vec<Vec<usize>>,
    non_adj: Vec<Bitset>,
}

impl ColouringGraph {
    pub fn new(n: usize) -> Self {
        ColouringGraph {
            n,
            adj_matrix: vec![vec![false; n]; n],
            adjlist: vec![Vec::new(); n],
            non_adj: vec![Bitset::new(num_words(n)); n],
        }
    }

    pub fn add_edge(&mut self, v: usize, w: usize) {
        self.adj_matrix[v][w] = true;
        self.adj_matrix[w][v] = true;
    }

    pub fn induced_subgraph(&self, vv: &[usize]) -> ColouringGraph {
        let mut sub = ColouringGraph::new(vv.len());
        for i in 0..sub.n {
            for j in 0..i {
                if self.adj_matrix[vv[i]][vv[j]] {
                    sub.add_edge(i, j);
                }
            }
        }
        sub
    }

    /// Builds `adjlist` and the per-vertex "may-not-share-a-colour" bitsets
    /// from `adj_matrix`. Must be called before `expand()` is run.
    pub fn make_adjacency_lists(&mut self) {
        let words = num_words(self.n);
        for i in 0..self.n {
            self.adjlist[i].clear();
            let mut non_adj = Bitset::new(words);
            non_adj.set_first_n_bits(self.n);
            non_adj.unset_bit(i);
            for j in 0..self.n {
                if self.adj_matrix[i][j] {
                    self.adjlist[i].push(j);
                    non_adj.unset_bit(j);
                }
            }
            self.non_adj[i] = non_adj;
        }
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub size: usize,
    pub vtx_colour: Vec<Vec<usize>>,
}

impl Solution {
    pub fn new(n: usize, f: usize) -> Self {
        Solution { size: 0, vtx_colour: vec![vec![0; f]; n] }
    }
}

fn solution_colour_vtx(
    c: &mut Solution,
    v: usize,
    colour: usize,
    available: &mut [Bitset],
    num_assigned: &mut [usize],
    f: usize,
) {
    c.size += 1;
    c.vtx_colour[v][num_assigned[v]] = colour;
    num_assigned[v] += 1;
    available[v].unset_bit(colour);
    if num_assigned[v] == f {
        available[v].clear();
    }
}

fn copy_solution(src: &Solution, dest: &mut Solution) {
    dest.size = src.size;
    dest.vtx_colour = src.vtx_colour.clone();
}

/// Picks the vertex with the fewest available colour classes, breaking ties
/// in favour of the vertex most constraining to its (currently unassigned)
/// compatible neighbours.
fn choose_branching_vertex(g: &ColouringGraph, available: &[Bitset]) -> usize {
    let mut best_count = usize::MAX;
    let mut candidates = Vec::new();
    for i in 0..g.n {
        if available[i].is_empty() {
            continue;
        }
        let count = available[i].popcount();
        if count < best_count {
            best_count = count;
            candidates.clear();
        }
        if count == best_count {
            candidates.push(i);
        }
    }

    let mut scores = vec![0usize; candidates.len()];
    for i in 0..candidates.len() {
        let v = candidates[i];
        for j in 0..i {
            let w = candidates[j];
            if !g.adj_matrix[v][w] {
                let pc = available[v].intersection_popcount(&available[w]);
                scores[i] += pc;
                scores[j] += pc;
            }
        }
    }

    let mut best_v = candidates[0];
    let mut best_score = 0usize;
    let mut first = true;
    for (i, &v) in candidates.iter().enumerate() {
        if first || scores[i] > best_score {
            best_score = scores[i];
            best_v = v;
            first = false;
        }
    }
    best_v
}

#[allow(clippy::too_many_arguments)]
fn expand(
    g: &ColouringGraph,
    c: &mut Solution,
    incumbent: &mut Solution,
    expand_call_count: &mut u64,
    expand_call_limit: u64,
    num_colours: usize,
    available: &mut Vec<Bitset>,
    num_assigned: &mut Vec<usize>,
    f: usize,
    terminate_early: &AtomicBool,
) {
    *expand_call_count += 1;
    if *expand_call_count >= expand_call_limit {
        return;
    }
    if terminate_early.load(Ordering::Relaxed) {
        return;
    }

    if c.size == g.n * f {
        copy_solution(c, incumbent);
        return;
    }

    let c_sz_before_unit_prop = c.size;
    let mut unit_v_stack = Vec::new();
    for i in 0..g.n {
        let pc = available[i].popcount();
        let num_possible = pc + num_assigned[i];
        if pc != 0 && num_possible == f {
            unit_v_stack.push(i);
        } else if num_possible < f {
            return;
        }
    }

    while let Some(v) = unit_v_stack.pop() {
        let colour = available[v].first_set_bit().expect("unit vertex has an available colour");
        solution_colour_vtx(c, v, colour, available, num_assigned, f);
        if num_assigned[v] != f {
            unit_v_stack.push(v);
        }

        let conflicts = g.non_adj[v].clone();
        let mut wipeout = false;
        conflicts.for_each(|w| {
            if wipeout {
                return;
            }
            if available[w].test_bit(colour) {
                available[w].unset_bit(colour);
                let popcount = available[w].popcount();
                if popcount != 0 && popcount + num_assigned[w] == f {
                    unit_v_stack.push(w);
                } else if popcount + num_assigned[w] < f {
                    c.size = c_sz_before_unit_prop;
                    wipeout = true;
                }
            }
        });
        if wipeout {
            return;
        }
    }

    if c.size == g.n * f {
        copy_solution(c, incumbent);
        c.size = c_sz_before_unit_prop;
        return;
    }

    let best_v = choose_branching_vertex(g, available);

    let mut colours_in_all_domains = Bitset::new(num_words(num_colours));
    colours_in_all_domains.set_first_n_bits(num_colours);
    for i in 0..g.n {
        if !available[i].is_empty() {
            colours_in_all_domains.intersect_with(&available[i]);
        }
    }

    let mut domain_copy = available[best_v].clone();
    let conflicts = g.non_adj[best_v].clone();

    loop {
        let colour = domain_copy.first_set_bit().expect("domain must be non-empty before branching");
        domain_copy.unset_bit(colour);
        let colour_is_in_all_domains = colours_in_all_domains.test_bit(colour);

        let mut new_available = available.clone();
        let mut new_num_assigned = num_assigned.clone();

        conflicts.for_each(|w| {
            new_available[w].unset_bit(colour);
        });

        solution_colour_vtx(c, best_v, colour, &mut new_available, &mut new_num_assigned, f);
        expand(
            g,
            c,
            incumbent,
            expand_call_count,
            expand_call_limit,
            num_colours,
            &mut new_available,
            &mut new_num_assigned,
            f,
            terminate_early,
        );
        c.size -= 1;

        if incumbent.size == g.n * f || colour_is_in_all_domains || domain_copy.is_empty() {
            break;
        }
    }

    c.size = c_sz_before_unit_prop;
}

pub fn solve(
    g: &ColouringGraph,
    expand_call_count: &mut u64,
    expand_call_limit: u64,
    incumbent: &mut Solution,
    num_colours: usize,
    f: usize,
    terminate_early: &AtomicBool,
) {
    let mut c = Solution::new(g.n, f);
    let words = num_words(num_colours);
    let mut available = vec![Bitset::new(words); g.n];
    for a in available.iter_mut() {
        a.set_first_n_bits(num_colours);
    }
    let mut num_assigned = vec![0usize; g.n];
    expand(
        g,
        &mut c,
        incumbent,
        expand_call_count,
        expand_call_limit,
        num_colours,
        &mut available,
        &mut num_assigned,
        f,
        terminate_early,
    );
}

fn randomised_vertex_order(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vv: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let r = rng.gen_range(0..=i);
        vv.swap(i, r);
    }
    vv
}

/// Runs the f-fold colouring CSP to completion, growing the search-node
/// budget whenever it's exhausted before a verdict is reached at the current
/// candidate colour count.
pub fn find_colouring_number(g: &ColouringGraph, f: usize, terminate_early: &AtomicBool) -> i32 {
    let mut rng_seed = 0u64;
    let mut vv = randomised_vertex_order(g.n, rng_seed);
    let mut sorted_g = g.induced_subgraph(&vv);

    let mut expand_call_limit = 1000u64;
    let mut num_colours = 0usize;
    loop {
        let mut clq = Solution::new(g.n, f);
        sorted_g.make_adjacency_lists();

        loop {
            if terminate_early.load(Ordering::Relaxed) {
                return -1;
            }
            let mut expand_call_count = 0u64;
            solve(&sorted_g, &mut expand_call_count, expand_call_limit, &mut clq, num_colours, f, terminate_early);
            if expand_call_count < expand_call_limit {
                break;
            }
            clq.size = 0;
            expand_call_limit += expand_call_limit / 10;
            rng_seed += 1;
            vv = randomised_vertex_order(g.n, rng_seed);
            sorted_g = g.induced_subgraph(&vv);
            sorted_g.make_adjacency_lists();
        }

        if clq.size == sorted_g.n * f {
            break;
        }
        num_colours += 1;
    }
    num_colours as i32
}

/// Anytime wrapper around [`find_colouring_number`]: `search()` performs one
/// bounded attempt per call, so it can be interleaved with the
/// branch-and-bound driver's own node budget instead of blocking it.
pub struct ColouringNumberFinder {
    f: usize,
    current_target_num_colours: usize,
    rng_seed: u64,
    search_node_count: u64,
    local_search_node_limit: u64,
    colouring_number: Option<usize>,
    sorted_graph: ColouringGraph,
}

impl ColouringNumberFinder {
    pub fn new(g: &ColouringGraph, f: usize) -> Self {
        let rng_seed = 0u64;
        let vv = randomised_vertex_order(g.n, rng_seed);
        let mut sorted_graph = g.induced_subgraph(&vv);
        sorted_graph.make_adjacency_lists();
        ColouringNumberFinder {
            f,
            current_target_num_colours: 0,
            rng_seed,
            search_node_count: 0,
            local_search_node_limit: 1000,
            colouring_number: None,
            sorted_graph,
        }
    }

    pub fn search_node_count(&self) -> u64 {
        self.search_node_count
    }

    pub fn colouring_number(&self) -> Option<usize> {
        self.colouring_number
    }

    /// Runs one bounded attempt at the current target colour count, growing
    /// either the node budget or the target as appropriate.
    pub fn search(&mut self, g: &ColouringGraph, terminate_early: &AtomicBool) {
        if self.colouring_number.is_some() {
            return;
        }

        let mut clq = Solution::new(g.n, self.f);
        let mut local_count = 0u64;
        solve(
            &self.sorted_graph,
            &mut local_count,
            self.local_search_node_limit,
            &mut clq,
            self.current_target_num_colours,
            self.f,
            terminate_early,
        );
        self.search_node_count += local_count;

        if local_count >= self.local_search_node_limit {
            self.local_search_node_limit += self.local_search_node_limit / 10;
            self.rng_seed += 1;
            let vv = randomised_vertex_order(g.n, self.rng_seed);
            self.sorted_graph = g.induced_subgraph(&vv);
            self.sorted_graph.make_adjacency_lists();
        } else if clq.size == g.n * self.f {
            self.colouring_number = Some(self.current_target_num_colours);
        } else {
            self.current_target_num_colours += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_terminate() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn empty_graph_needs_one_colour_for_f_equals_one() {
        let g = ColouringGraph::new(1);
        let term = no_terminate();
        let k = find_colouring_number(&g, 1, &term);
        assert_eq!(k, 1);
    }

    #[test]
    fn triangle_with_no_compatible_edges_needs_three_colours() {
        // no edges at all => no two vertices may share a colour => chromatic
        // number of the conflict graph (complete graph on 3) is 3.
        let g = ColouringGraph::new(3);
        let term = no_terminate();
        let k = find_colouring_number(&g, 1, &term);
        assert_eq!(k, 3);
    }

    #[test]
    fn fully_compatible_graph_needs_one_colour() {
        // every pair compatible (all edges present) => one colour suffices.
        let mut g = ColouringGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(1, 2);
        let term = no_terminate();
        let k = find_colouring_number(&g, 1, &term);
        assert_eq!(k, 1);
    }

    #[test]
    fn two_fold_colouring_of_single_vertex_needs_two_colours() {
        let g = ColouringGraph::new(1);
        let term = no_terminate();
        let k = find_colouring_number(&g, 2, &term);
        assert_eq!(k, 2);
    }

    #[test]
    fn colouring_number_finder_converges_on_incremental_search() {
        let mut g = ColouringGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(1, 2);
        let mut finder = ColouringNumberFinder::new(&g, 1);
        let term = no_terminate();
        for _ in 0..20 {
            if finder.colouring_number().is_some() {
                break;
            }
            finder.search(&g, &term);
        }
        assert_eq!(finder.colouring_number(), Some(1));
    }
}
