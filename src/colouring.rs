//! Weighted greedy colouring with an optional MAX-SAT-style unit-propagation
//! refinement: the pruning oracle the branch-and-bound driver consults at
//! every node. Three variants, selected by `Params::colouring_variant`.

use crate::bitset::Bitset;
use crate::dense_graph::Graph;
use crate::params::Params;

#[derive(Clone, Debug, Default)]
pub struct Clause {
    pub vv: Vec<usize>,
    pub weight: i64,
    pub remaining_wt: i64,
    pub sorting_score: i64,
}

#[derive(Debug)]
pub struct ListOfClauses {
    pub clauses: Vec<Clause>,
    pub size: usize,
}

impl ListOfClauses {
    pub fn new(capacity: usize) -> Self {
        ListOfClauses { clauses: vec![Clause::default(); capacity], size: 0 }
    }

    pub fn clear(&mut self) {
        self.size = 0;
    }
}

struct FastIntQueue {
    vals: Vec<usize>,
    start: usize,
    end: usize,
}

impl FastIntQueue {
    fn new(capacity: usize) -> Self {
        FastIntQueue { vals: vec![0; capacity], start: 0, end: 0 }
    }

    fn enqueue(&mut self, val: usize) {
        self.vals[self.end] = val;
        self.end += 1;
    }

    fn dequeue(&mut self) -> usize {
        let v = self.vals[self.start];
        self.start += 1;
        v
    }

    fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

struct IntStackWithoutDups {
    vals: Vec<usize>,
    on_stack: Vec<bool>,
}

impl IntStackWithoutDups {
    fn new(max_size: usize) -> Self {
        IntStackWithoutDups { vals: Vec::with_capacity(max_size), on_stack: vec![false; max_size] }
    }

    fn push(&mut self, val: usize) {
        if !self.on_stack[val] {
            self.vals.push(val);
            self.on_stack[val] = true;
        }
    }

    fn clear(&mut self) {
        for &v in &self.vals {
            self.on_stack[v] = false;
        }
        self.vals.clear();
    }

    fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }
}

/// Derives inconsistent sets of clauses by assuming a clause false and
/// propagating unit consequences through the complement-neighbourhood
/// structure, in the style of unit propagation over a MAX-SAT encoding of
/// the colour classes.
pub struct UnitPropagator<'g> {
    g: &'g Graph,
    params: Params,
    q: FastIntQueue,
    i_stack: IntStackWithoutDups,
    iset: IntStackWithoutDups,
    cm: Vec<Vec<usize>>,
    vv_count: Vec<usize>,
    remaining_vv_count: Vec<usize>,
    vertex_has_been_propagated: Vec<bool>,
    reason: Vec<Option<usize>>,
}

impl<'g> UnitPropagator<'g> {
    pub fn new(g: &'g Graph, params: Params) -> Self {
        UnitPropagator {
            g,
            params,
            q: FastIntQueue::new(g.n),
            i_stack: IntStackWithoutDups::new(g.n),
            iset: IntStackWithoutDups::new(g.n),
            cm: vec![Vec::new(); g.n],
            vv_count: vec![0; g.n],
            remaining_vv_count: vec![0; g.n],
            vertex_has_been_propagated: vec![false; g.n],
            reason: vec![None; g.n],
        }
    }

    fn get_unique_remaining_vtx(&self, c: &Clause) -> usize {
        for &v in &c.vv {
            if self.reason[v].is_none() {
                return v;
            }
        }
        unreachable!("clause must have exactly one unreasoned vertex")
    }

    fn create_inconsistent_set(&mut self, c_idx: usize, cc: &ListOfClauses) {
        self.i_stack.push(c_idx);
        let mut j = 0;
        while j != self.i_stack.vals.len() {
            let clause_idx = self.i_stack.vals[j];
            for &w in &cc.clauses[clause_idx].vv {
                if let Some(r) = self.reason[w] {
                    if !self.i_stack.on_stack[r] {
                        self.i_stack.push(r);
                    }
                }
            }
            j += 1;
        }
    }

    fn propagate_vertex(&mut self, cc: &ListOfClauses, v: usize, u_idx: usize, p_bitset: &Bitset) -> bool {
        let mut found_inconsistency = false;
        let candidates = self.g.bit_complement_nd[v].clone();
        let mut masked = Bitset::new(p_bitset.num_words());
        candidates.intersection_into(p_bitset, &mut masked);
        masked.for_each(|w| {
            if found_inconsistency {
                return;
            }
            if self.reason[w].is_none() {
                self.reason[w] = Some(u_idx);
                for &c_idx in &self.cm[w].clone() {
                    self.remaining_vv_count[c_idx] -= 1;
                    if self.remaining_vv_count[c_idx] == 1 {
                        self.q.enqueue(c_idx);
                    } else if self.remaining_vv_count[c_idx] == 0 {
                        self.create_inconsistent_set(c_idx, cc);
                        found_inconsistency = true;
                    }
                }
            }
        });
        found_inconsistency
    }

    fn unit_propagate_once(&mut self, cc: &ListOfClauses, first_clause_index: usize, first_v: usize, p_bitset: &Bitset) {
        self.i_stack.clear();
        self.q.clear();

        self.remaining_vv_count.copy_from_slice(&self.vv_count);
        for p in self.vertex_has_been_propagated.iter_mut() {
            *p = false;
        }
        for r in self.reason.iter_mut() {
            *r = None;
        }

        if self.propagate_vertex(cc, first_v, first_clause_index, p_bitset) {
            return;
        }
        self.vertex_has_been_propagated[first_v] = true;

        while !self.q.is_empty() {
            let u_idx = self.q.dequeue();
            debug_assert_eq!(self.remaining_vv_count[u_idx], 1);
            let v = self.get_unique_remaining_vtx(&cc.clauses[u_idx]);
            if !self.vertex_has_been_propagated[v] {
                if self.propagate_vertex(cc, v, u_idx, p_bitset) {
                    return;
                }
                self.vertex_has_been_propagated[v] = true;
            }
        }
    }

    fn remove_from_clause_membership(&mut self, v: usize, clause_idx: usize) {
        let pos = self.cm[v].iter().position(|&c| c == clause_idx).expect("membership must exist");
        self.cm[v].remove(pos);
    }

    fn process_inconsistent_set(&mut self, cc: &mut ListOfClauses) -> i64 {
        debug_assert!(!self.iset.vals.is_empty());

        let mut max_idx = self.iset.vals[0];
        let mut min_wt = cc.clauses[max_idx].remaining_wt;
        for &c_idx in &self.iset.vals[1..] {
            let wt = cc.clauses[c_idx].remaining_wt;
            if wt < min_wt {
                min_wt = wt;
            }
            if c_idx > max_idx {
                max_idx = c_idx;
            }
        }

        for &c_idx in &self.iset.vals.clone() {
            cc.clauses[c_idx].remaining_wt -= min_wt;
            if cc.clauses[c_idx].remaining_wt == 0 {
                let vv = cc.clauses[c_idx].vv.clone();
                for v in vv {
                    self.remove_from_clause_membership(v, c_idx);
                }
            }
        }
        cc.clauses[max_idx].weight -= min_wt;
        min_wt
    }

    fn get_max_clause_size(&self, cc: &ListOfClauses) -> usize {
        cc.clauses[..cc.size].iter().map(|c| c.vv.len()).max().unwrap_or(0)
    }

    /// Runs propagation over all clause sizes from 1 up (capped by
    /// `params.max_sat_level` if set), returning the total weight reduction
    /// achieved. Stops as soon as `improvement >= target_reduction`.
    pub fn unit_propagate(&mut self, cc: &mut ListOfClauses, target_reduction: i64, p_bitset: &Bitset) -> i64 {
        if target_reduction <= 0 {
            return 0;
        }

        for v in self.cm.iter_mut() {
            v.clear();
        }
        for i in 0..cc.size {
            self.vv_count[i] = cc.clauses[i].vv.len();
            for &v in &cc.clauses[i].vv {
                self.cm[v].push(i);
            }
        }
        for i in 0..cc.size {
            cc.clauses[i].remaining_wt = cc.clauses[i].weight;
        }

        let mut improvement = 0i64;
        let max_clause_size = if self.params.max_sat_level == -1 {
            self.get_max_clause_size(cc)
        } else {
            self.params.max_sat_level as usize
        };

        for clause_size in 1..=max_clause_size {
            for i in 0..cc.size {
                if cc.clauses[i].vv.len() != clause_size {
                    continue;
                }
                loop {
                    if cc.clauses[i].remaining_wt == 0 {
                        break;
                    }

                    self.iset.clear();
                    let vv = cc.clauses[i].vv.clone();
                    let mut broke = false;
                    for &v in &vv {
                        self.unit_propagate_once(cc, i, v, p_bitset);
                        if self.i_stack.vals.is_empty() {
                            self.iset.clear();
                            broke = true;
                            break;
                        }
                        for &clause_idx in &self.i_stack.vals {
                            self.iset.push(clause_idx);
                        }
                    }
                    if broke || self.iset.is_empty() {
                        break;
                    }

                    improvement += self.process_inconsistent_set(cc);

                    if improvement >= target_reduction {
                        return improvement;
                    }
                }
            }
        }

        improvement
    }

    /// Restricted propagation over size-1 clauses only, returning the index
    /// of the first clause whose cumulative bound exceeds `target`, or
    /// `cc.size` if the target is never exceeded. Used by the 2-colouring
    /// fractional-chromatic helper.
    pub fn unit_propagate_m1(
        &mut self,
        cc: &mut ListOfClauses,
        target_reduction: i64,
        target: i64,
        p_bitset: &Bitset,
    ) -> usize {
        if target_reduction <= 0 {
            return cc.size;
        }

        for v in self.cm.iter_mut() {
            v.clear();
        }
        for i in 0..cc.size {
            self.vv_count[i] = cc.clauses[i].vv.len();
            for &v in &cc.clauses[i].vv {
                self.cm[v].push(i);
            }
        }
        for i in 0..cc.size {
            cc.clauses[i].remaining_wt = cc.clauses[i].weight;
        }

        let mut improvement = 0i64;
        let mut bound = 0i64;

        for i in 0..cc.size {
            if cc.clauses[i].vv.len() == 1 {
                loop {
                    if cc.clauses[i].remaining_wt == 0 {
                        break;
                    }
                    let v = cc.clauses[i].vv[0];
                    self.unit_propagate_once(cc, i, v, p_bitset);
                    if self.i_stack.is_empty() {
                        break;
                    }
                    std::mem::swap(&mut self.iset, &mut self.i_stack);
                    improvement += self.process_inconsistent_set(cc);
                    if improvement >= target_reduction {
                        return cc.size;
                    }
                }
            }

            bound += cc.clauses[i].weight;
            if bound > target {
                return i;
            }
        }

        cc.size
    }
}

/// Shared contract: given a candidate set `p_bitset` and a `target` residual
/// budget, either prove the budget can't be exceeded (return `false`, prune)
/// or fill `branch_vv_bitset` with vertices that must be branched on.
pub trait Colourer {
    fn colouring_bound(&mut self, p_bitset: &Bitset, branch_vv_bitset: &mut Bitset, target: i64) -> bool;
}

fn greedy_weighted_colour_classes(
    g: &Graph,
    p_bitset: &Bitset,
    cc: &mut ListOfClauses,
    residual_wt: &mut [i64],
) -> i64 {
    let mut to_colour = Bitset::new(g.numwords);
    to_colour.copy_from(p_bitset);
    residual_wt.copy_from_slice(&g.weight);
    cc.clear();

    let mut bound = 0i64;
    let mut candidates = Bitset::new(g.numwords);
    while let Some(v) = to_colour.first_set_bit() {
        let clause = &mut cc.clauses[cc.size];
        clause.vv.clear();
        clause.vv.push(v);
        let mut class_min_wt = residual_wt[v];
        to_colour.intersection_into(&g.bit_complement_nd[v], &mut candidates);
        while let Some(w) = candidates.first_set_bit() {
            if residual_wt[w] < class_min_wt {
                class_min_wt = residual_wt[w];
            }
            clause.vv.push(w);
            candidates.intersect_with(&g.bit_complement_nd[w]);
        }
        for &w in &clause.vv {
            residual_wt[w] -= class_min_wt;
            if residual_wt[w] == 0 {
                to_colour.unset_bit(w);
            }
        }
        bound += class_min_wt;
        clause.weight = class_min_wt;
        cc.size += 1;
    }
    bound
}

/// Variant 0: greedy colouring only, no unit propagation; early-exits the
/// moment the running bound crosses `target`.
pub struct EvenSimplerColourer<'g> {
    g: &'g Graph,
}

impl<'g> EvenSimplerColourer<'g> {
    pub fn new(g: &'g Graph, _params: Params) -> Self {
        EvenSimplerColourer { g }
    }
}

impl<'g> Colourer for EvenSimplerColourer<'g> {
    fn colouring_bound(&mut self, p_bitset: &Bitset, branch_vv_bitset: &mut Bitset, target: i64) -> bool {
        branch_vv_bitset.copy_from(p_bitset);
        let mut residual_wt = self.g.weight.clone();
        let mut candidates = Bitset::new(self.g.numwords);
        let mut col_class = Vec::new();

        let mut bound = 0i64;
        while let Some(v) = branch_vv_bitset.first_set_bit() {
            let mut class_min_wt = residual_wt[v];
            col_class.clear();
            col_class.push(v);
            branch_vv_bitset.intersection_into(&self.g.bit_complement_nd[v], &mut candidates);
            while let Some(w) = candidates.first_set_bit() {
                if residual_wt[w] < class_min_wt {
                    class_min_wt = residual_wt[w];
                }
                col_class.push(w);
                candidates.intersect_with(&self.g.bit_complement_nd[w]);
            }
            bound += class_min_wt;
            if bound > target {
                return true;
            }
            for &w in &col_class {
                residual_wt[w] -= class_min_wt;
                if residual_wt[w] == 0 {
                    branch_vv_bitset.unset_bit(w);
                }
            }
        }
        false
    }
}

/// Variant 2: greedy colouring plus unit propagation, without class
/// enlargement.
pub struct UnitPropColourer<'g> {
    g: &'g Graph,
    unit_propagator: UnitPropagator<'g>,
    cc: ListOfClauses,
    residual_wt: Vec<i64>,
}

impl<'g> UnitPropColourer<'g> {
    pub fn new(g: &'g Graph, params: Params) -> Self {
        UnitPropColourer {
            g,
            unit_propagator: UnitPropagator::new(g, params),
            cc: ListOfClauses::new(g.n),
            residual_wt: vec![0; g.n],
        }
    }
}

impl<'g> Colourer for UnitPropColourer<'g> {
    fn colouring_bound(&mut self, p_bitset: &Bitset, branch_vv_bitset: &mut Bitset, target: i64) -> bool {
        let bound = greedy_weighted_colour_classes(self.g, p_bitset, &mut self.cc, &mut self.residual_wt);

        let improvement = self.unit_propagator.unit_propagate(&mut self.cc, bound - target, p_bitset);
        let proved_we_can_prune = bound - improvement <= target;

        if !proved_we_can_prune {
            branch_vv_bitset.clear();
            let mut running = 0i64;
            for i in 0..self.cc.size {
                debug_assert!(self.cc.clauses[i].weight >= 0);
                running += self.cc.clauses[i].weight;
                if running > target {
                    for &w in &self.cc.clauses[i].vv {
                        branch_vv_bitset.set_bit(w);
                    }
                }
            }
        }
        !proved_we_can_prune
    }
}

/// Variant 3 (default): greedy colouring with class enlargement, plus unit
/// propagation. The strongest and most expensive bound.
pub struct ClassEnlargingUnitPropColourer<'g> {
    g: &'g Graph,
    unit_propagator: UnitPropagator<'g>,
    cc: ListOfClauses,
    residual_wt: Vec<i64>,
}

impl<'g> ClassEnlargingUnitPropColourer<'g> {
    pub fn new(g: &'g Graph, params: Params) -> Self {
        ClassEnlargingUnitPropColourer {
            g,
            unit_propagator: UnitPropagator::new(g, params),
            cc: ListOfClauses::new(g.n),
            residual_wt: vec![0; g.n],
        }
    }

    /// Looks for a non-adjacent pair among the leftover candidates and swaps
    /// the clause's last member for both, growing the class by one.
    fn try_to_enlarge_clause(&self, clause: &mut Clause, candidates: &Bitset) {
        let vv: Vec<usize> = candidates.iter().collect();
        let sz = vv.len() as i64;
        if sz < 2 {
            return;
        }
        for sum in 0..=(sz * 2 - 3) {
            let i_start = (sum - sz + 1).max(0);
            let mut i = i_start;
            let mut j = sum - i_start;
            while i < j {
                let w = vv[i as usize];
                let u = vv[j as usize];
                if self.g.bit_complement_nd[w].test_bit(u) {
                    clause.vv.pop();
                    clause.vv.push(w);
                    clause.vv.push(u);
                    return;
                }
                i += 1;
                j -= 1;
            }
        }
    }
}

impl<'g> Colourer for ClassEnlargingUnitPropColourer<'g> {
    fn colouring_bound(&mut self, p_bitset: &Bitset, branch_vv_bitset: &mut Bitset, target: i64) -> bool {
        let mut to_colour = Bitset::new(self.g.numwords);
        to_colour.copy_from(p_bitset);
        self.residual_wt.copy_from_slice(&self.g.weight);
        self.cc.clear();

        let mut bound = 0i64;
        let mut cur_candidates = Bitset::new(self.g.numwords);
        let mut next_candidates = Bitset::new(self.g.numwords);
        while let Some(v) = to_colour.first_set_bit() {
            let mut vv = vec![v];
            to_colour.intersection_into(&self.g.bit_complement_nd[v], &mut cur_candidates);
            let mut last_w = v;
            while let Some(w) = cur_candidates.first_set_bit() {
                vv.push(w);
                cur_candidates.intersection_into(&self.g.bit_complement_nd[w], &mut next_candidates);
                std::mem::swap(&mut cur_candidates, &mut next_candidates);
                last_w = w;
            }

            let mut clause = Clause { vv, weight: 0, remaining_wt: 0, sorting_score: 0 };
            if clause.vv.len() > 1 {
                // cur_candidates is now empty (loop only stopped because it ran
                // dry); next_candidates holds the pool from the second-to-last
                // step, still including last_w, the class's final member.
                next_candidates.unset_bit(last_w);
                self.try_to_enlarge_clause(&mut clause, &next_candidates);
            }

            let mut class_min_wt = self.residual_wt[clause.vv[0]];
            for &w in &clause.vv[1..] {
                if self.residual_wt[w] < class_min_wt {
                    class_min_wt = self.residual_wt[w];
                }
            }
            for &w in &clause.vv {
                self.residual_wt[w] -= class_min_wt;
                if self.residual_wt[w] <= 0 {
                    to_colour.unset_bit(w);
                }
            }
            bound += class_min_wt;
            clause.weight = class_min_wt;
            self.cc.clauses[self.cc.size] = clause;
            self.cc.size += 1;
        }

        for i in 0..self.cc.size {
            self.cc.clauses[i].sorting_score = ((self.cc.clauses[i].vv.len() as i64) << 32) - i as i64;
        }
        self.cc.clauses[..self.cc.size].sort_by(|a, b| b.sorting_score.cmp(&a.sorting_score));

        let improvement = self.unit_propagator.unit_propagate(&mut self.cc, bound - target, p_bitset);
        let proved_we_can_prune = bound - improvement <= target;

        if !proved_we_can_prune {
            branch_vv_bitset.clear();
            let mut running = 0i64;
            for i in 0..self.cc.size {
                debug_assert!(self.cc.clauses[i].weight >= 0);
                running += self.cc.clauses[i].weight;
                if running > target {
                    for &w in &self.cc.clauses[i].vv {
                        branch_vv_bitset.set_bit(w);
                    }
                }
            }
        }
        !proved_we_can_prune
    }
}

pub fn create_colourer<'g>(g: &'g Graph, params: Params) -> Box<dyn Colourer + 'g> {
    match params.colouring_variant {
        2 => Box::new(UnitPropColourer::new(g, params)),
        3 => Box::new(ClassEnlargingUnitPropColourer::new(g, params)),
        _ => Box::new(EvenSimplerColourer::new(g, params)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FileFormat;

    fn params(variant: i32) -> Params {
        Params::new(variant, -1, 0, 1, false, false, FileFormat::Pace)
    }

    fn full_p(g: &Graph) -> Bitset {
        let mut p = Bitset::new(g.numwords);
        p.set_first_n_bits(g.n);
        p
    }

    #[test]
    fn even_simpler_colourer_bounds_empty_graph_by_sum_of_weights() {
        // no edges: every vertex is its own colour class... actually no edges
        // means everything is mutually non-adjacent, so ALL vertices form a
        // single clash-free class in the complement-of-complement sense:
        // they all go in one clause, bound = min weight.
        let mut g = Graph::new(3);
        g.weight = vec![5, 5, 5];
        let p = full_p(&g);
        let mut colourer = EvenSimplerColourer::new(&g, params(0));
        let mut branch = Bitset::new(g.numwords);
        let must_branch = colourer.colouring_bound(&p, &mut branch, 100);
        assert!(!must_branch);
    }

    #[test]
    fn even_simpler_colourer_forces_branch_when_target_too_low() {
        let mut g = Graph::new(3);
        g.weight = vec![5, 5, 5];
        let p = full_p(&g);
        let mut colourer = EvenSimplerColourer::new(&g, params(0));
        let mut branch = Bitset::new(g.numwords);
        let must_branch = colourer.colouring_bound(&p, &mut branch, 2);
        assert!(must_branch);
    }

    #[test]
    fn unit_prop_colourer_forces_branch_on_two_incompatible_pairs() {
        // 0-1 and 2-3 are edges in the original graph, so they can't share a
        // colour class: the greedy bound needs (at least) two classes.
        let mut g = Graph::new(4);
        g.weight = vec![1, 1, 1, 1];
        g.add_edge(0, 1);
        g.add_edge(2, 3);
        let p = full_p(&g);
        let mut colourer = UnitPropColourer::new(&g, params(2));
        let mut branch = Bitset::new(g.numwords);
        let must_branch = colourer.colouring_bound(&p, &mut branch, -100);
        assert!(must_branch);
    }

    #[test]
    fn class_enlarging_colourer_runs_on_small_graph() {
        let mut g = Graph::new(4);
        g.weight = vec![2, 2, 2, 2];
        // make 0,1 actually adjacent (non-conflicting in complement sense)
        g.add_edge(0, 1);
        let p = full_p(&g);
        let mut colourer = ClassEnlargingUnitPropColourer::new(&g, params(3));
        let mut branch = Bitset::new(g.numwords);
        let must_branch = colourer.colouring_bound(&p, &mut branch, 100);
        assert!(!must_branch);
    }

    #[test]
    fn create_colourer_dispatches_by_variant() {
        let g = Graph::new(2);
        let _ = create_colourer(&g, params(0));
        let _ = create_colourer(&g, params(2));
        let _ = create_colourer(&g, params(3));
    }
}
