//! Tabu-based local search: a fast incumbent booster run periodically by the
//! branch-and-bound driver on graphs large enough (`n > 30`) to benefit from
//! a warm starting bound before exact search narrows things down.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dense_graph::VtxList;
use crate::sparse_graph::SparseGraph;

/// O(1) add/remove/contains/size set of small non-negative integers, backed
/// by a swap-remove element list plus a position index.
struct FastSet {
    in_set: Vec<bool>,
    position_in_elements_list: Vec<usize>,
    elements: Vec<usize>,
}

impl FastSet {
    fn new(capacity: usize) -> Self {
        FastSet { in_set: vec![false; capacity], position_in_elements_list: vec![0; capacity], elements: Vec::new() }
    }

    fn add(&mut self, x: usize) {
        if self.in_set[x] {
            return;
        }
        self.in_set[x] = true;
        self.position_in_elements_list[x] = self.elements.len();
        self.elements.push(x);
    }

    fn remove(&mut self, x: usize) {
        if !self.in_set[x] {
            return;
        }
        let pos = self.position_in_elements_list[x];
        let last = *self.elements.last().unwrap();
        self.elements.swap(pos, self.elements.len() - 1);
        self.position_in_elements_list[last] = pos;
        self.elements.pop();
        self.in_set[x] = false;
    }

    fn size(&self) -> usize {
        self.elements.len()
    }
}

/// Maintains a maximal-ish independent set under tabu-restricted
/// swap/drop moves, periodically lifting the incumbent clique when the set
/// it holds grows past it (every vertex here has unit weight, since the
/// local search runs on the unweighted complement structure).
pub struct LocalSearcher<'g> {
    g: &'g SparseGraph,
    num_conflicts: Vec<usize>,
    set_of_vv_with_no_conflicts: FastSet,
    set_of_vv_with_one_conflict: FastSet,
    ind_set: Vec<bool>,
    ind_set_size: usize,
    tabu_duration: u64,
    time: u64,
    local_time_limit: u64,
    last_time_changed: Vec<u64>,
    rng: StdRng,
}

impl<'g> LocalSearcher<'g> {
    pub fn new(g: &'g SparseGraph) -> Self {
        let n = g.n;
        let mut set_of_vv_with_no_conflicts = FastSet::new(n);
        for i in 0..n {
            set_of_vv_with_no_conflicts.add(i);
        }
        LocalSearcher {
            g,
            num_conflicts: vec![0; n],
            set_of_vv_with_no_conflicts,
            set_of_vv_with_one_conflict: FastSet::new(n),
            ind_set: vec![false; n],
            ind_set_size: 0,
            tabu_duration: 10,
            time: 11,
            local_time_limit: 5000,
            last_time_changed: vec![0; n],
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    fn reset(&mut self) {
        for c in self.num_conflicts.iter_mut() {
            *c = 0;
        }
        for b in self.ind_set.iter_mut() {
            *b = false;
        }
        for t in self.last_time_changed.iter_mut() {
            *t = 0;
        }
        self.ind_set_size = 0;
        self.set_of_vv_with_no_conflicts = FastSet::new(self.g.n);
        self.set_of_vv_with_one_conflict = FastSet::new(self.g.n);
        for i in 0..self.g.n {
            self.set_of_vv_with_no_conflicts.add(i);
        }
    }

    fn add_to_ind_set(&mut self, v: usize) {
        self.ind_set[v] = true;
        self.ind_set_size += 1;
        for &w in &self.g.adjlist[v].clone() {
            if self.num_conflicts[w] == 0 {
                self.set_of_vv_with_no_conflicts.remove(w);
                self.set_of_vv_with_one_conflict.add(w);
            } else if self.num_conflicts[w] == 1 {
                self.set_of_vv_with_one_conflict.remove(w);
            }
            self.num_conflicts[w] += 1;
        }
    }

    fn remove_from_ind_set(&mut self, v: usize) {
        self.last_time_changed[v] = self.time;
        self.ind_set[v] = false;
        self.ind_set_size -= 1;
        for &w in &self.g.adjlist[v].clone() {
            self.num_conflicts[w] -= 1;
            if self.num_conflicts[w] == 0 {
                self.set_of_vv_with_no_conflicts.add(w);
                self.set_of_vv_with_one_conflict.remove(w);
            } else if self.num_conflicts[w] == 1 {
                self.set_of_vv_with_one_conflict.add(w);
            }
        }
    }

    fn permitted_by_tabu_rule(&self, v: usize) -> bool {
        self.time > self.last_time_changed[v] + self.tabu_duration
    }

    fn greedily_add_to_is(&mut self, incumbent: &VtxList) {
        if self.set_of_vv_with_no_conflicts.size() == self.ind_set_size {
            return;
        }

        let mut vertices_without_conflict: Vec<usize> =
            self.set_of_vv_with_no_conflicts.elements.iter().copied().filter(|&v| !self.ind_set[v]).collect();

        for i in (1..vertices_without_conflict.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            vertices_without_conflict.swap(i, j);
        }

        for v in vertices_without_conflict {
            if self.num_conflicts[v] == 0 && (self.ind_set_size >= incumbent.vv.len() || self.permitted_by_tabu_rule(v))
            {
                self.add_to_ind_set(v);
            }
        }
    }

    fn do_swap_or_deletion(&mut self) {
        let mut vertices_with_one_conflict = Vec::new();
        if self.rng.gen_range(0..=20) != 0 {
            for &v in &self.set_of_vv_with_one_conflict.elements {
                if self.permitted_by_tabu_rule(v) {
                    vertices_with_one_conflict.push(v);
                }
            }
        }

        if vertices_with_one_conflict.is_empty() {
            let vertices_in_is: Vec<usize> = (0..self.g.n).filter(|&i| self.ind_set[i]).collect();
            if !vertices_in_is.is_empty() {
                let idx = self.rng.gen_range(0..vertices_in_is.len());
                self.remove_from_ind_set(vertices_in_is[idx]);
            }
        } else {
            let idx = self.rng.gen_range(0..vertices_with_one_conflict.len());
            let v = vertices_with_one_conflict[idx];
            for w in self.g.adjlist[v].clone() {
                if self.ind_set[w] {
                    self.remove_from_ind_set(w);
                    self.add_to_ind_set(v);
                    break;
                }
            }
        }
    }

    /// Runs one bounded burst of tabu search, lifting `incumbent` whenever
    /// the independent set found beats it, then resets for the next burst.
    pub fn search(&mut self, incumbent: &mut VtxList) {
        let mut local_time = 0u64;
        let mut local_best = 0usize;
        while local_time < self.local_time_limit {
            self.greedily_add_to_is(incumbent);
            self.do_swap_or_deletion();
            self.do_swap_or_deletion();

            if self.ind_set_size > incumbent.vv.len() {
                incumbent.clear();
                for i in 0..self.g.n {
                    if self.ind_set[i] {
                        incumbent.push_vtx(i, 1);
                    }
                }
            }

            if self.ind_set_size > local_best {
                local_best = self.ind_set_size;
                local_time = 0;
            }
            local_time += 1;
            self.time += 1;
        }
        self.local_time_limit += self.local_time_limit / 1000;
        self.reset();
    }
}
