//! Smallest-last degeneracy ordering via bucketed doubly-linked lists,
//! reversed to a largest-first vertex processing order for the
//! branch-and-bound driver.

use crate::sparse_graph::SparseGraph;

/// Returns vertices in largest-first order: repeatedly peel the
/// minimum-residual-degree vertex (smallest-last ordering), then reverse.
pub fn initialise(g: &SparseGraph) -> Vec<usize> {
    if g.n == 0 {
        return Vec::new();
    }

    let n = g.n;
    let mut residual_degs: Vec<usize> = g.adjlist.iter().map(|lst| lst.len()).collect();

    // Buckets are represented as a doubly linked list over `0..2n`: indices
    // `0..n` are vertices, `n..2n` are per-degree bucket sentinels.
    let mut ll_next = vec![0usize; n * 2];
    let mut ll_prev = vec![0usize; n * 2];
    for i in 0..n {
        ll_next[n + i] = n + i;
        ll_prev[n + i] = n + i;
    }
    for i in 0..n {
        let deg = residual_degs[i];
        ll_prev[i] = n + deg;
        ll_next[i] = ll_next[n + deg];
        let next = ll_next[i];
        ll_prev[next] = i;
        ll_next[n + deg] = i;
    }

    let mut vv = Vec::with_capacity(n);
    let mut in_vv = vec![false; n];
    let mut list_idx = n - 1;

    loop {
        while ll_next[n + list_idx] >= n {
            if list_idx == 0 {
                break;
            }
            list_idx -= 1;
        }

        if list_idx == 0 {
            for v in 0..n {
                if !in_vv[v] {
                    vv.push(v);
                }
            }
            vv.reverse();
            return vv;
        }

        let v = ll_next[n + list_idx];
        vv.push(v);
        in_vv[v] = true;

        // unlink v
        let (pv, nv) = (ll_prev[v], ll_next[v]);
        ll_next[pv] = nv;
        ll_prev[nv] = pv;

        for &neighbour in &g.adjlist[v] {
            if !in_vv[neighbour] {
                let (pn, nn) = (ll_prev[neighbour], ll_next[neighbour]);
                ll_next[pn] = nn;
                ll_prev[nn] = pn;

                residual_degs[neighbour] -= 1;
                let r = residual_degs[neighbour];

                ll_prev[neighbour] = n + r;
                ll_next[neighbour] = ll_next[n + r];
                let next = ll_next[neighbour];
                ll_prev[next] = neighbour;
                ll_next[n + r] = neighbour;
            }
        }
        if list_idx < n - 1 {
            list_idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_every_vertex_exactly_once() {
        let mut g = SparseGraph::new(5);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(3, 4);
        g.add_edge(4, 0);
        let mut order = initialise(&g);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_graph_yields_empty_order() {
        let g = SparseGraph::new(0);
        assert!(initialise(&g).is_empty());
    }

    #[test]
    fn single_vertex_graph() {
        let g = SparseGraph::new(1);
        assert_eq!(initialise(&g), vec![0]);
    }

    #[test]
    fn star_graph_orders_centre_last_in_smallest_last_so_first_after_reverse() {
        // centre 0 has degree 4; leaves have degree 1. Smallest-last peels
        // leaves before the centre, so reversed order starts with the centre.
        let mut g = SparseGraph::new(5);
        for leaf in 1..5 {
            g.add_edge(0, leaf);
        }
        let order = initialise(&g);
        assert_eq!(order[0], 0);
    }
}
