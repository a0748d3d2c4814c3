//! Exact clique detection for graphs on at most 64 vertices.
//!
//! Complete target graphs are by far the most common case (classical Ramsey numbers), so
//! the matcher sends them here instead of the general embedding search. The search is a
//! branch-and-bound over candidate bitsets, with a greedy coloring giving an upper bound
//! for pruning (Tomita-style).

use crate::graph::{all_bits, bit, Graph, MAX_ORDER};

// ============================================================================
// CliqueOracle
// ============================================================================

/// Exact oracle for clique existence queries.
///
/// Internally reuses a stack buffer to avoid repeated allocations.
#[derive(Clone, Debug, Default)]
pub struct CliqueOracle {
    stack: Vec<usize>,
}

impl CliqueOracle {
    /// Creates a new oracle with preallocated scratch space.
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(MAX_ORDER),
        }
    }

    /// Returns `true` iff `g` contains a clique of size `k`.
    #[inline]
    pub fn has_clique_of_size(&mut self, g: &Graph, k: usize) -> bool {
        self.has_clique_within(g, k, all_bits(g.order()))
    }

    /// Returns `true` iff some `k` vertices of `candidates` are pairwise adjacent in `g`.
    pub fn has_clique_within(&mut self, g: &Graph, k: usize, candidates: u64) -> bool {
        if k == 0 {
            return true;
        }
        if k > candidates.count_ones() as usize {
            return false;
        }
        self.stack.clear();
        self.search(g.adj(), k, 0, candidates & all_bits(g.order()), None)
    }

    /// Like [`Self::has_clique_within`], writing the clique to `out` when one exists.
    pub fn find_clique_within(
        &mut self,
        g: &Graph,
        k: usize,
        candidates: u64,
        out: &mut Vec<usize>,
    ) -> bool {
        out.clear();
        if k == 0 {
            return true;
        }
        if k > candidates.count_ones() as usize {
            return false;
        }
        self.stack.clear();
        self.search(g.adj(), k, 0, candidates & all_bits(g.order()), Some(out))
    }

    /// Writes one clique of size `k` to `out` if it exists.
    pub fn find_clique_of_size(&mut self, g: &Graph, k: usize, out: &mut Vec<usize>) -> bool {
        self.find_clique_within(g, k, all_bits(g.order()), out)
    }

    fn search(
        &mut self,
        adj: &[u64],
        k: usize,
        size: usize,
        mut candidates: u64,
        mut out: Option<&mut Vec<usize>>,
    ) -> bool {
        if size >= k {
            if let Some(out) = out {
                out.clear();
                out.extend_from_slice(&self.stack);
            }
            return true;
        }

        let remaining = candidates.count_ones() as usize;
        if size + remaining < k {
            return false;
        }

        let mut order = [0usize; MAX_ORDER];
        let mut colors = [0u8; MAX_ORDER];
        let len = color_sort(adj, candidates, &mut order, &mut colors);

        for idx in (0..len).rev() {
            let color_bound = colors[idx] as usize;
            if size + color_bound < k {
                return false;
            }

            let v = order[idx];
            self.stack.push(v);
            let next_candidates = candidates & adj[v];
            if self.search(adj, k, size + 1, next_candidates, out.as_deref_mut()) {
                return true;
            }
            self.stack.pop();
            candidates &= !bit(v);
        }
        false
    }
}

// ============================================================================
// Greedy coloring for clique bound
// ============================================================================

/// Greedily colors `candidates`; `colors[i]` bounds the clique size among `order[..=i]`.
#[inline]
fn color_sort(
    adj: &[u64],
    mut candidates: u64,
    order: &mut [usize; MAX_ORDER],
    colors: &mut [u8; MAX_ORDER],
) -> usize {
    let mut len = 0usize;
    let mut color: u8 = 0;

    while candidates != 0 {
        color = color.wrapping_add(1);
        let mut available = candidates;
        while available != 0 {
            let v = available.trailing_zeros() as usize;
            let v_mask = bit(v);
            order[len] = v;
            colors[len] = color;
            len += 1;
            candidates &= !v_mask;
            available &= !v_mask;
            available &= !adj[v];
        }
    }
    len
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn is_clique(g: &Graph, subset: u64) -> bool {
        let mut t = subset;
        while t != 0 {
            let v = t.trailing_zeros() as usize;
            t &= t - 1;
            if (g.neighbors(v) & subset) != (subset & !bit(v)) {
                return false;
            }
        }
        true
    }

    fn brute_omega(g: &Graph) -> usize {
        let mut best = 0usize;
        for subset in 0..(1u64 << g.order()) {
            let sz = subset.count_ones() as usize;
            if sz > best && is_clique(g, subset) {
                best = sz;
            }
        }
        best
    }

    #[test]
    fn oracle_matches_bruteforce_small_graphs() {
        let mut rng = XorShiftRng::seed_from_u64(0xDEADBEEF);
        let mut oracle = CliqueOracle::new();
        let mut witness = Vec::new();

        for _case in 0..40 {
            let g = Graph::new_random(&mut rng, 14, 0.55);
            let omega = brute_omega(&g);
            for k in 0..=14 {
                let got = oracle.find_clique_of_size(&g, k, &mut witness);
                assert_eq!(omega >= k, got, "mismatch for k={k} omega={omega}");
                assert_eq!(got, oracle.has_clique_of_size(&g, k));
                if got {
                    assert_eq!(witness.len(), k);
                    let mask = witness.iter().fold(0u64, |m, &v| m | bit(v));
                    assert!(is_clique(&g, mask), "Witness is not a clique");
                }
            }
        }
    }

    #[test]
    fn restricted_search_ignores_outside_vertices() {
        // Triangle {0,1,2} plus an edge 3-4.
        let g = Graph::new(5, [(0, 1), (1, 2), (0, 2), (3, 4)]).unwrap();
        let mut oracle = CliqueOracle::new();
        assert!(oracle.has_clique_within(&g, 3, 0b00111));
        assert!(!oracle.has_clique_within(&g, 3, 0b11011));
        assert!(oracle.has_clique_within(&g, 2, 0b11000));
        assert!(oracle.has_clique_within(&g, 0, 0));
        assert!(!oracle.has_clique_within(&g, 1, 0));
    }

    #[test]
    fn oracle_base_cases() {
        let mut oracle = CliqueOracle::new();
        let empty = Graph::empty(10);
        assert!(oracle.has_clique_of_size(&empty, 0));
        assert!(oracle.has_clique_of_size(&empty, 1));
        assert!(!oracle.has_clique_of_size(&empty, 2));
        assert!(!oracle.has_clique_of_size(&empty, 11));
        assert!(oracle.has_clique_of_size(&Graph::complete(64), 64));
    }

    #[test]
    fn oracle_ramsey_r33_limit() {
        // C5 has neither a triangle nor an independent triple.
        let c5 = Graph::cycle(5);
        let mut oracle = CliqueOracle::new();
        assert!(!oracle.has_clique_of_size(&c5, 3));
        assert!(!oracle.has_clique_of_size(&c5.complement(), 3));
    }

    #[test]
    fn test_ramsey_r34_limit() {
        // Every 9-vertex graph has a triangle or an independent set of size 4.
        let mut rng = XorShiftRng::seed_from_u64(42);
        let mut oracle = CliqueOracle::new();

        for _ in 0..100 {
            let g = Graph::new_random(&mut rng, 9, 0.5);
            let has_k3 = oracle.has_clique_of_size(&g, 3);
            let has_is4 = oracle.has_clique_of_size(&g.complement(), 4);
            assert!(has_k3 || has_is4, "9-vertex graph without K3 and without IS4");
        }
    }
}
