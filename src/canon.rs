//! Canonical forms and isomorphism tests.
//!
//! A graph and an edge coloring of `K_n` are both complete graphs whose vertex pairs carry
//! a small label (edge/non-edge, or color `c` as `c + 1` with `0` meaning "not colored
//! yet"). [`EdgeLabels`] exposes that view, and everything here works on it.
//!
//! The canonical code lists the labels of the pairs `(0,1), (0,2), (1,2), (0,3), ...`
//! (column by column) under the relabeling that makes this sequence lexicographically
//! smallest among all relabelings respecting an invariant vertex partition. Two inputs
//! get the same [`Signature`] iff they are isomorphic.
//!
//! ## Pruning
//! - The partition starts from label-count profiles (degrees for graphs) and is refined
//!   until stable, so only vertices in the same cell compete for a position.
//! - At each position only candidates with the smallest new column survive.
//! - A candidate is skipped when it is a twin (same label towards every other vertex) of
//!   a candidate already explored at that position.
//! - A branch whose code prefix exceeds the best code found so far is cut.

use crate::graph::{all_bits, bit, bits, Graph, MAX_ORDER};
use crate::permutation::Permutation;
use std::cmp::Ordering;

// ============================================================================
// Labelled view
// ============================================================================

/// A complete graph on `0..order()` whose pairs carry a `u8` label.
pub trait EdgeLabels {
    /// Number of vertices.
    fn order(&self) -> usize;

    /// Label of the unordered pair `{u, v}` (`u != v`). Must be symmetric.
    fn label(&self, u: usize, v: usize) -> u8;
}

impl EdgeLabels for Graph {
    fn order(&self) -> usize {
        Graph::order(self)
    }

    #[inline]
    fn label(&self, u: usize, v: usize) -> u8 {
        u8::from(self.has_edge(u, v))
    }
}

/// Isomorphism-invariant key: equal iff the labelled inputs are isomorphic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Signature {
    order: usize,
    code: Vec<u8>,
}

impl Signature {
    /// Number of vertices of the input.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Labels of all pairs in canonical column order.
    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

// ============================================================================
// Invariant partition
// ============================================================================

/// Ordered vertex partition preserved by every isomorphism.
///
/// Returns the cell of each vertex; cells are numbered `0..cells` in an order that depends
/// only on the isomorphism class. Vertices are first split by how many pairs of each
/// label they touch, then repeatedly by the multiset of `(cell, label)` towards all other
/// vertices until no cell splits.
pub fn invariant_partition<G: EdgeLabels + ?Sized>(g: &G) -> Vec<usize> {
    let n = g.order();
    let mut cell = vec![0usize; n];
    let mut cells = usize::from(n > 0);

    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..n)
            .map(|v| {
                let mut profile: Vec<(usize, u8)> = (0..n)
                    .filter(|&w| w != v)
                    .map(|w| (cell[w], g.label(v, w)))
                    .collect();
                profile.sort_unstable();
                (cell[v], profile)
            })
            .collect();

        let mut distinct: Vec<&(usize, Vec<(usize, u8)>)> = keys.iter().collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() == cells {
            return cell;
        }
        cells = distinct.len();

        for (v, key) in keys.iter().enumerate() {
            cell[v] = match distinct.binary_search(&key) {
                Ok(i) | Err(i) => i,
            };
        }
    }
}

// ============================================================================
// Canonical labeling
// ============================================================================

struct Labeler<'a, G: ?Sized> {
    g: &'a G,
    cell: Vec<usize>,
    /// Cell owning each canonical position.
    slot_cell: Vec<usize>,
    placed: Vec<usize>,
    used: u64,
    code: Vec<u8>,
    best: Option<(Vec<u8>, Vec<usize>)>,
    improvements: usize,
}

impl<G: EdgeLabels + ?Sized> Labeler<'_, G> {
    fn are_twins(&self, u: usize, v: usize) -> bool {
        (0..self.g.order())
            .filter(|&w| w != u && w != v)
            .all(|w| self.g.label(u, w) == self.g.label(v, w))
    }

    /// `improving` means the current code prefix is strictly below the best one (or no
    /// best exists yet), so comparisons can be skipped.
    fn descend(&mut self, mut improving: bool) {
        let p = self.placed.len();
        if p == self.slot_cell.len() {
            if improving {
                self.best = Some((self.code.clone(), self.placed.clone()));
                self.improvements += 1;
            }
            return;
        }

        let target = self.slot_cell[p];
        let mut column: Vec<u8> = Vec::with_capacity(p);
        let mut min_column: Option<Vec<u8>> = None;
        let mut keep: Vec<usize> = Vec::new();
        for v in (0..self.g.order()).filter(|&v| self.used & bit(v) == 0 && self.cell[v] == target) {
            column.clear();
            column.extend(self.placed.iter().map(|&w| self.g.label(w, v)));
            match min_column.as_deref().map(|m| column.as_slice().cmp(m)) {
                None | Some(Ordering::Less) => {
                    min_column = Some(column.clone());
                    keep.clear();
                    keep.push(v);
                }
                Some(Ordering::Equal) => keep.push(v),
                Some(Ordering::Greater) => {}
            }
        }
        let Some(column) = min_column else {
            return;
        };

        let start = self.code.len();
        if !improving {
            if let Some((best, _)) = &self.best {
                match column.as_slice().cmp(&best[start..start + p]) {
                    Ordering::Greater => return,
                    Ordering::Less => improving = true,
                    Ordering::Equal => {}
                }
            }
        }

        self.code.extend_from_slice(&column);
        let mut explored: Vec<usize> = Vec::with_capacity(keep.len());
        for v in keep {
            if explored.iter().any(|&u| self.are_twins(u, v)) {
                continue;
            }
            explored.push(v);

            let seen = self.improvements;
            self.placed.push(v);
            self.used |= bit(v);
            self.descend(improving);
            self.placed.pop();
            self.used &= !bit(v);

            // The new best shares our prefix, so later siblings must compare again.
            if self.improvements != seen {
                improving = false;
            }
        }
        self.code.truncate(start);
    }
}

/// Canonical signature and the relabeling that produces it.
///
/// The permutation sends each vertex to its canonical position.
///
/// # Panics
/// Panics in debug builds if `g.order() > 64`.
pub fn canonical_labeling<G: EdgeLabels + ?Sized>(g: &G) -> (Signature, Permutation) {
    let n = g.order();
    debug_assert!(n <= MAX_ORDER, "This implementation assumes n <= 64");

    let cell = invariant_partition(g);
    let mut slot_cell = cell.clone();
    slot_cell.sort_unstable();

    let mut labeler = Labeler {
        g,
        cell,
        slot_cell,
        placed: Vec::with_capacity(n),
        used: 0,
        code: Vec::with_capacity(n * n.saturating_sub(1) / 2),
        best: None,
        improvements: 0,
    };
    labeler.descend(true);

    let (code, placed) = labeler.best.unwrap_or_default();
    let mut images = vec![0usize; n];
    for (slot, &v) in placed.iter().enumerate() {
        images[v] = slot;
    }
    (
        Signature { order: n, code },
        Permutation::from_images_unchecked(images),
    )
}

/// Isomorphism-invariant signature of `g`.
pub fn canonical_signature<G: EdgeLabels + ?Sized>(g: &G) -> Signature {
    canonical_labeling(g).0
}

/// Canonical representative of `g`'s isomorphism class, with the relabeling used.
///
/// `canonical_form(g).0 == g.permute(&canonical_form(g).1)`.
pub fn canonical_form(g: &Graph) -> (Graph, Permutation) {
    let (_, perm) = canonical_labeling(g);
    (g.permute(&perm), perm)
}

// ============================================================================
// Direct matching
// ============================================================================

/// Backtracking vertex mapper from `pattern` into `host`.
///
/// In exact mode it looks for an isomorphism (edges and non-edges preserved); otherwise for
/// an injective map sending every pattern edge to a host edge.
struct Mapper<'a> {
    pattern: &'a Graph,
    host: &'a Graph,
    exact: bool,
    order: Vec<usize>,
    image: Vec<usize>,
    used: u64,
}

impl<'a> Mapper<'a> {
    fn new(pattern: &'a Graph, host: &'a Graph, exact: bool) -> Self {
        Self {
            pattern,
            host,
            exact,
            order: search_order(pattern),
            image: vec![usize::MAX; pattern.order()],
            used: 0,
        }
    }

    fn run(mut self) -> Option<Vec<usize>> {
        if self.pattern.order() > self.host.order() {
            return None;
        }
        self.extend(0).then_some(self.image)
    }

    fn extend(&mut self, i: usize) -> bool {
        let Some(&a) = self.order.get(i) else {
            return true;
        };
        let need = self.pattern.degree(a);

        let mut cands = all_bits(self.host.order()) & !self.used;
        for &a2 in &self.order[..i] {
            let b2 = self.image[a2];
            if self.pattern.has_edge(a, a2) {
                cands &= self.host.neighbors(b2);
            } else if self.exact {
                cands &= !self.host.neighbors(b2);
            }
        }

        for b in bits(cands) {
            let have = self.host.degree(b);
            if (self.exact && have != need) || have < need {
                continue;
            }
            self.image[a] = b;
            self.used |= bit(b);
            if self.extend(i + 1) {
                return true;
            }
            self.used &= !bit(b);
        }
        self.image[a] = usize::MAX;
        false
    }
}

/// Pattern vertices ordered so each one has as many already-placed neighbors as possible.
fn search_order(pattern: &Graph) -> Vec<usize> {
    let n = pattern.order();
    let mut order = Vec::with_capacity(n);
    let mut chosen = 0u64;
    while let Some(v) = bits(all_bits(n) & !chosen).max_by_key(|&v| {
        (
            (pattern.neighbors(v) & chosen).count_ones(),
            pattern.degree(v),
            std::cmp::Reverse(v),
        )
    }) {
        order.push(v);
        chosen |= bit(v);
    }
    order
}

/// Finds an isomorphism from `g1` to `g2`, as the image of each `g1` vertex.
///
/// Order, edge count and degree sequence are compared before any mapping is attempted.
pub fn find_isomorphism(g1: &Graph, g2: &Graph) -> Option<Permutation> {
    if g1.order() != g2.order() || g1.edge_count() != g2.edge_count() {
        return None;
    }
    if g1.degree_sequence() != g2.degree_sequence() {
        return None;
    }
    Mapper::new(g1, g2, true)
        .run()
        .map(Permutation::from_images_unchecked)
}

/// Whether `g1` and `g2` are isomorphic.
pub fn is_isomorphic(g1: &Graph, g2: &Graph) -> bool {
    find_isomorphism(g1, g2).is_some()
}

/// Injective map of `pattern` into `host` sending edges to edges (not necessarily induced).
///
/// Returns the host vertex chosen for each pattern vertex.
pub(crate) fn find_embedding(pattern: &Graph, host: &Graph) -> Option<Vec<usize>> {
    if pattern.edge_count() > host.edge_count() {
        return None;
    }
    Mapper::new(pattern, host, false).run()
}

// ============================================================================
// Tests
// ============================================================================
