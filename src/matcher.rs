//! Acceptance checks for a single color class.
//!
//! A class is rejected either because it contains a forbidden target graph as a (not
//! necessarily induced) subgraph, or because too many of its connected components are
//! large. Both checks come in a full form and an incremental form that assumes the class
//! was acceptable before the edge `(u, v)` was added.

use crate::canon::find_embedding;
use crate::clique::CliqueOracle;
use crate::graph::{bit, bits, Graph};
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Forbidden subgraphs
// ============================================================================

/// Whether `host` contains a subgraph isomorphic to `target` (non-induced).
pub fn contains_forbidden(host: &Graph, target: &Graph) -> bool {
    locate(host, target, None).is_some()
}

/// Like [`contains_forbidden`], but returns the host vertex used for each target vertex.
pub fn find_forbidden(host: &Graph, target: &Graph) -> Option<Vec<usize>> {
    locate(host, target, None)
}

/// Whether `host` contains a copy of `target` on a vertex set that includes `u` and `v`.
///
/// If `host` minus the edge `(u, v)` is target-free, this equals [`contains_forbidden`]
/// while only looking at vertex sets that the new edge can complete.
pub fn contains_forbidden_through(host: &Graph, target: &Graph, u: usize, v: usize) -> bool {
    locate(host, target, Some((u, v))).is_some()
}

fn locate(host: &Graph, target: &Graph, through: Option<(usize, usize)>) -> Option<Vec<usize>> {
    let t = target.order();
    if t > host.order() || target.edge_count() > host.edge_count() {
        return None;
    }
    if !degrees_dominate(host, target) {
        return None;
    }
    // A target without room for both endpoints is unaffected by the new edge.
    let through = through.filter(|_| t >= 2);

    if target.is_complete() {
        let mut oracle = CliqueOracle::new();
        let mut out = Vec::with_capacity(t);
        return match through {
            Some((u, v)) => {
                if !host.has_edge(u, v) {
                    return None;
                }
                let common = host.neighbors(u) & host.neighbors(v);
                oracle.find_clique_within(host, t - 2, common, &mut out).then(|| {
                    out.insert(0, v);
                    out.insert(0, u);
                    out
                })
            }
            None => oracle.find_clique_of_size(host, t, &mut out).then_some(out),
        };
    }

    let min_degree = target.degree_sequence().first().copied().unwrap_or(0);
    let fixed: Vec<usize> = match through {
        Some((u, v)) => vec![u, v],
        None => Vec::new(),
    };
    let required = fixed.iter().fold(0u64, |m, &w| m | bit(w));
    let pool: Vec<usize> = (0..host.order())
        .filter(|&w| required & bit(w) == 0 && host.degree(w) >= min_degree)
        .collect();

    for combo in pool.into_iter().combinations(t - fixed.len()) {
        let mut vertices = fixed.clone();
        vertices.extend(combo);
        let mask = vertices.iter().fold(0u64, |m, &w| m | bit(w));
        if host.induced_edge_count(mask) < target.edge_count() {
            continue;
        }
        let sub = host.induced_subgraph(&vertices);
        if !degrees_dominate(&sub, target) {
            continue;
        }
        if let Some(image) = find_embedding(target, &sub) {
            return Some(image.into_iter().map(|i| vertices[i]).collect());
        }
    }
    None
}

/// The `i`-th largest host degree is at least the `i`-th largest target degree.
fn degrees_dominate(host: &Graph, target: &Graph) -> bool {
    let h = host.degree_sequence();
    let t = target.degree_sequence();
    h.len() >= t.len() && h.iter().rev().zip(t.iter().rev()).all(|(a, b)| a >= b)
}

// ============================================================================
// Defect bounds
// ============================================================================

/// Divided-mode acceptance for one color: at most `max_defects` components may have more
/// than `max_component_size` vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefectBound {
    /// Largest component size (in vertices) that does not count as a defect.
    pub max_component_size: usize,
    /// How many oversized components are tolerated.
    pub max_defects: usize,
}

impl DefectBound {
    /// Creates a bound.
    pub const fn new(max_component_size: usize, max_defects: usize) -> Self {
        Self {
            max_component_size,
            max_defects,
        }
    }
}

impl fmt::Display for DefectBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.max_component_size, self.max_defects)
    }
}

/// Error returned when a `<size>:<defects>` pair cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse defect bound {0:?} (expected <max component size>:<max defects>)")]
pub struct DefectBoundParseError(String);

impl FromStr for DefectBound {
    type Err = DefectBoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DefectBoundParseError(s.to_string());
        let (size, defects) = s.trim().split_once(':').ok_or_else(err)?;
        Ok(Self::new(
            size.trim().parse().map_err(|_| err())?,
            defects.trim().parse().map_err(|_| err())?,
        ))
    }
}

/// Number of components of `host` with strictly more than `max_component_size` vertices.
pub fn large_components(host: &Graph, max_component_size: usize) -> usize {
    host.components()
        .iter()
        .filter(|c| c.count_ones() as usize > max_component_size)
        .count()
}

/// Whether `host` has more than `max_defects` components larger than `max_component_size`.
pub fn violates_defect_bound(host: &Graph, max_component_size: usize, max_defects: usize) -> bool {
    large_components(host, max_component_size) > max_defects
}

/// Fewest large components any completion of `host` can have, when the pairs of `open` may
/// still be added to it.
///
/// Large components never shrink, but two of them can merge into one. Every large component
/// of `host` ends up inside a large component of the completion, and completions never cross
/// the components of `host ∪ open`, so each component of `host ∪ open` holding a large
/// component of `host` contributes at least one. With `open` empty this is
/// [`large_components`].
pub fn forced_large_components(host: &Graph, open: &Graph, max_component_size: usize) -> usize {
    let large = host
        .components()
        .into_iter()
        .filter(|c| c.count_ones() as usize > max_component_size)
        .fold(0u64, |m, c| m | c);
    if large == 0 {
        return 0;
    }
    let reach = Graph::from_adj(host.adj().iter().zip(open.adj()).map(|(a, b)| a | b).collect());
    reach.components().iter().filter(|&&c| c & large != 0).count()
}

// ============================================================================
// Defective cliques
// ============================================================================

/// How far a vertex set may fall short of a clique in its class.
///
/// The pairs of the set that are missing from the class form the "defect graph".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Defect {
    /// Every vertex of the set misses at most `k` class edges inside the set.
    Sparse(usize),
    /// The defect graph has components of at most `k` vertices (`k >= 1`).
    Divided(usize),
}

/// A rule forbidding `order`-vertex sets that are cliques of the class up to `defect`.
///
/// With `Sparse(0)` or `Divided(1)` this forbids `K_order`. Both kinds are hereditary: a
/// subset of an admissible set is admissible, and adding class edges keeps it admissible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefectiveClique {
    /// Number of vertices of a forbidden set.
    pub order: usize,
    /// Allowed shortfall from a clique.
    pub defect: Defect,
}

impl DefectiveClique {
    /// Forbids `order`-vertex sets in which every vertex misses at most `k` class edges.
    pub const fn sparse(order: usize, k: usize) -> Self {
        Self {
            order,
            defect: Defect::Sparse(k),
        }
    }

    /// Forbids `order`-vertex sets whose missing class edges form components of at most `k`
    /// vertices.
    pub const fn divided(order: usize, k: usize) -> Self {
        Self {
            order,
            defect: Defect::Divided(k),
        }
    }

    fn is_clique_rule(&self) -> bool {
        matches!(self.defect, Defect::Sparse(0) | Defect::Divided(1))
    }

    /// Smallest class degree of a vertex in an admissible set of full size.
    fn min_degree(&self) -> usize {
        match self.defect {
            Defect::Sparse(k) => (self.order.saturating_sub(1)).saturating_sub(k),
            Defect::Divided(k) => self.order.saturating_sub(k),
        }
    }

    /// Whether the vertex set `set` is a clique of `class` up to the defect.
    pub fn admits(&self, class: &Graph, set: u64) -> bool {
        let missing = |w: usize| set & !class.neighbors(w) & !bit(w);
        match self.defect {
            Defect::Sparse(k) => bits(set).all(|w| missing(w).count_ones() as usize <= k),
            Defect::Divided(k) => {
                let mut unseen = set;
                while unseen != 0 {
                    let mut component = bit(unseen.trailing_zeros() as usize);
                    let mut frontier = component;
                    while frontier != 0 {
                        let w = frontier.trailing_zeros() as usize;
                        frontier &= frontier - 1;
                        let fresh = missing(w) & !component;
                        component |= fresh;
                        frontier |= fresh;
                    }
                    if component.count_ones() as usize > k {
                        return false;
                    }
                    unseen &= !component;
                }
                true
            }
        }
    }

    /// An admissible set of `order` vertices of `class`, if one exists.
    pub fn find_in(&self, class: &Graph) -> Option<Vec<usize>> {
        self.locate(class, None)
    }

    /// An admissible set of `order` vertices containing both `u` and `v`.
    ///
    /// If `class` minus the edge `(u, v)` has no admissible set, this finds one iff
    /// [`Self::find_in`] does.
    pub fn find_through(&self, class: &Graph, u: usize, v: usize) -> Option<Vec<usize>> {
        self.locate(class, Some((u, v)))
    }

    fn locate(&self, class: &Graph, through: Option<(usize, usize)>) -> Option<Vec<usize>> {
        let a = self.order;
        if a > class.order() {
            return None;
        }
        let fixed = match through {
            Some(_) if a < 2 => return None,
            Some((u, v)) => bit(u) | bit(v),
            None => 0,
        };

        if self.is_clique_rule() {
            let mut oracle = CliqueOracle::new();
            let mut out = Vec::with_capacity(a);
            let found = match through {
                Some((u, v)) => {
                    class.has_edge(u, v)
                        && oracle.find_clique_within(
                            class,
                            a - 2,
                            class.neighbors(u) & class.neighbors(v),
                            &mut out,
                        )
                }
                None => oracle.find_clique_of_size(class, a, &mut out),
            };
            if !found {
                return None;
            }
            if let Some((u, v)) = through {
                out.extend([u, v]);
            }
            out.sort_unstable();
            return Some(out);
        }

        if !self.admits(class, fixed) {
            return None;
        }
        let need = self.min_degree();
        let pool = (0..class.order())
            .filter(|&w| fixed & bit(w) == 0 && class.degree(w) >= need)
            .fold(0u64, |m, w| m | bit(w));
        let size = fixed.count_ones() as usize;
        self.grow(class, fixed, size, pool).map(|set| bits(set).collect())
    }

    /// Extends `set` with vertices of `pool`, in increasing order, keeping it admissible.
    fn grow(&self, class: &Graph, set: u64, size: usize, mut pool: u64) -> Option<u64> {
        if size == self.order {
            return Some(set);
        }
        while pool != 0 {
            if size + (pool.count_ones() as usize) < self.order {
                return None;
            }
            let w = pool.trailing_zeros() as usize;
            pool &= pool - 1;
            let next = set | bit(w);
            if self.admits(class, next) {
                if let Some(found) = self.grow(class, next, size + 1, pool) {
                    return Some(found);
                }
            }
        }
        None
    }
}

impl fmt::Display for DefectiveClique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.defect {
            Defect::Sparse(k) => write!(f, "{}/{k}-sparse", self.order),
            Defect::Divided(k) => write!(f, "{}/{k}-divided", self.order),
        }
    }
}

// ============================================================================
// ClassConstraint
// ============================================================================

/// The acceptance rule attached to one color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassConstraint {
    /// The class must not contain this graph.
    Forbidden(Graph),
    /// The class must respect this defect bound.
    Defective(DefectBound),
    /// The class must not contain a set this close to a clique.
    DefectiveClique(DefectiveClique),
}

impl ClassConstraint {
    /// Whether `class` breaks the rule.
    pub fn is_violated(&self, class: &Graph) -> bool {
        match self {
            Self::Forbidden(target) => contains_forbidden(class, target),
            Self::Defective(b) => violates_defect_bound(class, b.max_component_size, b.max_defects),
            Self::DefectiveClique(rule) => rule.find_in(class).is_some(),
        }
    }

    /// Whether a violation, once present, survives adding more edges to the class.
    ///
    /// Only hereditary rules may be checked through [`Self::is_violated_after`]. A defect
    /// bound with tolerated defects is not hereditary: merging two large components removes
    /// a defect.
    pub fn is_hereditary(&self) -> bool {
        match self {
            Self::Forbidden(_) | Self::DefectiveClique(_) => true,
            Self::Defective(b) => b.max_defects == 0,
        }
    }

    /// Whether `class` breaks a hereditary rule, given that it did not before `(u, v)` was
    /// added.
    ///
    /// For a rule that is not hereditary this is [`Self::is_violated`].
    pub fn is_violated_after(&self, class: &Graph, u: usize, v: usize) -> bool {
        match self {
            Self::Forbidden(target) => contains_forbidden_through(class, target, u, v),
            Self::DefectiveClique(rule) => rule.find_through(class, u, v).is_some(),
            Self::Defective(_) => self.is_violated(class),
        }
    }

    /// Whether every class obtained from `class` by adding pairs of `open` breaks the rule.
    ///
    /// Exact when `open` has no edges.
    pub fn is_doomed(&self, class: &Graph, open: &Graph) -> bool {
        match self {
            Self::Defective(b) => {
                forced_large_components(class, open, b.max_component_size) > b.max_defects
            }
            _ => self.is_violated(class),
        }
    }
}

impl fmt::Display for ClassConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden(target) => write!(f, "{target}"),
            Self::Defective(bound) => write!(f, "{bound}"),
            Self::DefectiveClique(rule) => write!(f, "{rule}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
