//! Exhaustive backtracking search for an edge coloring of `K_n` that avoids every target.
//!
//! Edges are colored one at a time in [`EdgeOrder`]. After each assignment the class that
//! just grew is re-checked through the new edge when its rule is hereditary. Rules that are
//! not (defect bounds that tolerate defects) are instead tested against the pairs still
//! uncolored: a branch is cut only once no completion can satisfy them, and every such
//! rule is re-tested on each assignment because the uncolored pairs shrink for all colors.
//! Backtracking uses an explicit stack of frames, so the depth is bounded by the number of
//! edges rather than the thread stack.
//!
//! With isomorph rejection enabled, every node records the canonical signature of its
//! partial coloring once its subtree is exhausted. A later node at the same depth whose
//! partial coloring has a recorded signature is skipped: an isomorphism between two
//! partial colorings of the same edge prefix also maps the uncolored edges onto each
//! other, so the two subtrees are identical up to relabeling.
//!
//! ## Parallelism
//! With `workers > 1`, the valid colorings of the first `split_depth` edges (one per
//! isomorphism class) become independent subtrees handed to a rayon pool. Workers share
//! the table of exhausted signatures and stop as soon as one of them finds a coloring.

use crate::canon::{canonical_signature, EdgeLabels, Signature};
use crate::coloring::{Coloring, EdgeOrder, MAX_COLORS};
use crate::error::RamseyError;
use crate::graph::{choose2, Graph, MAX_ORDER};
use crate::matcher::{ClassConstraint, DefectBound, DefectiveClique};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Skip subtrees whose partial coloring is isomorphic to an exhausted one.
    pub isomorph_rejection: bool,
    /// Number of worker threads (`<= 1` searches on the calling thread).
    pub workers: usize,
    /// Number of leading edges colored up front to split work between workers.
    pub split_depth: usize,
    /// Log progress every this many assignment attempts (`0` disables it).
    pub report_every: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            isomorph_rejection: true,
            workers: 1,
            split_depth: 1,
            report_every: 1_000_000,
        }
    }
}

/// What each color class must avoid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchSpec {
    /// Color `i` must not contain `targets[i]` as a subgraph.
    Sparse(Vec<Graph>),
    /// Color `i` must respect `bounds[i]`.
    Divided(Vec<DefectBound>),
    /// Color `i` must not contain `orders[i]` vertices each missing at most `k` class edges
    /// among them.
    SparseSets {
        /// Tolerated missing edges per vertex.
        k: usize,
        /// Forbidden set size per color.
        orders: Vec<usize>,
    },
    /// Color `i` must not contain `orders[i]` vertices whose missing class edges form
    /// components of at most `k` vertices.
    DividedSets {
        /// Largest tolerated component of missing edges (`k >= 1`).
        k: usize,
        /// Forbidden set size per color.
        orders: Vec<usize>,
    },
}

impl SearchSpec {
    /// Number of colors described.
    pub fn len(&self) -> usize {
        match self {
            Self::Sparse(targets) => targets.len(),
            Self::Divided(bounds) => bounds.len(),
            Self::SparseSets { orders, .. } | Self::DividedSets { orders, .. } => orders.len(),
        }
    }

    /// Whether no color is described.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One acceptance rule per color.
    pub fn constraints(&self) -> Vec<ClassConstraint> {
        match self {
            Self::Sparse(targets) => targets.iter().cloned().map(ClassConstraint::Forbidden).collect(),
            Self::Divided(bounds) => bounds.iter().copied().map(ClassConstraint::Defective).collect(),
            Self::SparseSets { k, orders } => orders
                .iter()
                .map(|&a| ClassConstraint::DefectiveClique(DefectiveClique::sparse(a, *k)))
                .collect(),
            Self::DividedSets { k, orders } => orders
                .iter()
                .map(|&a| ClassConstraint::DefectiveClique(DefectiveClique::divided(a, *k)))
                .collect(),
        }
    }

    /// Whether every rule is hereditary, so that a failure at one order implies failure at
    /// every larger order.
    pub fn is_hereditary(&self) -> bool {
        self.constraints().iter().all(ClassConstraint::is_hereditary)
    }
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparse(_) => write!(f, "R({})", self.constraints().iter().join(", ")),
            Self::Divided(_) => write!(f, "R[divided]({})", self.constraints().iter().join(", ")),
            Self::SparseSets { k, orders } => write!(f, "R_{k}({})", orders.iter().join(", ")),
            Self::DividedSets { k, orders } => write!(f, "R*_{k}({})", orders.iter().join(", ")),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a search at one order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// A complete coloring in which no class breaks its rule.
    Found(Coloring),
    /// The space was exhausted: every coloring breaks some rule.
    NotFound,
    /// The cancellation token was tripped before the search finished.
    Cancelled,
}

impl SearchResult {
    /// Whether a coloring was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The found coloring, if any.
    pub fn coloring(&self) -> Option<&Coloring> {
        match self {
            Self::Found(c) => Some(c),
            _ => None,
        }
    }
}

/// Counters accumulated over a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Color assignments attempted.
    pub nodes: u64,
    /// Assignments undone because the class broke its rule.
    pub rejected: u64,
    /// Nodes skipped because an isomorphic node was already exhausted.
    pub isomorph_skips: u64,
    /// Subtrees handed to workers.
    pub subtrees: usize,
}

impl SearchStats {
    fn merge(&mut self, other: &Self) {
        self.nodes += other.nodes;
        self.rejected += other.rejected;
        self.isomorph_skips += other.isomorph_skips;
        self.subtrees += other.subtrees;
    }
}

/// A search result together with its statistics.
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// The outcome.
    pub result: SearchResult,
    /// Counters.
    pub stats: SearchStats,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// All valid colorings at one order, one canonical representative per isomorphism class.
#[derive(Clone, Debug)]
pub struct Enumeration {
    /// Representatives, sorted by signature.
    pub colorings: Vec<Coloring>,
    /// `false` if the search was cancelled and the list may be partial.
    pub complete: bool,
    /// Counters.
    pub stats: SearchStats,
}

/// Shared flag that asks running searches to stop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token; every search holding a clone stops at its next assignment.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the token was tripped.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Searches for a `k`-coloring of `K_n` satisfying `spec`, with default settings.
///
/// # Errors
/// Returns [`RamseyError::InvalidParameters`] if `k == 0`, `spec` does not have exactly `k`
/// entries, `spec` asks for divided sets with `k == 0`, or `n > 64`.
pub fn search(n: usize, k: usize, spec: &SearchSpec) -> Result<SearchResult, RamseyError> {
    Ok(search_with(n, k, spec, &SearchConfig::default(), &CancelToken::new())?.result)
}

/// Searches for a `k`-coloring of `K_n` satisfying `spec`.
///
/// # Errors
/// Same conditions as [`search`], plus failure to start the worker pool.
pub fn search_with(
    n: usize,
    k: usize,
    spec: &SearchSpec,
    cfg: &SearchConfig,
    cancel: &CancelToken,
) -> Result<SearchReport, RamseyError> {
    let constraints = prepare(n, k, spec)?;
    let start = Instant::now();
    let run = run(n, &constraints, cfg, cancel, Goal::First)?;

    let result = match run.found {
        Some(coloring) => SearchResult::Found(coloring),
        None if run.interrupted => SearchResult::Cancelled,
        None => SearchResult::NotFound,
    };
    let elapsed = start.elapsed();
    log::debug!(
        "{spec} on {n} vertices: {} after {} nodes ({} rejected, {} isomorph skips) in {elapsed:.2?}",
        describe(&result),
        run.stats.nodes,
        run.stats.rejected,
        run.stats.isomorph_skips,
    );
    Ok(SearchReport {
        result,
        stats: run.stats,
        elapsed,
    })
}

/// Finds every valid `k`-coloring of `K_n` up to isomorphism (vertex relabeling).
///
/// # Errors
/// Same conditions as [`search_with`].
pub fn enumerate_colorings(
    n: usize,
    k: usize,
    spec: &SearchSpec,
    cfg: &SearchConfig,
    cancel: &CancelToken,
) -> Result<Enumeration, RamseyError> {
    let constraints = prepare(n, k, spec)?;
    let run = run(n, &constraints, cfg, cancel, Goal::All)?;
    log::debug!(
        "{spec} on {n} vertices: {} classes after {} nodes",
        run.colorings.len(),
        run.stats.nodes
    );
    Ok(Enumeration {
        colorings: run.colorings,
        complete: !run.interrupted,
        stats: run.stats,
    })
}

fn describe(result: &SearchResult) -> &'static str {
    match result {
        SearchResult::Found(_) => "found",
        SearchResult::NotFound => "not found",
        SearchResult::Cancelled => "cancelled",
    }
}

fn prepare(n: usize, k: usize, spec: &SearchSpec) -> Result<Vec<ClassConstraint>, RamseyError> {
    if k == 0 {
        return Err(RamseyError::params("at least one color is required"));
    }
    if k > MAX_COLORS {
        return Err(RamseyError::params(format!(
            "at most {MAX_COLORS} colors are supported, got {k}"
        )));
    }
    if spec.len() != k {
        return Err(RamseyError::params(format!(
            "{k} colors need {k} targets, got {}",
            spec.len()
        )));
    }
    if matches!(spec, SearchSpec::DividedSets { k: 0, .. }) {
        return Err(RamseyError::params("divided sets need components of at least one vertex"));
    }
    if n > MAX_ORDER {
        return Err(RamseyError::params(format!(
            "order {n} exceeds the supported maximum of {MAX_ORDER}"
        )));
    }
    Ok(spec.constraints())
}

// ============================================================================
// Shared state
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Goal {
    /// Stop at the first valid coloring.
    First,
    /// Collect one coloring per isomorphism class.
    All,
}

enum Outcome {
    Found(Coloring),
    Exhausted,
    Interrupted,
}

/// Signatures of exhausted nodes, one bucket per depth.
struct VisitedTable {
    buckets: Vec<Mutex<HashSet<Signature>>>,
}

impl VisitedTable {
    fn new(depths: usize) -> Self {
        Self {
            buckets: (0..depths).map(|_| Mutex::new(HashSet::new())).collect(),
        }
    }

    fn contains(&self, depth: usize, sig: &Signature) -> bool {
        self.buckets[depth]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(sig)
    }

    fn insert(&self, depth: usize, sig: Signature) {
        self.buckets[depth]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sig);
    }
}

struct Control<'a> {
    cancel: &'a CancelToken,
    /// Set when some worker found a coloring.
    stop: &'a AtomicBool,
    visited: &'a VisitedTable,
    report_every: u64,
}

impl Control<'_> {
    #[inline]
    fn interrupted(&self) -> bool {
        self.cancel.is_cancelled() || self.stop.load(Ordering::Relaxed)
    }
}

/// A coloring of an edge prefix; uncolored pairs get label `0`.
struct PartialView<'a> {
    edge_order: EdgeOrder,
    colors: &'a [Option<u8>],
}

impl EdgeLabels for PartialView<'_> {
    fn order(&self) -> usize {
        self.edge_order.order()
    }

    #[inline]
    fn label(&self, u: usize, v: usize) -> u8 {
        self.colors[self.edge_order.index(u, v)].map_or(0, |c| c + 1)
    }
}

// ============================================================================
// Engine
// ============================================================================

struct Frame {
    /// Next color to try at this depth.
    next: usize,
    /// Color currently assigned at this depth.
    current: Option<usize>,
    /// Signature of the partial coloring this frame started from.
    signature: Option<Signature>,
}

struct Engine<'a> {
    k: usize,
    edge_order: EdgeOrder,
    edges: Vec<(usize, usize)>,
    constraints: &'a [ClassConstraint],
    /// Colors whose rule is checked against the uncolored pairs after every assignment.
    open_sensitive: Vec<usize>,
    classes: Vec<Graph>,
    /// Pairs not colored yet.
    open: Graph,
    colors: Vec<Option<u8>>,
    isomorph_rejection: bool,
    goal: Goal,
    found: Vec<Coloring>,
    seen: HashSet<Signature>,
    stats: SearchStats,
}

impl<'a> Engine<'a> {
    fn new(n: usize, constraints: &'a [ClassConstraint], isomorph_rejection: bool, goal: Goal) -> Self {
        let edge_order = EdgeOrder::new(n);
        Self {
            k: constraints.len(),
            edge_order,
            edges: edge_order.edges().collect(),
            constraints,
            open_sensitive: (0..constraints.len()).filter(|&c| !constraints[c].is_hereditary()).collect(),
            classes: vec![Graph::empty(n); constraints.len()],
            open: Graph::complete(n),
            colors: vec![None; edge_order.len()],
            isomorph_rejection,
            goal,
            found: Vec::new(),
            seen: HashSet::new(),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    fn assign(&mut self, depth: usize, c: usize) {
        let (u, v) = self.edges[depth];
        self.colors[depth] = Some(c as u8);
        self.classes[c].flip_edge(u, v);
        self.open.flip_edge(u, v);
    }

    #[inline]
    fn unassign(&mut self, depth: usize, c: usize) {
        let (u, v) = self.edges[depth];
        self.colors[depth] = None;
        self.classes[c].flip_edge(u, v);
        self.open.flip_edge(u, v);
    }

    /// Assigns `c` to the edge at `depth`, undoing it if some class can no longer satisfy
    /// its rule.
    fn try_assign(&mut self, depth: usize, c: usize) -> bool {
        self.stats.nodes += 1;
        self.assign(depth, c);
        let (u, v) = self.edges[depth];
        let rule = &self.constraints[c];
        let broken = (rule.is_hereditary() && rule.is_violated_after(&self.classes[c], u, v))
            || self
                .open_sensitive
                .iter()
                .any(|&d| self.constraints[d].is_doomed(&self.classes[d], &self.open));
        if broken {
            self.unassign(depth, c);
            self.stats.rejected += 1;
            return false;
        }
        true
    }

    fn signature_at(&self, depth: usize) -> Option<Signature> {
        (self.isomorph_rejection && depth > 0).then(|| {
            canonical_signature(&PartialView {
                edge_order: self.edge_order,
                colors: &self.colors,
            })
        })
    }

    fn snapshot(&self) -> Coloring {
        let colors = self.colors.iter().map(|c| c.unwrap_or(0)).collect();
        Coloring::from_raw(self.edge_order.order(), self.k, colors)
    }

    fn load_prefix(&mut self, prefix: &[u8]) {
        for (depth, &c) in prefix.iter().enumerate() {
            self.assign(depth, c as usize);
        }
    }

    /// All edges are colored. Returns the coloring when the search should stop.
    fn reach_leaf(&mut self) -> Option<Coloring> {
        let coloring = self.snapshot();
        match self.goal {
            Goal::First => Some(coloring),
            Goal::All => {
                if self.seen.insert(coloring.signature()) {
                    self.found.push(coloring);
                }
                None
            }
        }
    }

    /// Valid colorings of the first `split` edges, one per isomorphism class.
    ///
    /// Returns `false` if interrupted, leaving `out` partial.
    fn collect_prefixes(
        &mut self,
        depth: usize,
        split: usize,
        ctl: &Control<'_>,
        seen: &mut HashSet<Signature>,
        out: &mut Vec<Vec<u8>>,
    ) -> bool {
        if depth == split {
            if let Some(sig) = self.signature_at(depth) {
                if !seen.insert(sig) {
                    self.stats.isomorph_skips += 1;
                    return true;
                }
            }
            out.push(self.colors[..split].iter().map(|c| c.unwrap_or(0)).collect());
            return true;
        }
        for c in 0..self.k {
            if ctl.interrupted() {
                return false;
            }
            if self.try_assign(depth, c) {
                let finished = self.collect_prefixes(depth + 1, split, ctl, seen, out);
                self.unassign(depth, c);
                if !finished {
                    return false;
                }
            }
        }
        true
    }

    /// Explores every completion of the first `base` edges (already assigned).
    fn explore(&mut self, base: usize, ctl: &Control<'_>) -> Outcome {
        let m = self.edges.len();
        if base == m {
            return match self.reach_leaf() {
                Some(coloring) => Outcome::Found(coloring),
                None => Outcome::Exhausted,
            };
        }

        let root = self.signature_at(base);
        if let Some(sig) = &root {
            if ctl.visited.contains(base, sig) {
                self.stats.isomorph_skips += 1;
                return Outcome::Exhausted;
            }
        }

        let mut frames: Vec<Frame> = Vec::with_capacity(m - base);
        frames.push(Frame {
            next: 0,
            current: None,
            signature: root,
        });
        let mut next_report = ctl.report_every;

        while !frames.is_empty() {
            let top = frames.len() - 1;
            let depth = base + top;

            if let Some(c) = frames[top].current.take() {
                self.unassign(depth, c);
            }

            let mut chosen = None;
            while frames[top].next < self.k {
                if ctl.interrupted() {
                    return Outcome::Interrupted;
                }
                let c = frames[top].next;
                frames[top].next += 1;
                if self.try_assign(depth, c) {
                    chosen = Some(c);
                    break;
                }
            }

            let Some(c) = chosen else {
                if let Some(sig) = frames.pop().and_then(|frame| frame.signature) {
                    ctl.visited.insert(depth, sig);
                }
                continue;
            };
            frames[top].current = Some(c);

            if ctl.report_every > 0 && self.stats.nodes >= next_report {
                next_report = self.stats.nodes + ctl.report_every;
                log::debug!(
                    "depth {}/{m}: {} nodes, {} rejected, {} isomorph skips",
                    depth + 1,
                    self.stats.nodes,
                    self.stats.rejected,
                    self.stats.isomorph_skips,
                );
            }

            let child = depth + 1;
            if child == m {
                if let Some(coloring) = self.reach_leaf() {
                    return Outcome::Found(coloring);
                }
                continue;
            }

            let signature = self.signature_at(child);
            if let Some(sig) = &signature {
                if ctl.visited.contains(child, sig) {
                    self.stats.isomorph_skips += 1;
                    continue;
                }
            }
            frames.push(Frame {
                next: 0,
                current: None,
                signature,
            });
        }
        Outcome::Exhausted
    }
}

// ============================================================================
// Runner
// ============================================================================

#[derive(Default)]
struct Run {
    found: Option<Coloring>,
    colorings: Vec<Coloring>,
    interrupted: bool,
    stats: SearchStats,
}

impl Run {
    fn absorb(&mut self, outcome: Outcome, stats: &SearchStats, colorings: Vec<Coloring>) {
        self.stats.merge(stats);
        self.colorings.extend(colorings);
        match outcome {
            Outcome::Found(coloring) => {
                if self.found.is_none() {
                    self.found = Some(coloring);
                }
            }
            Outcome::Interrupted => self.interrupted = true,
            Outcome::Exhausted => {}
        }
    }

    /// Dedupes across workers and replaces each coloring by its canonical form.
    fn finish(mut self) -> Self {
        let classes: BTreeMap<Signature, Coloring> = self
            .colorings
            .drain(..)
            .map(|c| (c.signature(), c.canonical_form()))
            .collect();
        self.colorings = classes.into_values().collect();
        self
    }
}

fn run(
    n: usize,
    constraints: &[ClassConstraint],
    cfg: &SearchConfig,
    cancel: &CancelToken,
    goal: Goal,
) -> Result<Run, RamseyError> {
    let m = choose2(n);
    let visited = VisitedTable::new(m + 1);
    let stop = AtomicBool::new(false);
    let ctl = Control {
        cancel,
        stop: &stop,
        visited: &visited,
        report_every: cfg.report_every,
    };

    // Rules that no class can satisfy (edgeless targets, too many singletons) fail before
    // any edge is colored.
    let (empty, all) = (Graph::empty(n), Graph::complete(n));
    if let Some(c) = constraints.iter().position(|rule| rule.is_doomed(&empty, &all)) {
        log::debug!("color {c} rejects every class on {n} vertices");
        return Ok(Run::default());
    }

    let mut run = Run::default();
    if cfg.workers <= 1 {
        let mut engine = Engine::new(n, constraints, cfg.isomorph_rejection, goal);
        let outcome = engine.explore(0, &ctl);
        engine.stats.subtrees = 1;
        run.absorb(outcome, &engine.stats, engine.found);
        return Ok(run.finish());
    }

    let split = cfg.split_depth.min(m);
    let mut seeder = Engine::new(n, constraints, cfg.isomorph_rejection, goal);
    let mut prefixes = Vec::new();
    let seeded = seeder.collect_prefixes(0, split, &ctl, &mut HashSet::new(), &mut prefixes);
    run.stats.merge(&seeder.stats);
    if !seeded {
        log::debug!("cancelled while splitting work at depth {split}");
        run.interrupted = true;
        return Ok(run.finish());
    }
    log::trace!(
        "{} subtrees at split depth {split} for {} workers",
        prefixes.len(),
        cfg.workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.workers)
        .build()
        .map_err(|e| RamseyError::params(format!("cannot start {} workers: {e}", cfg.workers)))?;

    let results: Vec<(Outcome, SearchStats, Vec<Coloring>)> = pool.install(|| {
        prefixes
            .par_iter()
            .enumerate()
            .map(|(i, prefix)| {
                let mut engine = Engine::new(n, constraints, cfg.isomorph_rejection, goal);
                if ctl.interrupted() {
                    return (Outcome::Interrupted, engine.stats, Vec::new());
                }
                engine.load_prefix(prefix);
                engine.stats.subtrees = 1;
                let outcome = engine.explore(split, &ctl);
                if matches!(outcome, Outcome::Found(_))
                    && stop
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
                        .is_ok()
                {
                    log::trace!("subtree {i} found a coloring; stopping the other workers");
                }
                (outcome, engine.stats, engine.found)
            })
            .collect()
    });

    for (outcome, stats, colorings) in results {
        run.absorb(outcome, &stats, colorings);
    }
    if run.found.is_some() {
        run.interrupted = false;
    }
    Ok(run.finish())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::contains_forbidden;
    use std::thread;

    fn sparse(names: &[&str]) -> SearchSpec {
        SearchSpec::Sparse(names.iter().map(|s| s.parse().unwrap()).collect())
    }

    fn assert_valid(coloring: &Coloring, spec: &SearchSpec) {
        for (c, rule) in spec.constraints().iter().enumerate() {
            assert!(!rule.is_violated(&coloring.class(c)), "color {c} breaks {rule}");
        }
    }

    fn config(isomorph_rejection: bool, workers: usize, split_depth: usize) -> SearchConfig {
        SearchConfig {
            isomorph_rejection,
            workers,
            split_depth,
            report_every: 0,
        }
    }

    #[test]
    fn r33_is_six() {
        let spec = sparse(&["K3", "K3"]);
        let SearchResult::Found(coloring) = search(5, 2, &spec).unwrap() else {
            panic!("K5 has a triangle-free 2-coloring");
        };
        assert_eq!(coloring.order(), 5);
        assert_valid(&coloring, &spec);
        assert!(!contains_forbidden(&coloring.class(0), &Graph::complete(3)));
        assert_eq!(search(6, 2, &spec).unwrap(), SearchResult::NotFound);
    }

    #[test]
    fn tiny_orders_always_succeed() {
        for spec in [sparse(&["K3", "K3"]), sparse(&["K2"]), sparse(&["C4", "P3", "K3"])] {
            for n in 0..=1 {
                let result = search(n, spec.len(), &spec).unwrap();
                assert!(result.is_found(), "{spec} at n={n}");
                assert_eq!(result.coloring().unwrap().order(), n);
            }
        }
    }

    #[test]
    fn single_color_with_oversized_target() {
        let spec = sparse(&["K4"]);
        assert!(search(3, 1, &spec).unwrap().is_found());
        assert_eq!(search(4, 1, &spec).unwrap(), SearchResult::NotFound);
    }

    #[test]
    fn edgeless_target_fails_before_coloring() {
        let spec = sparse(&["E2", "K3"]);
        assert!(search(1, 2, &spec).unwrap().is_found());
        assert_eq!(search(2, 2, &spec).unwrap(), SearchResult::NotFound);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let spec = sparse(&["K3", "K3"]);
        assert!(matches!(search(5, 0, &SearchSpec::Sparse(vec![])), Err(RamseyError::InvalidParameters(_))));
        assert!(matches!(search(5, 3, &spec), Err(RamseyError::InvalidParameters(_))));
        assert!(matches!(search(65, 2, &spec), Err(RamseyError::InvalidParameters(_))));
    }

    #[test]
    fn not_found_is_monotone_in_order() {
        // R(C4, K3) = 7.
        let spec = sparse(&["C4", "K3"]);
        let results: Vec<bool> = (0..=8).map(|n| search(n, 2, &spec).unwrap().is_found()).collect();
        assert_eq!(results, vec![true, true, true, true, true, true, true, false, false]);
    }

    #[test]
    fn cancel_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let report = search_with(8, 2, &sparse(&["K3", "K4"]), &SearchConfig::default(), &token).unwrap();
        assert_eq!(report.result, SearchResult::Cancelled);
    }

    #[test]
    fn cancel_mid_search() {
        // R(3,3,3) = 17: proving NotFound at 17 is far out of reach.
        let spec = sparse(&["K3", "K3", "K3"]);
        let token = CancelToken::new();
        let report = thread::scope(|s| {
            let trip = token.clone();
            s.spawn(move || {
                thread::sleep(Duration::from_millis(200));
                trip.cancel();
            });
            search_with(17, 3, &spec, &SearchConfig::default(), &token).unwrap()
        });
        assert_eq!(report.result, SearchResult::Cancelled);
        assert!(report.stats.nodes > 0);
    }

    #[test]
    fn isomorph_rejection_does_not_change_answers() {
        for (names, orders) in [(["K3", "K3"], 4..=6), (["C4", "C4"], 4..=6), (["P3", "K3"], 2..=5)] {
            let spec = sparse(&names);
            for n in orders {
                let token = CancelToken::new();
                let with = search_with(n, 2, &spec, &config(true, 1, 1), &token).unwrap();
                let without = search_with(n, 2, &spec, &config(false, 1, 1), &token).unwrap();
                assert_eq!(with.result.is_found(), without.result.is_found(), "{spec} at n={n}");
                assert!(with.stats.nodes <= without.stats.nodes);
            }
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let spec = sparse(&["K3", "K4"]);
        for n in [6, 8, 9] {
            let token = CancelToken::new();
            let seq = search_with(n, 2, &spec, &config(true, 1, 1), &token).unwrap();
            let par = search_with(n, 2, &spec, &config(true, 4, 4), &token).unwrap();
            assert_eq!(seq.result.is_found(), par.result.is_found(), "n={n}");
            if let Some(coloring) = par.result.coloring() {
                assert_valid(coloring, &spec);
            }
        }
    }

    #[test]
    fn enumeration_counts_match_known_values() {
        // Graphs with no triangle and no independent triple, by order.
        let spec = sparse(&["K3", "K3"]);
        let token = CancelToken::new();
        let counts: Vec<usize> = (0..=6)
            .map(|n| {
                let e = enumerate_colorings(n, 2, &spec, &SearchConfig::default(), &token).unwrap();
                assert!(e.complete);
                e.colorings.len()
            })
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 2, 3, 1, 0]);
    }

    #[test]
    fn parallel_enumeration_matches_sequential() {
        let spec = sparse(&["K3", "K4"]);
        let token = CancelToken::new();
        for n in [5, 7, 8] {
            let seq = enumerate_colorings(n, 2, &spec, &config(true, 1, 1), &token).unwrap();
            let par = enumerate_colorings(n, 2, &spec, &config(true, 3, 3), &token).unwrap();
            assert_eq!(seq.colorings, par.colorings, "n={n}");
        }
    }

    #[test]
    fn divided_bounds() {
        let no_edges = SearchSpec::Divided(vec![DefectBound::new(1, 0); 2]);
        assert!(search(1, 2, &no_edges).unwrap().is_found());
        assert_eq!(search(2, 2, &no_edges).unwrap(), SearchResult::NotFound);

        let matchings = SearchSpec::Divided(vec![DefectBound::new(2, 0); 2]);
        assert!(search(2, 2, &matchings).unwrap().is_found());
        assert_eq!(search(3, 2, &matchings).unwrap(), SearchResult::NotFound);

        let one_defect = SearchSpec::Divided(vec![DefectBound::new(1, 1); 2]);
        let SearchResult::Found(coloring) = search(4, 2, &one_defect).unwrap() else {
            panic!("triangle plus star colors K4");
        };
        assert_valid(&coloring, &one_defect);
    }

    /// Valid colorings of `K_n` by trying all of them, one signature per isomorphism class.
    fn brute_force_classes(n: usize, spec: &SearchSpec) -> HashSet<Signature> {
        let (k, m) = (spec.len(), choose2(n));
        let rules = spec.constraints();
        (0..k.pow(m as u32))
            .map(|mut code| {
                let colors = (0..m).map(|_| {
                    let c = code % k;
                    code /= k;
                    c as u8
                });
                Coloring::from_raw(n, k, colors.collect())
            })
            .filter(|coloring| (0..k).all(|c| !rules[c].is_violated(&coloring.class(c))))
            .map(|coloring| coloring.signature())
            .collect()
    }

    fn divided(bounds: &[(usize, usize)]) -> SearchSpec {
        SearchSpec::Divided(bounds.iter().map(|&(s, d)| DefectBound::new(s, d)).collect())
    }

    #[test]
    fn divided_search_matches_brute_force() {
        let token = CancelToken::new();
        for bounds in [
            vec![(0, 1), (0, 1)],
            vec![(0, 2), (0, 2)],
            vec![(1, 1), (1, 1)],
            vec![(2, 1), (2, 1)],
            vec![(1, 0), (1, 0)],
            vec![(2, 0), (2, 0)],
            vec![(1, 1), (0, 2)],
        ] {
            let spec = divided(&bounds);
            for n in 0..=5 {
                let expected = brute_force_classes(n, &spec);
                for iso in [true, false] {
                    let report = search_with(n, 2, &spec, &config(iso, 1, 1), &token).unwrap();
                    assert_eq!(report.result.is_found(), !expected.is_empty(), "{spec} at n={n}");
                    if let Some(coloring) = report.result.coloring() {
                        assert_valid(coloring, &spec);
                    }
                }
                let e = enumerate_colorings(n, 2, &spec, &config(true, 1, 1), &token).unwrap();
                let got: HashSet<Signature> = e.colorings.iter().map(Coloring::signature).collect();
                assert_eq!(got, expected, "{spec} at n={n}");
            }
        }
    }

    #[test]
    fn divided_existence_is_not_monotone() {
        // Each class may have one non-singleton component: impossible on 2 and 3 vertices,
        // a path and its complement path on 4.
        let spec = divided(&[(0, 1), (0, 1)]);
        let found: Vec<bool> = (0..=5).map(|n| search(n, 2, &spec).unwrap().is_found()).collect();
        assert_eq!(found, vec![true, true, false, false, true, true]);
    }

    #[test]
    fn three_color_divided_enumeration() {
        let spec = divided(&[(1, 1); 3]);
        let token = CancelToken::new();
        let counts: Vec<usize> = (0..=5)
            .map(|n| enumerate_colorings(n, 3, &spec, &SearchConfig::default(), &token).unwrap().colorings.len())
            .collect();
        assert_eq!(counts, vec![1, 1, 3, 10, 50, 501]);
        let par = enumerate_colorings(5, 3, &spec, &config(true, 3, 4), &token).unwrap();
        assert_eq!(par.colorings.len(), 501);
    }

    #[test]
    fn single_vertex_target_fails_at_one_vertex() {
        // Every class on one vertex contains K1, and every class has a large singleton.
        assert!(search(0, 2, &sparse(&["K1", "K3"])).unwrap().is_found());
        assert_eq!(search(1, 2, &sparse(&["K1", "K3"])).unwrap(), SearchResult::NotFound);
        assert_eq!(search(1, 1, &divided(&[(0, 0)])).unwrap(), SearchResult::NotFound);
        assert!(search(1, 1, &divided(&[(0, 1)])).unwrap().is_found());
    }

    fn sets(k: usize, orders: &[usize], divided: bool) -> SearchSpec {
        let orders = orders.to_vec();
        if divided {
            SearchSpec::DividedSets { k, orders }
        } else {
            SearchSpec::SparseSets { k, orders }
        }
    }

    fn first_failure(spec: &SearchSpec) -> usize {
        (0..).find(|&n| !search(n, spec.len(), spec).unwrap().is_found()).unwrap()
    }

    #[test]
    fn defective_clique_thresholds() {
        assert_eq!(first_failure(&sets(0, &[3, 3], false)), 6);
        assert_eq!(first_failure(&sets(1, &[3, 3], false)), 3);
        assert_eq!(first_failure(&sets(1, &[3, 4], false)), 4);
        assert_eq!(first_failure(&sets(1, &[4, 4], false)), 6);
        assert_eq!(first_failure(&sets(2, &[4, 4], false)), 4);
        assert_eq!(first_failure(&sets(1, &[3, 3], true)), 6);
        assert_eq!(first_failure(&sets(2, &[3, 3], true)), 3);
        assert_eq!(first_failure(&sets(3, &[4, 4], true)), 6);
    }

    #[test]
    fn defective_clique_enumeration() {
        let token = CancelToken::new();
        let count = |spec: &SearchSpec, n| {
            enumerate_colorings(n, 2, spec, &SearchConfig::default(), &token).unwrap().colorings.len()
        };
        assert_eq!(count(&sets(1, &[4, 4], false), 5), 2);
        assert_eq!(count(&sets(3, &[4, 4], true), 4), 1);
        assert_eq!(count(&sets(3, &[4, 4], true), 5), 1);
        assert_eq!(count(&sets(2, &[4, 4], true), 4), 5);
        for (k, divided) in [(1, false), (2, false), (2, true), (3, true)] {
            let spec = sets(k, &[3, 4], divided);
            for n in 0..=5 {
                let expected = brute_force_classes(n, &spec);
                let e = enumerate_colorings(n, 2, &spec, &config(true, 1, 1), &token).unwrap();
                let got: HashSet<Signature> = e.colorings.iter().map(Coloring::signature).collect();
                assert_eq!(got, expected, "{spec} at n={n}");
            }
        }
    }

    #[test]
    fn divided_sets_need_nonempty_components() {
        assert!(matches!(search(3, 2, &sets(0, &[3, 3], true)), Err(RamseyError::InvalidParameters(_))));
    }

    #[test]
    fn hereditary_specs() {
        assert!(sparse(&["K3", "C4"]).is_hereditary());
        assert!(divided(&[(2, 0), (1, 0)]).is_hereditary());
        assert!(!divided(&[(2, 0), (1, 1)]).is_hereditary());
        assert!(sets(2, &[4, 4], true).is_hereditary());
    }

    #[test]
    fn parallel_cancel_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let spec = sparse(&["K3", "K3", "K3"]);
        let report = search_with(17, 3, &spec, &config(true, 4, 30), &token).unwrap();
        assert_eq!(report.result, SearchResult::Cancelled);
        assert_eq!(report.stats.subtrees, 0);
        let e = enumerate_colorings(9, 3, &spec, &config(true, 4, 12), &token).unwrap();
        assert!(!e.complete);
    }

    #[test]
    fn parallel_cancel_mid_search() {
        let spec = sparse(&["K3", "K3", "K3"]);
        let token = CancelToken::new();
        let report = thread::scope(|s| {
            let trip = token.clone();
            s.spawn(move || {
                thread::sleep(Duration::from_millis(200));
                trip.cancel();
            });
            search_with(17, 3, &spec, &config(true, 4, 6), &token).unwrap()
        });
        assert_eq!(report.result, SearchResult::Cancelled);
        assert!(report.stats.nodes > 0);
    }

    #[test]
    fn spec_display() {
        assert_eq!(sparse(&["K3", "4:0-1"]).to_string(), "R(K3, 4:0-1)");
        let divided = SearchSpec::Divided(vec![DefectBound::new(2, 1)]);
        assert_eq!(divided.to_string(), "R[divided](2:1)");
        assert_eq!(sets(1, &[3, 4], false).to_string(), "R_1(3, 4)");
        assert_eq!(sets(2, &[4, 4], true).to_string(), "R*_2(4, 4)");
    }
}
