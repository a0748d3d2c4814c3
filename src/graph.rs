//! Simple graphs on at most 64 vertices, stored as one neighbor bitset per vertex.

use crate::permutation::Permutation;
use itertools::Itertools;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Bit helpers
// ============================================================================

/// Largest supported vertex count (one `u64` neighbor mask per vertex).
pub const MAX_ORDER: usize = 64;

/// Precomputed `choose(n, 2) = n*(n-1)/2` for n in 0..=64.
const CHOOSE2: [usize; 65] = {
    let mut table = [0usize; 65];
    let mut i = 0usize;
    while i < 65 {
        table[i] = (i * i.saturating_sub(1)) / 2;
        i += 1;
    }
    table
};

/// Returns `n * (n-1) / 2` via lookup.
#[inline(always)]
pub(crate) const fn choose2(n: usize) -> usize {
    debug_assert!(n < CHOOSE2.len());
    CHOOSE2[n]
}

/// Returns a mask with the lowest `n` bits set.
#[inline(always)]
pub const fn all_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

#[inline(always)]
pub(crate) const fn bit(v: usize) -> u64 {
    1u64 << v
}

/// Iterates over the set bits of `mask`, lowest first.
#[inline]
pub(crate) fn bits(mut mask: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let v = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(v)
    })
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building or parsing a graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint is not a vertex of the graph.
    #[error("edge ({u}, {v}) has an endpoint outside 0..{n}")]
    EndpointOutOfRange {
        /// First endpoint.
        u: usize,
        /// Second endpoint.
        v: usize,
        /// Number of vertices.
        n: usize,
    },
    /// An edge joins a vertex to itself.
    #[error("self-loop at vertex {vertex}")]
    SelfLoop {
        /// The vertex with a self-loop.
        vertex: usize,
    },
    /// The same unordered pair was given twice.
    #[error("edge ({u}, {v}) is listed more than once")]
    DuplicateEdge {
        /// Smaller endpoint.
        u: usize,
        /// Larger endpoint.
        v: usize,
    },
    /// The graph does not fit in `u64` bitsets.
    #[error("graph has {n} vertices; this implementation supports n <= 64")]
    TooManyVertices {
        /// Requested number of vertices.
        n: usize,
    },
    /// An adjacency-matrix row has the wrong number of entries.
    #[error("matrix row {row} has {len} entries, expected {expected}")]
    MatrixRow {
        /// Row index.
        row: usize,
        /// Entries found.
        len: usize,
        /// Number of rows.
        expected: usize,
    },
    /// An adjacency-matrix entry is neither `0` nor `1`.
    #[error("matrix row {row} has entry {entry:?} (expected 0 or 1)")]
    MatrixEntry {
        /// Row index.
        row: usize,
        /// The offending entry.
        entry: String,
    },
    /// The adjacency matrix lists `(u, v)` but not `(v, u)`, or the reverse.
    #[error("matrix is not symmetric at ({u}, {v})")]
    Asymmetric {
        /// Row index.
        u: usize,
        /// Column index.
        v: usize,
    },
    /// A target name like `K3` or `5:0-1,1-2` could not be understood.
    #[error("cannot parse graph {0:?} (expected K<n>, C<n>, P<n>, S<n>, E<n> or <n>:<u>-<v>,...)")]
    UnknownName(String),
}

// ============================================================================
// Graph
// ============================================================================

/// An immutable simple graph on vertices `0..n`.
///
/// `adj[v]` is the neighbor bitset of vertex `v`. Equality is structural: two graphs are
/// equal iff they have the same order and the same edge set. Use
/// [`crate::canon::is_isomorphic`] for the weaker isomorphism relation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Graph {
    adj: Vec<u64>,
    edge_count: usize,
}

impl Graph {
    /// Builds a graph on `n` vertices from a list of unordered edges.
    ///
    /// # Errors
    /// Returns an error if `n > 64`, an endpoint is out of range, an edge is a self-loop,
    /// or the same pair is listed twice (in either orientation).
    pub fn new<I>(n: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        if n > MAX_ORDER {
            return Err(GraphError::TooManyVertices { n });
        }
        let mut adj = vec![0u64; n];
        let mut edge_count = 0;
        for (u, v) in edges {
            if u >= n || v >= n {
                return Err(GraphError::EndpointOutOfRange { u, v, n });
            }
            if u == v {
                return Err(GraphError::SelfLoop { vertex: u });
            }
            if adj[u] & bit(v) != 0 {
                return Err(GraphError::DuplicateEdge {
                    u: u.min(v),
                    v: u.max(v),
                });
            }
            adj[u] |= bit(v);
            adj[v] |= bit(u);
            edge_count += 1;
        }
        Ok(Self { adj, edge_count })
    }

    /// Creates a graph from neighbor bitsets.
    ///
    /// # Panics
    /// Panics in debug builds if the input contains out-of-range bits, self-loops,
    /// or is not symmetric.
    pub(crate) fn from_adj(adj: Vec<u64>) -> Self {
        let n = adj.len();
        debug_assert!(n <= MAX_ORDER, "This implementation assumes n <= 64");
        let mask = all_bits(n);
        for i in 0..n {
            debug_assert_eq!(adj[i] & !mask, 0, "adj contains bits outside n");
            debug_assert_eq!((adj[i] >> i) & 1, 0, "self-loop at vertex {i}");
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let aij = (adj[i] >> j) & 1;
                let aji = (adj[j] >> i) & 1;
                debug_assert_eq!(aij, aji, "adj is not symmetric at ({i},{j})");
            }
        }
        let edge_count = adj.iter().map(|row| row.count_ones() as usize).sum::<usize>() / 2;
        Self { adj, edge_count }
    }

    /// Creates the edgeless graph on `n` vertices.
    ///
    /// # Panics
    /// Panics in debug builds if `n > 64`.
    pub fn empty(n: usize) -> Self {
        debug_assert!(n <= MAX_ORDER);
        Self {
            adj: vec![0u64; n],
            edge_count: 0,
        }
    }

    /// Creates the complete graph `K_n`.
    pub fn complete(n: usize) -> Self {
        let mask = all_bits(n);
        Self::from_adj((0..n).map(|v| mask & !bit(v)).collect())
    }

    /// Creates the cycle `C_n`. Orders below 3 give the path on `n` vertices.
    pub fn cycle(n: usize) -> Self {
        let mut adj = Self::path(n).adj;
        if n >= 3 {
            adj[0] |= bit(n - 1);
            adj[n - 1] |= bit(0);
        }
        Self::from_adj(adj)
    }

    /// Creates the path on `n` vertices (`n - 1` edges).
    pub fn path(n: usize) -> Self {
        let mut adj = vec![0u64; n];
        for v in 1..n {
            adj[v - 1] |= bit(v);
            adj[v] |= bit(v - 1);
        }
        Self::from_adj(adj)
    }

    /// Creates the star `K_{1,leaves}` with center `0`.
    pub fn star(leaves: usize) -> Self {
        let n = leaves + 1;
        let mut adj = vec![0u64; n];
        for v in 1..n {
            adj[0] |= bit(v);
            adj[v] |= bit(0);
        }
        Self::from_adj(adj)
    }

    /// Samples an Erdős–Rényi graph `G(n, p)`.
    pub fn new_random<R: Rng>(rng: &mut R, n: usize, p: f64) -> Self {
        debug_assert!(n <= MAX_ORDER, "This implementation assumes n <= 64");
        debug_assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");

        let mut adj = vec![0u64; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.random_bool(p) {
                    adj[i] |= bit(j);
                    adj[j] |= bit(i);
                }
            }
        }
        Self::from_adj(adj)
    }

    /// Number of vertices.
    #[inline(always)]
    pub fn order(&self) -> usize {
        self.adj.len()
    }

    /// Number of edges.
    #[inline(always)]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns a reference to the adjacency bitsets.
    #[inline(always)]
    pub fn adj(&self) -> &[u64] {
        &self.adj
    }

    /// Neighbor bitset of `v`.
    #[inline(always)]
    pub fn neighbors(&self, v: usize) -> u64 {
        self.adj[v]
    }

    /// Returns whether the edge `(u, v)` exists.
    #[inline(always)]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.order() && v < self.order());
        (self.adj[u] & bit(v)) != 0
    }

    /// Returns the degree of vertex `v`.
    #[inline(always)]
    pub fn degree(&self, v: usize) -> usize {
        self.adj[v].count_ones() as usize
    }

    /// Degrees sorted in increasing order.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = (0..self.order()).map(|v| self.degree(v)).collect();
        degrees.sort_unstable();
        degrees
    }

    /// Whether every pair of distinct vertices is adjacent.
    pub fn is_complete(&self) -> bool {
        self.edge_count == choose2(self.order())
    }

    /// Iterates over edges `(u, v)` with `u < v`, in lexicographic order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj
            .iter()
            .enumerate()
            .flat_map(|(u, &row)| bits(row & !all_bits(u + 1)).map(move |v| (u, v)))
    }

    /// Number of edges with both endpoints in `mask`.
    pub fn induced_edge_count(&self, mask: u64) -> usize {
        bits(mask)
            .map(|v| (self.adj[v] & mask).count_ones() as usize)
            .sum::<usize>()
            / 2
    }

    /// Subgraph induced by `vertices`; vertex `i` of the result is `vertices[i]`.
    pub fn induced_subgraph(&self, vertices: &[usize]) -> Self {
        let adj = vertices
            .iter()
            .map(|&u| {
                vertices
                    .iter()
                    .enumerate()
                    .filter(|&(_, &v)| self.has_edge(u, v))
                    .fold(0u64, |row, (i, _)| row | bit(i))
            })
            .collect();
        Self::from_adj(adj)
    }

    /// The complement graph on the same vertex set.
    pub fn complement(&self) -> Self {
        let mask = all_bits(self.order());
        Self::from_adj(
            self.adj
                .iter()
                .enumerate()
                .map(|(v, &row)| !row & mask & !bit(v))
                .collect(),
        )
    }

    /// Relabels every vertex `v` as `perm.apply(v)`.
    ///
    /// # Panics
    /// Panics if the permutation is not defined on exactly this graph's vertices.
    pub fn permute(&self, perm: &Permutation) -> Self {
        assert_eq!(perm.len(), self.order(), "permutation size mismatch");
        let mut adj = vec![0u64; self.order()];
        for (u, &row) in self.adj.iter().enumerate() {
            adj[perm.apply(u)] = bits(row).fold(0u64, |acc, v| acc | bit(perm.apply(v)));
        }
        Self::from_adj(adj)
    }

    /// Connected components as vertex bitsets, ordered by smallest vertex.
    pub fn components(&self) -> Vec<u64> {
        let mut unseen = all_bits(self.order());
        let mut out = Vec::new();
        while unseen != 0 {
            let root = unseen.trailing_zeros() as usize;
            let mut component = bit(root);
            let mut frontier = bit(root);
            while frontier != 0 {
                let w = frontier.trailing_zeros() as usize;
                frontier &= frontier - 1;
                let fresh = self.adj[w] & !component;
                component |= fresh;
                frontier |= fresh;
            }
            unseen &= !component;
            out.push(component);
        }
        out
    }

    /// Toggles the edge `(u, v)` in place.
    ///
    /// Only the search engine mutates graphs (its color classes); everything public
    /// treats `Graph` as immutable.
    #[inline]
    pub(crate) fn flip_edge(&mut self, u: usize, v: usize) {
        debug_assert!(u < self.order() && v < self.order());
        debug_assert!(u != v);
        if self.adj[u] & bit(v) == 0 {
            self.edge_count += 1;
        } else {
            self.edge_count -= 1;
        }
        self.adj[u] ^= bit(v);
        self.adj[v] ^= bit(u);
    }

    /// Renders the graph in DOT language.
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = format!("graph {name} {{\n");
        for v in (0..self.order()).filter(|&v| self.adj[v] == 0) {
            out.push_str(&format!("    {v};\n"));
        }
        for (u, v) in self.edges() {
            out.push_str(&format!("    {u} -- {v};\n"));
        }
        out.push('}');
        out
    }
}

impl fmt::Display for Graph {
    /// `K<n>` for complete graphs, `<n>:<u>-<v>,...` otherwise; both forms parse back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete() && self.order() > 0 {
            return write!(f, "K{}", self.order());
        }
        write!(f, "{}:", self.order())?;
        for (i, (u, v)) in self.edges().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{u}-{v}")?;
        }
        Ok(())
    }
}

impl FromStr for Graph {
    type Err = GraphError;

    /// Parses a named family (`K4`, `C5`, `P3`, `S3`, `E2`) or an explicit edge list
    /// `5:0-1,1-2,2-3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || GraphError::UnknownName(s.to_string());

        if let Some((order, list)) = s.split_once(':') {
            let n: usize = order.trim().parse().map_err(|_| unknown())?;
            let mut edges = Vec::new();
            for item in list.split(',').map(str::trim).filter(|item| !item.is_empty()) {
                let (u, v) = item.split_once('-').ok_or_else(unknown)?;
                let u = u.trim().parse().map_err(|_| unknown())?;
                let v = v.trim().parse().map_err(|_| unknown())?;
                edges.push((u, v));
            }
            return Self::new(n, edges);
        }

        let mut chars = s.chars();
        let family = chars.next().ok_or_else(unknown)?;
        let n: usize = chars.as_str().parse().map_err(|_| unknown())?;
        let order = if family.eq_ignore_ascii_case(&'s') { n.saturating_add(1) } else { n };
        if order > MAX_ORDER {
            return Err(GraphError::TooManyVertices { n: order });
        }
        match family.to_ascii_uppercase() {
            'K' => Ok(Self::complete(n)),
            'C' => Ok(Self::cycle(n)),
            'P' => Ok(Self::path(n)),
            'S' => Ok(Self::star(n)),
            'E' => Ok(Self::empty(n)),
            _ => Err(unknown()),
        }
    }
}

// ============================================================================
// Target files
// ============================================================================

/// Reads a target graph from a `0/1` adjacency matrix.
///
/// Each non-blank line is one row, written packed (`0110`) or with whitespace between
/// entries (`0 1 1 0`). Text after `#` is a comment. A file without rows describes the
/// graph on zero vertices.
///
/// # Errors
/// Returns an error if a row has the wrong length or an entry other than `0`/`1`, the
/// diagonal has a `1`, the matrix is not symmetric, or it has more than 64 rows.
pub fn parse_adjacency_matrix(text: &str) -> Result<Graph, GraphError> {
    let rows = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(row, line)| matrix_row(row, line))
        .collect::<Result<Vec<Vec<bool>>, _>>()?;

    let n = rows.len();
    if n > MAX_ORDER {
        return Err(GraphError::TooManyVertices { n });
    }
    if let Some((row, entries)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(GraphError::MatrixRow {
            row,
            len: entries.len(),
            expected: n,
        });
    }
    if let Some(vertex) = (0..n).find(|&v| rows[v][v]) {
        return Err(GraphError::SelfLoop { vertex });
    }
    if let Some((u, v)) = (0..n).tuple_combinations().find(|&(u, v)| rows[u][v] != rows[v][u]) {
        return Err(GraphError::Asymmetric { u, v });
    }
    Graph::new(n, (0..n).tuple_combinations().filter(|&(u, v)| rows[u][v]))
}

fn matrix_row(row: usize, line: &str) -> Result<Vec<bool>, GraphError> {
    let entry = |token: &str| match token {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(GraphError::MatrixEntry {
            row,
            entry: token.to_string(),
        }),
    };
    if line.contains(char::is_whitespace) {
        line.split_whitespace().map(entry).collect()
    } else {
        line.char_indices()
            .map(|(i, c)| entry(&line[i..i + c.len_utf8()]))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn new_rejects_out_of_range_endpoint() {
        let err = Graph::new(3, [(0, 1), (1, 3)]).unwrap_err();
        assert_eq!(err, GraphError::EndpointOutOfRange { u: 1, v: 3, n: 3 });
    }

    #[test]
    fn new_rejects_self_loop() {
        let err = Graph::new(3, [(2, 2)]).unwrap_err();
        assert_eq!(err, GraphError::SelfLoop { vertex: 2 });
    }

    #[test]
    fn new_rejects_duplicate_in_either_orientation() {
        let err = Graph::new(4, [(0, 1), (2, 3), (1, 0)]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateEdge { u: 0, v: 1 });
    }

    #[test]
    fn new_rejects_too_many_vertices() {
        let err = Graph::new(65, []).unwrap_err();
        assert_eq!(err, GraphError::TooManyVertices { n: 65 });
    }

    #[test]
    fn structural_equality_ignores_edge_listing_order() {
        let a = Graph::new(4, [(0, 1), (2, 3)]).unwrap();
        let b = Graph::new(4, [(3, 2), (1, 0)]).unwrap();
        assert_eq!(a, b);
        let c = Graph::new(4, [(0, 2), (1, 3)]).unwrap();
        assert_ne!(a, c);
    }

    // -------------------------------------------------------------------------
    // Named families
    // -------------------------------------------------------------------------

    #[test]
    fn complete_graph_properties() {
        let g = Graph::complete(5);
        assert_eq!(g.edge_count(), 10);
        assert!(g.is_complete());
        assert_eq!(g.degree_sequence(), vec![4; 5]);
    }

    #[test]
    fn cycle_path_and_star_shapes() {
        assert_eq!(Graph::cycle(5).degree_sequence(), vec![2; 5]);
        assert_eq!(Graph::path(4).degree_sequence(), vec![1, 1, 2, 2]);
        assert_eq!(Graph::star(3).degree_sequence(), vec![1, 1, 1, 3]);
        assert_eq!(Graph::cycle(2).edge_count(), 1);
        assert_eq!(Graph::empty(0).order(), 0);
    }

    #[test]
    fn from_str_named_and_explicit() {
        assert_eq!("K3".parse::<Graph>().unwrap(), Graph::complete(3));
        assert_eq!("c4".parse::<Graph>().unwrap(), Graph::cycle(4));
        assert_eq!("S2".parse::<Graph>().unwrap(), Graph::path(3).permute(
            &Permutation::new([1, 0, 2]).unwrap()
        ));
        assert_eq!("E3".parse::<Graph>().unwrap(), Graph::empty(3));
        let g: Graph = "4:0-1, 1-2".parse().unwrap();
        assert_eq!(g, Graph::new(4, [(0, 1), (1, 2)]).unwrap());
        assert_eq!("3:".parse::<Graph>().unwrap(), Graph::empty(3));
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!(matches!("X3".parse::<Graph>(), Err(GraphError::UnknownName(_))));
        assert!(matches!("K".parse::<Graph>(), Err(GraphError::UnknownName(_))));
        assert!(matches!("3:0-".parse::<Graph>(), Err(GraphError::UnknownName(_))));
        assert!(matches!("3:0-3".parse::<Graph>(), Err(GraphError::EndpointOutOfRange { .. })));
        assert!(matches!("K70".parse::<Graph>(), Err(GraphError::TooManyVertices { n: 70 })));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let mut rng = XorShiftRng::seed_from_u64(0x5EED);
        for n in 0..9 {
            let g = Graph::new_random(&mut rng, n, 0.5);
            let back: Graph = g.to_string().parse().unwrap();
            assert_eq!(g, back);
        }
        assert_eq!(Graph::complete(4).to_string(), "K4");
    }

    // -------------------------------------------------------------------------
    // Derived views
    // -------------------------------------------------------------------------

    #[test]
    fn handshaking_lemma_holds() {
        let mut rng = XorShiftRng::seed_from_u64(42);
        for _ in 0..10 {
            let g = Graph::new_random(&mut rng, 32, 0.25);
            let sum: usize = g.degree_sequence().iter().sum();
            assert_eq!(sum, 2 * g.edge_count());
            assert_eq!(g.edges().count(), g.edge_count());
        }
    }

    #[test]
    fn edges_are_lexicographic_and_ordered() {
        let g = Graph::new(4, [(3, 1), (0, 2), (2, 1)]).unwrap();
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![(0, 2), (1, 2), (1, 3)]);
    }

    #[test]
    fn complement_partitions_complete_graph() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let g = Graph::new_random(&mut rng, 11, 0.4);
        let c = g.complement();
        assert_eq!(g.edge_count() + c.edge_count(), choose2(11));
        for (u, v) in g.edges() {
            assert!(!c.has_edge(u, v));
        }
        assert_eq!(c.complement(), g);
    }

    #[test]
    fn induced_subgraph_relabels_in_given_order() {
        let g = Graph::cycle(5);
        let h = g.induced_subgraph(&[4, 0, 1]);
        assert_eq!(h, Graph::path(3));
        assert_eq!(g.induced_edge_count(bit(4) | bit(0) | bit(1)), 2);
    }

    #[test]
    fn permute_preserves_degrees_and_edge_count() {
        let mut rng = XorShiftRng::seed_from_u64(0xBEEF);
        for _ in 0..50 {
            let g = Graph::new_random(&mut rng, 12, 0.3);
            let p = Permutation::random(&mut rng, 12);
            let h = g.permute(&p);
            assert_eq!(h.edge_count(), g.edge_count());
            assert_eq!(h.degree_sequence(), g.degree_sequence());
            for (u, v) in g.edges() {
                assert!(h.has_edge(p.apply(u), p.apply(v)));
            }
            assert_eq!(h.permute(&p.inverse()), g);
        }
    }

    #[test]
    fn components_of_disjoint_pieces() {
        let g = Graph::new(7, [(0, 1), (1, 2), (4, 5)]).unwrap();
        let sizes: Vec<u32> = g.components().iter().map(|c| c.count_ones()).collect();
        assert_eq!(sizes, vec![3, 1, 2, 1]);
        assert!(Graph::empty(0).components().is_empty());
    }

    #[test]
    fn flip_edge_is_reversible() {
        let mut rng = XorShiftRng::seed_from_u64(0xF11B);
        let orig = Graph::new_random(&mut rng, 10, 0.4);
        let mut g = orig.clone();
        g.flip_edge(3, 7);
        assert_ne!(g, orig);
        assert_eq!(g.has_edge(3, 7), !orig.has_edge(3, 7));
        assert_eq!(g.edge_count().abs_diff(orig.edge_count()), 1);
        g.flip_edge(7, 3);
        assert_eq!(g, orig);
    }

    #[test]
    fn to_dot_lists_isolated_vertices_and_edges() {
        let g = Graph::new(3, [(0, 2)]).unwrap();
        assert_eq!(g.to_dot("g"), "graph g {\n    1;\n    0 -- 2;\n}");
    }

    // -------------------------------------------------------------------------
    // Target files
    // -------------------------------------------------------------------------

    #[test]
    fn matrix_forms_agree() {
        let packed = "# C4\n0101\n1010\n0101\n1010\n";
        let spaced = "0 1 0 1\n1 0 1 0  # vertex 1\n\n0 1 0 1\n1 0 1 0\n";
        assert_eq!(parse_adjacency_matrix(packed).unwrap(), Graph::cycle(4));
        assert_eq!(parse_adjacency_matrix(spaced).unwrap(), Graph::cycle(4));
        assert_eq!(parse_adjacency_matrix("# nothing\n").unwrap(), Graph::empty(0));
    }

    #[test]
    fn matrix_of_random_graph() {
        let mut rng = XorShiftRng::seed_from_u64(0x1234);
        let g = Graph::new_random(&mut rng, 10, 0.3);
        let text: String = (0..10)
            .map(|u| (0..10).map(|v| if g.has_edge(u, v) { "1 " } else { "0 " }).collect::<String>() + "\n")
            .collect();
        assert_eq!(parse_adjacency_matrix(&text).unwrap(), g);
    }

    #[test]
    fn malformed_matrices_are_rejected() {
        assert_eq!(
            parse_adjacency_matrix("010\n10\n").unwrap_err(),
            GraphError::MatrixRow { row: 0, len: 3, expected: 2 }
        );
        assert_eq!(
            parse_adjacency_matrix("0 2\n1 0\n").unwrap_err(),
            GraphError::MatrixEntry { row: 0, entry: "2".to_string() }
        );
        assert_eq!(parse_adjacency_matrix("10\n01\n").unwrap_err(), GraphError::SelfLoop { vertex: 0 });
        assert_eq!(
            parse_adjacency_matrix("010\n000\n000\n").unwrap_err(),
            GraphError::Asymmetric { u: 0, v: 1 }
        );
    }

    // -------------------------------------------------------------------------
    // Lookup tables
    // -------------------------------------------------------------------------

    #[test]
    fn choose2_lookup_is_correct() {
        for n in 0usize..65 {
            let expected = (n * n.saturating_sub(1)) / 2;
            assert_eq!(choose2(n), expected, "choose2({n}) mismatch");
        }
    }

    #[test]
    fn all_bits_mask_correctness() {
        assert_eq!(all_bits(0), 0);
        assert_eq!(all_bits(1), 1);
        assert_eq!(all_bits(32), 0xFFFF_FFFF);
        assert_eq!(all_bits(64), u64::MAX);
        assert_eq!(bits(0b1010_0001).collect::<Vec<_>>(), vec![0, 5, 7]);
    }
}
