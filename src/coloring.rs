//! Edge colorings of `K_n`: the fixed edge order, the `Coloring` value, and its text format.
//!
//! Listing format:
//!
//! ```text
//! # optional comments
//! order 5 colors 2
//! 0 1 1
//! 0 2 0
//! 1 2 1
//! ...
//! ```
//!
//! Every pair `u < v` appears exactly once, with a color in `0..colors`. Pairs may appear in
//! any order; [`Coloring::write_listing`] emits them in [`EdgeOrder`].

use crate::canon::{canonical_labeling, canonical_signature, EdgeLabels, Signature};
use crate::error::RamseyError;
use crate::graph::{bit, choose2, Graph, GraphError, MAX_ORDER};
use crate::permutation::Permutation;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Largest supported number of colors (labels `c + 1` must fit in a `u8`).
pub const MAX_COLORS: usize = 255;

const DOT_PALETTE: [&str; 8] = [
    "red", "blue", "darkgreen", "orange", "purple", "brown", "cyan", "magenta",
];

// ============================================================================
// Edge order
// ============================================================================

/// Colex order on the pairs of `0..n`: `(0,1), (0,2), (1,2), (0,3), (1,3), ...`.
///
/// The first `choose2(j)` edges are exactly the edges of the complete graph on `0..j`, so a
/// search that colors edges in this order finishes a whole `K_j` before touching vertex `j`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeOrder {
    order: usize,
}

impl EdgeOrder {
    /// Edge order on `K_order`.
    pub const fn new(order: usize) -> Self {
        Self { order }
    }

    /// Number of vertices.
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Number of edges.
    pub const fn len(&self) -> usize {
        choose2(self.order)
    }

    /// Whether there are no edges (`order < 2`).
    pub const fn is_empty(&self) -> bool {
        self.order < 2
    }

    /// Position of the pair `{u, v}`.
    #[inline(always)]
    pub fn index(&self, u: usize, v: usize) -> usize {
        let (a, b) = if u < v { (u, v) } else { (v, u) };
        debug_assert!(a != b && b < self.order);
        choose2(b) + a
    }

    /// Pair at position `index`, smaller endpoint first.
    pub fn edge(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.len());
        let mut b = 1;
        while choose2(b + 1) <= index {
            b += 1;
        }
        (index - choose2(b), b)
    }

    /// All pairs in order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> {
        (1..self.order).flat_map(|b| (0..b).map(move |a| (a, b)))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while parsing a coloring listing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    /// No `order <n> colors <k>` line before the edges.
    #[error("missing `order <n> colors <k>` header")]
    MissingHeader,
    /// Header present but unreadable, or the color count is out of range.
    #[error("line {line}: malformed header {text:?}")]
    BadHeader {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// An edge line is not three integers.
    #[error("line {line}: expected `<u> <v> <color>`, found {text:?}")]
    BadLine {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// The pair is not an edge of `K_n`, or the order is too large.
    #[error("line {line}: {source}")]
    InvalidEdge {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the pair.
        source: GraphError,
    },
    /// Color index not below the declared number of colors.
    #[error("line {line}: color {color} is not below {num_colors}")]
    ColorOutOfRange {
        /// 1-based line number.
        line: usize,
        /// Offending color.
        color: usize,
        /// Declared number of colors.
        num_colors: usize,
    },
    /// A pair is colored twice.
    #[error("line {line}: edge ({u}, {v}) is colored twice")]
    DuplicateEdge {
        /// 1-based line number.
        line: usize,
        /// Smaller endpoint.
        u: usize,
        /// Larger endpoint.
        v: usize,
    },
    /// A pair is never colored.
    #[error("edge ({u}, {v}) has no color")]
    MissingEdge {
        /// Smaller endpoint.
        u: usize,
        /// Larger endpoint.
        v: usize,
    },
}

// ============================================================================
// Coloring
// ============================================================================

/// A complete edge coloring of `K_order` with colors `0..num_colors`.
///
/// `colors[i]` is the color of the `i`-th pair in [`EdgeOrder`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Coloring {
    order: usize,
    num_colors: usize,
    colors: Vec<u8>,
}

impl Coloring {
    /// Builds a coloring from one color per pair, listed in [`EdgeOrder`].
    ///
    /// # Errors
    /// Returns an error if `order > 64`, `num_colors` is not in `1..=255`, the number of
    /// colors given does not match the number of pairs, or a color is out of range.
    pub fn new(order: usize, num_colors: usize, colors: &[usize]) -> Result<Self, RamseyError> {
        if order > MAX_ORDER {
            return Err(GraphError::TooManyVertices { n: order }.into());
        }
        if num_colors == 0 || num_colors > MAX_COLORS {
            return Err(RamseyError::params(format!(
                "number of colors must be in 1..={MAX_COLORS}, got {num_colors}"
            )));
        }
        if colors.len() != choose2(order) {
            return Err(RamseyError::params(format!(
                "K{order} has {} edges, got {} colors",
                choose2(order),
                colors.len()
            )));
        }
        if let Some(&c) = colors.iter().find(|&&c| c >= num_colors) {
            return Err(RamseyError::params(format!(
                "color {c} is not below {num_colors}"
            )));
        }
        Ok(Self::from_raw(
            order,
            num_colors,
            colors.iter().map(|&c| c as u8).collect(),
        ))
    }

    /// Builds a coloring by asking `f(u, v)` (with `u < v`) for the color of every pair.
    ///
    /// # Errors
    /// Same conditions as [`Coloring::new`].
    pub fn from_fn<F>(order: usize, num_colors: usize, mut f: F) -> Result<Self, RamseyError>
    where
        F: FnMut(usize, usize) -> usize,
    {
        if order > MAX_ORDER {
            return Err(GraphError::TooManyVertices { n: order }.into());
        }
        let colors: Vec<usize> = EdgeOrder::new(order).edges().map(|(u, v)| f(u, v)).collect();
        Self::new(order, num_colors, &colors)
    }

    pub(crate) fn from_raw(order: usize, num_colors: usize, colors: Vec<u8>) -> Self {
        debug_assert_eq!(colors.len(), choose2(order));
        Self {
            order,
            num_colors,
            colors,
        }
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of colors.
    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Color of the pair `{u, v}`.
    #[inline]
    pub fn color(&self, u: usize, v: usize) -> usize {
        self.colors[EdgeOrder::new(self.order).index(u, v)] as usize
    }

    /// `((u, v), color)` for every pair, in [`EdgeOrder`].
    pub fn edges(&self) -> impl Iterator<Item = ((usize, usize), usize)> + '_ {
        EdgeOrder::new(self.order)
            .edges()
            .zip(self.colors.iter().map(|&c| c as usize))
    }

    /// The graph formed by the edges of color `c`.
    pub fn class(&self, c: usize) -> Graph {
        let mut adj = vec![0u64; self.order];
        for ((u, v), color) in self.edges() {
            if color == c {
                adj[u] |= bit(v);
                adj[v] |= bit(u);
            }
        }
        Graph::from_adj(adj)
    }

    /// All color classes, indexed by color.
    pub fn classes(&self) -> Vec<Graph> {
        (0..self.num_colors).map(|c| self.class(c)).collect()
    }

    /// Relabels vertex `v` as `perm.apply(v)`, keeping colors.
    ///
    /// # Panics
    /// Panics if the permutation size differs from the order.
    pub fn permute(&self, perm: &Permutation) -> Self {
        assert_eq!(perm.len(), self.order, "permutation size mismatch");
        let edge_order = EdgeOrder::new(self.order);
        let mut colors = vec![0u8; self.colors.len()];
        for ((u, v), i) in edge_order.edges().zip(0..) {
            colors[edge_order.index(perm.apply(u), perm.apply(v))] = self.colors[i];
        }
        Self::from_raw(self.order, self.num_colors, colors)
    }

    /// Isomorphism-invariant signature (vertex relabelings only; colors stay fixed).
    pub fn signature(&self) -> Signature {
        canonical_signature(self)
    }

    /// The canonical representative of this coloring's isomorphism class.
    pub fn canonical_form(&self) -> Self {
        let (_, perm) = canonical_labeling(self);
        self.permute(&perm)
    }

    // ------------------------------------------------------------------------
    // Listing I/O
    // ------------------------------------------------------------------------

    /// Writes the listing format described in the module docs.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_listing<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "order {} colors {}", self.order, self.num_colors)?;
        for ((u, v), c) in self.edges() {
            writeln!(w, "{u} {v} {c}")?;
        }
        Ok(())
    }

    /// The listing as a string.
    pub fn to_listing(&self) -> String {
        let mut out = format!("order {} colors {}\n", self.order, self.num_colors);
        for ((u, v), c) in self.edges() {
            let _ = writeln!(out, "{u} {v} {c}");
        }
        out
    }

    /// Saves the listing to a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, filename: impl AsRef<Path>) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(filename)?);
        self.write_listing(&mut w)?;
        w.flush()
    }

    /// Parses the listing format.
    ///
    /// # Errors
    /// Returns an error on a missing or malformed header, malformed lines, invalid pairs,
    /// out-of-range colors, and duplicate or missing pairs.
    pub fn parse_listing(text: &str) -> Result<Self, ListingError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.split('#').next().unwrap_or("").trim()))
            .filter(|(_, l)| !l.is_empty());

        let (line, header) = lines.next().ok_or(ListingError::MissingHeader)?;
        let bad_header = || ListingError::BadHeader {
            line,
            text: header.to_string(),
        };
        let fields: Vec<&str> = header.split_whitespace().collect();
        let (order, num_colors) = match fields.as_slice() {
            ["order", n, "colors", k] => (
                n.parse::<usize>().map_err(|_| bad_header())?,
                k.parse::<usize>().map_err(|_| bad_header())?,
            ),
            _ if fields.first().is_some_and(|f| f.parse::<usize>().is_ok()) => {
                return Err(ListingError::MissingHeader)
            }
            _ => return Err(bad_header()),
        };
        if num_colors == 0 || num_colors > MAX_COLORS {
            return Err(bad_header());
        }
        if order > MAX_ORDER {
            return Err(ListingError::InvalidEdge {
                line,
                source: GraphError::TooManyVertices { n: order },
            });
        }

        let edge_order = EdgeOrder::new(order);
        let mut colors: Vec<Option<u8>> = vec![None; edge_order.len()];
        for (line, text) in lines {
            let bad_line = || ListingError::BadLine {
                line,
                text: text.to_string(),
            };
            let nums = text
                .split_whitespace()
                .map(str::parse::<usize>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| bad_line())?;
            let [u, v, c] = nums[..] else {
                return Err(bad_line());
            };
            if u >= order || v >= order {
                let source = GraphError::EndpointOutOfRange { u, v, n: order };
                return Err(ListingError::InvalidEdge { line, source });
            }
            if u == v {
                let source = GraphError::SelfLoop { vertex: u };
                return Err(ListingError::InvalidEdge { line, source });
            }
            if c >= num_colors {
                return Err(ListingError::ColorOutOfRange {
                    line,
                    color: c,
                    num_colors,
                });
            }
            let slot = &mut colors[edge_order.index(u, v)];
            if slot.is_some() {
                return Err(ListingError::DuplicateEdge {
                    line,
                    u: u.min(v),
                    v: u.max(v),
                });
            }
            *slot = Some(c as u8);
        }

        let colors = colors
            .into_iter()
            .zip(edge_order.edges())
            .map(|(c, (u, v))| c.ok_or(ListingError::MissingEdge { u, v }))
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self::from_raw(order, num_colors, colors))
    }

    /// Renders the coloring in DOT language, one edge color per class.
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = format!("graph {name} {{\n");
        if self.order == 1 {
            out.push_str("    0;\n");
        }
        for ((u, v), c) in self.edges() {
            let color = DOT_PALETTE[c % DOT_PALETTE.len()];
            let _ = writeln!(out, "    {u} -- {v} [color={color}, label={c}];");
        }
        out.push('}');
        out
    }
}

impl EdgeLabels for Coloring {
    fn order(&self) -> usize {
        self.order
    }

    #[inline]
    fn label(&self, u: usize, v: usize) -> u8 {
        self.colors[EdgeOrder::new(self.order).index(u, v)] + 1
    }
}

// ============================================================================
// Tests
// ============================================================================
