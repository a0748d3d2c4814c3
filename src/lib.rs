//! # Generalized Ramsey Search
//!
//! Exhaustive computation of generalized Ramsey numbers: the smallest `n` such that every
//! `k`-coloring of the edges of `K_n` has some color class `i` containing the target graph
//! `G_i`. A divided variant replaces the targets by bounds on how many large connected
//! components each class may have, and the defective-clique variants forbid vertex sets
//! that are cliques of a class up to a few missing edges.
//!
//! This crate provides:
//! - Compact bitset graphs on up to 64 vertices, with parsing and DOT output.
//! - A canonical labeling for graphs and (partial) edge colorings, used to skip
//!   isomorphic branches of the search.
//! - An exact clique oracle and a general subgraph matcher for the forbidden targets.
//! - A backtracking search over edge colorings, sequential or split across workers.
//! - A driver that sweeps orders to find the threshold and the extremal colorings.
//!
//! ## Quick Start
//!
//! ```
//! use genramsey::prelude::*;
//!
//! let k3: Graph = "K3".parse().unwrap();
//! let spec = SearchSpec::Sparse(vec![k3.clone(), k3]);
//!
//! // K5 can be 2-colored without a monochromatic triangle; K6 cannot.
//! assert!(search(5, 2, &spec).unwrap().is_found());
//! assert_eq!(search(6, 2, &spec).unwrap(), SearchResult::NotFound);
//! ```
//!
//! ## Finding a Threshold
//!
//! ```
//! use genramsey::prelude::*;
//!
//! let c4: Graph = "C4".parse().unwrap();
//! let spec = SearchSpec::Sparse(vec![c4.clone(), c4]);
//! let threshold = find_threshold(2, &spec, &DriverConfig::default(), &CancelToken::new()).unwrap();
//! assert_eq!(threshold.ramsey_number, Some(6));
//! ```
//!
//! ## Validating Known Witnesses
//!
//! ```
//! use genramsey::validate::validate_known_colorings;
//!
//! // Validate bundled witness colorings
//! validate_known_colorings().expect("all witnesses should be valid");
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Bitset graphs, named families and adjacency-matrix target files.
//! - [`permutation`]: Vertex relabelings.
//! - [`canon`]: Canonical signatures and isomorphism tests.
//! - [`clique`]: Exact clique oracle with coloring bounds.
//! - [`matcher`]: Forbidden-subgraph, defect-bound and defective-clique checks per color
//!   class.
//! - [`coloring`]: Edge colorings, the edge order and the listing format.
//! - [`search`]: The backtracking search.
//! - [`driver`]: Threshold sweeps over orders.
//! - [`validate`]: Deterministic validation of colorings.
//!
//! ## Performance Notes
//!
//! - Graphs use `u64` bitsets, limiting orders to 64 vertices.
//! - Complete targets go through the clique oracle, restricted to the common neighborhood
//!   of the edge just colored.
//! - For maximum performance, compile with: `RUSTFLAGS="-C target-cpu=native" cargo build --release`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for matrix indexing
#![allow(clippy::doc_markdown)] // Graph names like K3 and C4 in docs
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod canon;
pub mod clique;
pub mod coloring;
pub mod driver;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod permutation;
pub mod search;
pub mod validate;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::canon::{canonical_form, canonical_signature, is_isomorphic, Signature};
    pub use crate::coloring::{Coloring, EdgeOrder};
    pub use crate::driver::{find_threshold, DriverConfig, Threshold};
    pub use crate::error::RamseyError;
    pub use crate::graph::{parse_adjacency_matrix, Graph};
    pub use crate::matcher::{
        contains_forbidden, violates_defect_bound, ClassConstraint, DefectBound, DefectiveClique,
    };
    pub use crate::permutation::Permutation;
    pub use crate::search::{
        enumerate_colorings, search, search_with, CancelToken, SearchConfig, SearchResult,
        SearchSpec,
    };
    pub use crate::validate::validate_known_colorings;
}
