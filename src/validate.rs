//! Fast deterministic validation of colorings, including the bundled lower-bound witnesses.

use crate::coloring::{Coloring, ListingError};
use crate::graph::Graph;
use crate::matcher::{find_forbidden, large_components, ClassConstraint, DefectiveClique};
use crate::search::SearchSpec;

/// Reasons a coloring fails validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The listing could not be parsed.
    #[error("{name}: {source}")]
    Listing {
        /// Name of the listing (usually a file name).
        name: String,
        /// Parse failure.
        source: ListingError,
    },
    /// The coloring and the rules disagree on the number of colors.
    #[error("coloring uses {got} colors, but {expected} rules were given")]
    ColorCount {
        /// Number of rules.
        expected: usize,
        /// Number of colors in the coloring.
        got: usize,
    },
    /// A class contains its forbidden graph.
    #[error("color {color} contains {target} on vertices {vertices:?}")]
    Forbidden {
        /// Offending color.
        color: usize,
        /// The forbidden graph.
        target: Graph,
        /// Host vertex used for each target vertex.
        vertices: Vec<usize>,
    },
    /// A class has too many large components.
    #[error("color {color} has {large} components larger than {max_component_size} vertices (at most {max_defects} allowed)")]
    Defects {
        /// Offending color.
        color: usize,
        /// Number of oversized components.
        large: usize,
        /// Size bound.
        max_component_size: usize,
        /// Allowed number of oversized components.
        max_defects: usize,
    },
    /// A class contains a set too close to a clique.
    #[error("color {color} contains a {rule} set on vertices {vertices:?}")]
    DefectiveClique {
        /// Offending color.
        color: usize,
        /// The broken rule.
        rule: DefectiveClique,
        /// The set, in increasing order.
        vertices: Vec<usize>,
    },
    /// A named coloring failed.
    #[error("{name}: {source}")]
    Witness {
        /// Name of the coloring.
        name: String,
        /// Why it failed.
        source: Box<ValidationError>,
    },
}

// ============================================================================
// Public API
// ============================================================================

/// Validates the bundled witness colorings for:
/// - `R(K3, K3) > 5` via a 5-vertex coloring
/// - `R(K3, K4) > 8` via an 8-vertex coloring
///
/// # Errors
/// Returns an error if any bundled coloring fails validation.
pub fn validate_known_colorings() -> Result<(), ValidationError> {
    let k3 = Graph::complete(3);
    let k4 = Graph::complete(4);
    validate_listing(
        include_str!("../witnesses/r33_n5.txt"),
        "r33_n5.txt",
        &SearchSpec::Sparse(vec![k3.clone(), k3.clone()]),
    )?;
    validate_listing(
        include_str!("../witnesses/r34_n8.txt"),
        "r34_n8.txt",
        &SearchSpec::Sparse(vec![k3, k4]),
    )?;
    Ok(())
}

/// Parses a listing and validates it against `spec`.
///
/// # Errors
/// Returns an error if parsing fails or the coloring breaks a rule.
pub fn validate_listing(text: &str, name: &str, spec: &SearchSpec) -> Result<Coloring, ValidationError> {
    let coloring = Coloring::parse_listing(text).map_err(|source| ValidationError::Listing {
        name: name.to_string(),
        source,
    })?;
    validate_coloring(&coloring, spec).map_err(|e| ValidationError::Witness {
        name: name.to_string(),
        source: Box::new(e),
    })?;
    Ok(coloring)
}

/// Checks every color class of `coloring` against its rule in `spec`.
///
/// # Errors
/// Returns the first violation found, with the offending vertices where available.
pub fn validate_coloring(coloring: &Coloring, spec: &SearchSpec) -> Result<(), ValidationError> {
    if coloring.num_colors() != spec.len() {
        return Err(ValidationError::ColorCount {
            expected: spec.len(),
            got: coloring.num_colors(),
        });
    }

    for (color, rule) in spec.constraints().into_iter().enumerate() {
        let class = coloring.class(color);
        match rule {
            ClassConstraint::Forbidden(target) => {
                if let Some(vertices) = find_forbidden(&class, &target) {
                    return Err(ValidationError::Forbidden {
                        color,
                        target,
                        vertices,
                    });
                }
            }
            ClassConstraint::Defective(bound) => {
                let large = large_components(&class, bound.max_component_size);
                if large > bound.max_defects {
                    return Err(ValidationError::Defects {
                        color,
                        large,
                        max_component_size: bound.max_component_size,
                        max_defects: bound.max_defects,
                    });
                }
            }
            ClassConstraint::DefectiveClique(rule) => {
                if let Some(vertices) = rule.find_in(&class) {
                    return Err(ValidationError::DefectiveClique { color, rule, vertices });
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
