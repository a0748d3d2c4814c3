//! Threshold sweep: searches successive orders until colorings stop existing.
//!
//! When every rule is hereditary (forbidden subgraphs, defective cliques, defect bounds
//! without tolerated defects) the existence of a valid coloring is monotone in `n`: deleting
//! a vertex keeps a coloring valid. The first order without one is then the generalized
//! Ramsey number. The sweep walks upward from `min_order`; if that first order already
//! fails it walks downward until an order succeeds.
//!
//! Defect bounds that tolerate defects are not monotone: two colors that may each keep one
//! non-singleton component fail on 2 and 3 vertices but succeed on 4. For such specs every
//! order from `min_order` to `max_order` is searched, and the reported number is the order
//! after the last one that admits a coloring (`min_order` if none does, nothing if
//! `max_order` does).

use crate::coloring::Coloring;
use crate::error::RamseyError;
use crate::graph::MAX_ORDER;
use crate::search::{
    enumerate_colorings, search_with, CancelToken, SearchConfig, SearchResult, SearchSpec,
};

/// Sweep configuration.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// First order to search.
    pub min_order: usize,
    /// Give up after this order.
    pub max_order: usize,
    /// Count colorings up to isomorphism at every order.
    pub count_per_order: bool,
    /// Report every extremal coloring up to isomorphism instead of one witness.
    pub all_extremals: bool,
    /// Settings for each individual search.
    pub search: SearchConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            min_order: 0,
            max_order: MAX_ORDER,
            count_per_order: false,
            all_extremals: false,
            search: SearchConfig::default(),
        }
    }
}

/// What the sweep learned about one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderSummary {
    /// Number of vertices.
    pub order: usize,
    /// Whether a valid coloring exists.
    pub found: bool,
    /// Number of valid colorings up to isomorphism, when counted.
    pub count: Option<usize>,
}

/// Result of a threshold sweep.
#[derive(Clone, Debug, Default)]
pub struct Threshold {
    /// Smallest order without a valid coloring, if reached. For specs that are not
    /// hereditary, the smallest order from which no searched order admits one.
    pub ramsey_number: Option<usize>,
    /// A valid coloring on `ramsey_number - 1` vertices.
    pub witness: Option<Coloring>,
    /// Every valid coloring on `ramsey_number - 1` vertices up to isomorphism, when requested.
    pub extremals: Vec<Coloring>,
    /// One entry per searched order, in increasing order.
    pub per_order: Vec<OrderSummary>,
    /// The sweep stopped because the token was tripped.
    pub cancelled: bool,
}

/// Result of probing one order.
enum Probe {
    Found(Vec<Coloring>),
    NotFound,
    Cancelled,
}

/// Sweeps orders to find the threshold for `k` colors and `spec`.
///
/// # Errors
/// Returns [`RamseyError::InvalidParameters`] if the order range is empty or too large, or
/// any error from the underlying searches.
pub fn find_threshold(
    k: usize,
    spec: &SearchSpec,
    cfg: &DriverConfig,
    cancel: &CancelToken,
) -> Result<Threshold, RamseyError> {
    if cfg.max_order > MAX_ORDER {
        return Err(RamseyError::params(format!(
            "max order {} exceeds the supported maximum of {MAX_ORDER}",
            cfg.max_order
        )));
    }
    if cfg.min_order > cfg.max_order {
        return Err(RamseyError::params(format!(
            "min order {} is above max order {}",
            cfg.min_order, cfg.max_order
        )));
    }

    log::info!("Finding {spec} with {k} colors");
    let mut out = Threshold::default();
    let last_found = if spec.is_hereditary() {
        sweep_upward(k, spec, cfg, cancel, &mut out)?
    } else {
        log::warn!(
            "{spec} is not monotone in the order; searching every order from {} to {}",
            cfg.min_order,
            cfg.max_order
        );
        sweep_every_order(k, spec, cfg, cancel, &mut out)?
    };

    out.per_order.sort_by_key(|s| s.order);
    if let (Some(r), Some(colorings)) = (out.ramsey_number, last_found) {
        log::info!("{spec} = {r}");
        out.witness = colorings.first().cloned();
        if cfg.all_extremals {
            out.extremals = colorings;
        }
    }
    Ok(out)
}

/// Walks up from `min_order` and stops at the first order without a coloring. Returns the
/// colorings of the order below the threshold.
fn sweep_upward(
    k: usize,
    spec: &SearchSpec,
    cfg: &DriverConfig,
    cancel: &CancelToken,
    out: &mut Threshold,
) -> Result<Option<Vec<Coloring>>, RamseyError> {
    let mut last_found = None;
    let mut n = cfg.min_order;
    loop {
        match probe(n, k, spec, cfg, cancel, out)? {
            Probe::Cancelled => {
                out.cancelled = true;
                return Ok(None);
            }
            Probe::Found(colorings) => {
                if n == cfg.max_order {
                    log::info!("no threshold up to order {n}");
                    return Ok(None);
                }
                last_found = Some(colorings);
                n += 1;
            }
            Probe::NotFound if last_found.is_none() && n > 0 => {
                // Walk down until some order admits a coloring.
                let mut low = n - 1;
                loop {
                    match probe(low, k, spec, cfg, cancel, out)? {
                        Probe::Cancelled => {
                            out.cancelled = true;
                            return Ok(None);
                        }
                        Probe::Found(colorings) => {
                            out.ramsey_number = Some(low + 1);
                            return Ok(Some(colorings));
                        }
                        Probe::NotFound if low == 0 => {
                            out.ramsey_number = Some(0);
                            return Ok(None);
                        }
                        Probe::NotFound => low -= 1,
                    }
                }
            }
            Probe::NotFound => {
                out.ramsey_number = Some(n);
                return Ok(last_found);
            }
        }
    }
}

/// Searches every order in range. Returns the colorings of the last order that has any,
/// when a later order in range has none.
fn sweep_every_order(
    k: usize,
    spec: &SearchSpec,
    cfg: &DriverConfig,
    cancel: &CancelToken,
    out: &mut Threshold,
) -> Result<Option<Vec<Coloring>>, RamseyError> {
    let mut last = None;
    for n in cfg.min_order..=cfg.max_order {
        match probe(n, k, spec, cfg, cancel, out)? {
            Probe::Cancelled => {
                out.cancelled = true;
                return Ok(None);
            }
            Probe::Found(colorings) => last = Some((n, colorings)),
            Probe::NotFound => {}
        }
    }
    match last {
        Some((n, _)) if n == cfg.max_order => {
            log::info!("colorings exist up to order {n}");
            Ok(None)
        }
        Some((n, colorings)) => {
            out.ramsey_number = Some(n + 1);
            Ok(Some(colorings))
        }
        None => {
            out.ramsey_number = Some(cfg.min_order);
            Ok(None)
        }
    }
}

fn probe(
    n: usize,
    k: usize,
    spec: &SearchSpec,
    cfg: &DriverConfig,
    cancel: &CancelToken,
    out: &mut Threshold,
) -> Result<Probe, RamseyError> {
    let probe = if cfg.count_per_order || cfg.all_extremals {
        let e = enumerate_colorings(n, k, spec, &cfg.search, cancel)?;
        if !e.complete {
            Probe::Cancelled
        } else if e.colorings.is_empty() {
            Probe::NotFound
        } else {
            Probe::Found(e.colorings)
        }
    } else {
        match search_with(n, k, spec, &cfg.search, cancel)?.result {
            SearchResult::Found(coloring) => Probe::Found(vec![coloring]),
            SearchResult::NotFound => Probe::NotFound,
            SearchResult::Cancelled => Probe::Cancelled,
        }
    };

    match &probe {
        Probe::Found(colorings) => {
            let count = cfg.count_per_order.then_some(colorings.len());
            match count {
                Some(c) => log::info!("order {n}: {c} valid colorings"),
                None => log::info!("order {n}: found"),
            }
            out.per_order.push(OrderSummary {
                order: n,
                found: true,
                count,
            });
        }
        Probe::NotFound => {
            log::info!("order {n}: none");
            out.per_order.push(OrderSummary {
                order: n,
                found: false,
                count: cfg.count_per_order.then_some(0),
            });
        }
        Probe::Cancelled => log::info!("order {n}: cancelled"),
    }
    Ok(probe)
}
