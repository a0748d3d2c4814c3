use clap::{Parser, Subcommand, ValueEnum};
use genramsey::driver::{find_threshold, DriverConfig, Threshold};
use genramsey::error::RamseyError;
use genramsey::graph::{parse_adjacency_matrix, Graph, GraphError};
use genramsey::matcher::DefectBound;
use genramsey::search::{CancelToken, SearchConfig, SearchSpec};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Computes generalized Ramsey numbers by exhaustive search over edge colorings.
#[derive(Parser, Debug)]
#[command(name = "genramsey", version)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// First order to search.
    #[arg(long, global = true, default_value_t = 0)]
    min_order: usize,

    /// Stop after this order.
    #[arg(long, global = true, default_value_t = 64)]
    max_order: usize,

    /// Worker threads (0 = one per core).
    #[arg(long, global = true, default_value_t = 1)]
    workers: usize,

    /// Edges colored up front to split work between workers.
    #[arg(long, global = true, default_value_t = 4)]
    split_depth: usize,

    /// Search every coloring instead of one per isomorphism class.
    #[arg(long, global = true)]
    no_isomorph_rejection: bool,

    /// Print every extremal coloring and per-order counts.
    #[arg(long, global = true)]
    all: bool,

    /// Output format for colorings.
    #[arg(long, global = true, value_enum, default_value_t = Format::Listing)]
    format: Format,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Cancel the sweep after this many seconds.
    #[arg(long, global = true)]
    time_limit: Option<f64>,

    /// Only log warnings.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log search progress.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Color class i must not contain TARGET i (K3, C4, P3, S3, E2, 5:0-1,1-2,... or
    /// @FILE holding an adjacency matrix).
    Sparse {
        #[arg(required = true, value_parser = target)]
        targets: Vec<Graph>,
    },
    /// Color class i may have at most DEFECTS components larger than SIZE vertices.
    Divided {
        #[arg(required = true, value_name = "SIZE:DEFECTS")]
        bounds: Vec<DefectBound>,
    },
    /// Color class i must not contain ORDER i vertices each missing at most K class edges
    /// among them.
    SparseSets {
        /// Missing edges tolerated per vertex.
        #[arg(short, default_value_t = 0)]
        k: usize,
        #[arg(required = true)]
        orders: Vec<usize>,
    },
    /// Color class i must not contain ORDER i vertices whose missing class edges form
    /// components of at most K vertices.
    DividedSets {
        /// Largest component of missing edges.
        #[arg(short, default_value_t = 1)]
        k: usize,
        #[arg(required = true)]
        orders: Vec<usize>,
    },
}

/// Parses a target name, or reads an adjacency matrix from `@<file>`.
fn target(arg: &str) -> Result<Graph, String> {
    match arg.strip_prefix('@') {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
            parse_adjacency_matrix(&text).map_err(|e| format!("{path}: {e}"))
        }
        None => arg.parse().map_err(|e: GraphError| e.to_string()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Listing,
    Dot,
}

fn logger(level: log::LevelFilter) {
    env_logger::builder()
        .format_module_path(false)
        .format_target(false)
        .filter_level(level)
        .init();
}

fn main() {
    let cli = Cli::parse();
    logger(if cli.quiet {
        log::LevelFilter::Warn
    } else if cli.verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    });

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("genramsey: {e}");
            match e {
                RamseyError::Io(_) => 1,
                _ => 2,
            }
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<i32, RamseyError> {
    let spec = match &cli.mode {
        Mode::Sparse { targets } => SearchSpec::Sparse(targets.clone()),
        Mode::Divided { bounds } => SearchSpec::Divided(bounds.clone()),
        Mode::SparseSets { k, orders } => SearchSpec::SparseSets {
            k: *k,
            orders: orders.clone(),
        },
        Mode::DividedSets { k, orders } => SearchSpec::DividedSets {
            k: *k,
            orders: orders.clone(),
        },
    };
    let workers = if cli.workers == 0 {
        thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    } else {
        cli.workers
    };
    let cfg = DriverConfig {
        min_order: cli.min_order,
        max_order: cli.max_order,
        count_per_order: cli.all,
        all_extremals: cli.all,
        search: SearchConfig {
            isomorph_rejection: !cli.no_isomorph_rejection,
            workers,
            split_depth: cli.split_depth,
            ..SearchConfig::default()
        },
    };

    let cancel = CancelToken::new();
    if let Some(secs) = cli.time_limit {
        let limit = Duration::try_from_secs_f64(secs)
            .map_err(|e| RamseyError::InvalidParameters(format!("bad time limit {secs}: {e}")))?;
        let trip = cancel.clone();
        thread::spawn(move || {
            thread::sleep(limit);
            trip.cancel();
        });
    }

    let threshold = find_threshold(spec.len(), &spec, &cfg, &cancel)?;
    let report = render(&spec, &threshold, cli.format);
    match &cli.output {
        Some(path) => std::fs::write(path, report)?,
        None => print!("{report}"),
    }

    if threshold.cancelled {
        eprintln!("genramsey: time limit reached before the sweep finished");
        return Ok(3);
    }
    Ok(0)
}

fn render(spec: &SearchSpec, threshold: &Threshold, format: Format) -> String {
    let mut out = String::new();
    let name = |i: usize| format!("coloring{i}");

    if threshold.per_order.iter().any(|s| s.count.is_some()) {
        let _ = writeln!(out, "Order & number of valid colorings:");
        for s in &threshold.per_order {
            let _ = writeln!(out, "{} {}", s.order, s.count.unwrap_or(0));
        }
        let _ = writeln!(out);
    }

    let shown: Vec<_> = if threshold.extremals.is_empty() {
        threshold.witness.iter().collect()
    } else {
        threshold.extremals.iter().collect()
    };
    if !threshold.extremals.is_empty() {
        let _ = writeln!(out, "{} extremal coloring(s):\n", threshold.extremals.len());
    }
    for (i, coloring) in shown.into_iter().enumerate() {
        match format {
            Format::Listing => out.push_str(&coloring.to_listing()),
            Format::Dot => {
                out.push_str(&coloring.to_dot(&name(i)));
                out.push('\n');
            }
        }
        let _ = writeln!(out);
    }

    match threshold.ramsey_number {
        Some(r) => {
            let _ = writeln!(out, "{spec} = {r}");
        }
        None if threshold.cancelled => {
            let _ = writeln!(out, "{spec}: cancelled");
        }
        None => {
            let last = threshold.per_order.last().map_or(0, |s| s.order);
            let _ = writeln!(out, "{spec} > {last}");
        }
    }
    out
}
