//! adgraph CLI: build, search, and evaluate weighted proximity graphs.
//!
//! `build` ingests points/queries CSV files into a graph snapshot, `search`
//! runs a single radius search against a snapshot, and `evaluate` scores a
//! strategy against the exact reference over every attached query.

mod ingest;
mod report;

use adgraph_core::config;
use adgraph_core::error::GraphError;
use adgraph_core::graph::GraphStore;
use adgraph_core::oracle;
use adgraph_core::search::{search, select_strategy, Strategy};
use adgraph_core::storage::{load_store, save_store};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adgraph", about = "Weighted proximity graph builder and radius search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a graph from CSV files and save a snapshot
    Build {
        /// Points CSV (node_id, feature_1..feature_D)
        #[arg(long)]
        points: PathBuf,

        /// Queries CSV (point_A, Y_vector, D[, A_vector]); omit to build
        /// only the KNN backbone
        #[arg(long)]
        queries: Option<PathBuf>,

        /// Neighbors per point in the KNN backbone
        #[arg(short, long, default_value_t = config::DEFAULT_K)]
        k: usize,

        /// Output snapshot path
        #[arg(long)]
        out: PathBuf,
    },

    /// Search for regular points within a weighted radius of a start node
    Search {
        /// Graph snapshot produced by `build`
        #[arg(long)]
        graph: PathBuf,

        /// Start node id (regular point or query)
        #[arg(long)]
        start: String,

        /// Search radius X
        #[arg(long)]
        radius: f64,

        /// Strategy: naive, bfs, priority, or hybrid
        #[arg(long, default_value = "hybrid")]
        strategy: String,

        /// Override weights as a ';'-separated vector; defaults to the start
        /// query's weights, or all ones for a regular start
        #[arg(long)]
        weights: Option<String>,

        /// How many matches to print (0 = all)
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Compare a strategy against the exact reference over every query
    Evaluate {
        /// Graph snapshot produced by `build`
        #[arg(long)]
        graph: PathBuf,

        /// Candidate strategy: naive, bfs, priority, or hybrid
        #[arg(long, default_value = "hybrid")]
        strategy: String,

        /// Search radius as a multiple of each query's build radius
        #[arg(long, default_value_t = 1.0)]
        radius_scale: f64,

        /// Write a per-query comparison CSV here
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write the candidate's full responses CSV here
        #[arg(long)]
        responses: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Build {
            points,
            queries,
            k,
            out,
        } => cmd_build(points, queries, k, out),
        Command::Search {
            graph,
            start,
            radius,
            strategy,
            weights,
            limit,
        } => cmd_search(graph, start, radius, &strategy, weights, limit),
        Command::Evaluate {
            graph,
            strategy,
            radius_scale,
            report,
            responses,
        } => cmd_evaluate(graph, &strategy, radius_scale, report, responses),
    }
}

fn cmd_build(
    points_path: PathBuf,
    queries_path: Option<PathBuf>,
    k: usize,
    out: PathBuf,
) -> Result<()> {
    let t = Instant::now();
    let points = ingest::load_points(&points_path)?;
    let load_elapsed = t.elapsed();
    tracing::info!(points = points.len(), elapsed = ?load_elapsed, "points loaded");

    let t = Instant::now();
    let mut store = GraphStore::build(points, k)?;
    let build_elapsed = t.elapsed();

    let mut query_edges = 0usize;
    let mut attach_elapsed = Duration::ZERO;
    if let Some(queries_path) = queries_path {
        let queries = ingest::load_queries(&queries_path, store.regular_points())?;
        let t = Instant::now();
        query_edges = store.attach_queries(queries)?;
        attach_elapsed = t.elapsed();
    }

    let t = Instant::now();
    save_store(&store, &out)?;
    let save_elapsed = t.elapsed();

    println!("Graph built: {}", out.display());
    println!("  regular points : {}", store.regular_count());
    println!("  queries        : {}", store.query_count());
    println!("  edges          : {}", store.edge_count());
    println!("  dimension      : {}", store.dimension());
    println!("  k              : {}", store.k());
    if store.query_count() > 0 {
        println!(
            "  avg query edges: {:.1}",
            query_edges as f64 / store.query_count() as f64
        );
    }
    println!(
        "  timings        : load {:.2?}, build {:.2?}, attach {:.2?}, save {:.2?}",
        load_elapsed, build_elapsed, attach_elapsed, save_elapsed
    );
    Ok(())
}

fn cmd_search(
    graph: PathBuf,
    start: String,
    radius: f64,
    strategy: &str,
    weights: Option<String>,
    limit: usize,
) -> Result<()> {
    let store = load_store(&graph)?;
    let strategy: Strategy = strategy.parse()?;

    let Some(node) = store.resolve(&start) else {
        return Err(GraphError::NodeNotFound(start).into());
    };
    let weights = match weights {
        Some(raw) => ingest::parse_vector(&raw, store.dimension())?,
        None => match store.query_point(node) {
            Some(q) => q.weights.clone(),
            None => vec![1.0; store.dimension()],
        },
    };

    let t = Instant::now();
    let results = search(&store, &start, &weights, radius, strategy)?;
    let elapsed = t.elapsed();

    if strategy == Strategy::Hybrid {
        println!(
            "Strategy: hybrid -> {}",
            select_strategy(&store, &start, radius)?
        );
    } else {
        println!("Strategy: {}", strategy);
    }
    if let Some(q) = store.query_point(node) {
        println!(
            "Radius: X={} (build radius D={}, ratio {:.2})",
            radius,
            q.build_radius,
            radius / q.build_radius
        );
    } else {
        println!("Radius: X={}", radius);
    }
    println!("Found {} points in {:.2?}\n", results.len(), elapsed);

    let shown = if limit == 0 { results.len() } else { limit.min(results.len()) };
    for (rank, m) in results[..shown].iter().enumerate() {
        println!("{:>4}. {:<20} {:.6}", rank + 1, m.id, m.distance);
    }
    if shown < results.len() {
        println!("  ... {} more", results.len() - shown);
    }
    Ok(())
}

fn cmd_evaluate(
    graph: PathBuf,
    strategy: &str,
    radius_scale: f64,
    report_path: Option<PathBuf>,
    responses_path: Option<PathBuf>,
) -> Result<()> {
    let store = load_store(&graph)?;
    let strategy: Strategy = strategy.parse()?;
    if !radius_scale.is_finite() || radius_scale < 0.0 {
        bail!("radius scale must be finite and >= 0, got {radius_scale}");
    }
    if store.query_count() == 0 {
        bail!("snapshot {} contains no queries to evaluate", graph.display());
    }

    let mut rows = Vec::new();
    let mut responses = Vec::new();
    let mut scores = Vec::new();
    let mut reference_elapsed = Duration::ZERO;
    let mut candidate_elapsed = Duration::ZERO;

    for q in store.query_points() {
        let radius = q.build_radius * radius_scale;

        let t = Instant::now();
        let reference = search(&store, &q.id, &q.weights, radius, Strategy::Naive)?;
        reference_elapsed += t.elapsed();

        let t = Instant::now();
        let candidate = search(&store, &q.id, &q.weights, radius, strategy)?;
        candidate_elapsed += t.elapsed();

        let correctness = oracle::score(&reference, &candidate);
        scores.push(correctness);
        rows.push(report::QueryReport {
            query_id: q.id.clone(),
            num_ref: reference.len(),
            num_pred: candidate.len(),
            correctness,
        });
        if responses_path.is_some() {
            responses.push(report::ResponseRow::from_matches(&q.id, radius, &candidate));
        }
    }

    println!(
        "{:<15} {:>8} {:>8} {:>12}",
        "query_id", "num_ref", "num_pred", "correctness"
    );
    for row in &rows {
        println!(
            "{:<15} {:>8} {:>8} {:>12.4}",
            row.query_id, row.num_ref, row.num_pred, row.correctness
        );
    }

    let exact = rows.iter().filter(|r| r.num_ref == r.num_pred).count();
    let mean = oracle::mean_score(&scores);
    println!("\nStrategy: {} (radius scale {})", strategy, radius_scale);
    println!("Queries: {}", rows.len());
    println!(
        "Exact match (num_ref == num_pred): {}/{} ({:.1}%)",
        exact,
        rows.len(),
        exact as f64 / rows.len() as f64 * 100.0
    );
    println!("Mean correctness: {:.4} -> {:.2}%", mean, mean * 100.0);
    println!(
        "Elapsed: reference {:.2?}, candidate {:.2?}",
        reference_elapsed, candidate_elapsed
    );

    if let Some(path) = report_path {
        report::write_report(&path, &rows)?;
        println!("Report written: {}", path.display());
    }
    if let Some(path) = responses_path {
        report::write_responses(&path, &responses)?;
        println!("Responses written: {}", path.display());
    }
    Ok(())
}
