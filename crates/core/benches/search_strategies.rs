//! Strategy benchmark: synthetic store, wall-clock and volume comparison.
//!
//! Builds a seeded random store, attaches queries, then runs every strategy
//! at several radius-to-build-radius ratios so the latency/completeness
//! trade-off of the graph-guided strategies is visible next to the exact
//! scan.
//!
//! Usage: cargo bench --bench search_strategies

use adgraph_core::graph::{GraphStore, QueryPoint, RegularPoint};
use adgraph_core::search::{search, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

const DIM: usize = 50;
const POINTS: usize = 5_000;
const QUERIES: usize = 20;
const K: usize = 10;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let points: Vec<RegularPoint> = (0..POINTS)
        .map(|i| RegularPoint {
            id: format!("node_{}", i + 1),
            features: (0..DIM).map(|_| rng.gen_range(0.0..100.0)).collect(),
        })
        .collect();

    let t = Instant::now();
    let mut store = GraphStore::build(points, K).unwrap();
    println!(
        "build: {} points, k={}, {} edges in {:.2?}",
        store.regular_count(),
        store.k(),
        store.edge_count(),
        t.elapsed()
    );

    let queries: Vec<QueryPoint> = (0..QUERIES)
        .map(|i| QueryPoint {
            id: format!("ads_{}", i + 1),
            features: (0..DIM).map(|_| rng.gen_range(0.0..100.0)).collect(),
            weights: (0..DIM).map(|_| rng.gen_range(0.0..1.0)).collect(),
            build_radius: rng.gen_range(180.0..220.0),
        })
        .collect();

    let t = Instant::now();
    let attached = store.attach_queries(queries.clone()).unwrap();
    println!(
        "attach: {} queries, {} edges in {:.2?}\n",
        queries.len(),
        attached,
        t.elapsed()
    );

    println!(
        "{:<8} {:<10} {:>12} {:>14}",
        "ratio", "strategy", "matches", "elapsed"
    );
    for scale in [0.5, 1.0, 2.0] {
        for strategy in Strategy::ALL {
            let t = Instant::now();
            let mut total = 0usize;
            for q in &queries {
                total += search(&store, &q.id, &q.weights, q.build_radius * scale, strategy)
                    .unwrap()
                    .len();
            }
            println!(
                "{:<8} {:<10} {:>12} {:>14.2?}",
                scale,
                strategy.to_string(),
                total,
                t.elapsed()
            );
        }
        println!();
    }
}
