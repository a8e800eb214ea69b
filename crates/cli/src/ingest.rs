//! CSV ingestion of regular points and query definitions.
//!
//! Points CSV: a `node_id` column plus `feature_1..feature_D` columns (extra
//! columns are ignored). Queries CSV: `point_A`, `Y_vector`, `D`, and
//! optionally `A_vector`; vector cells are `;`-separated. The dimension D is
//! inferred from the points file.
//!
//! This is the validation boundary the core trusts: non-finite components
//! are normalized to 0 here so the engine never observes NaN/Inf, and
//! negative weights or radii are rejected before they reach a store.

use adgraph_core::graph::{QueryPoint, RegularPoint};
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load regular points from a CSV file.
pub fn load_points(path: &Path) -> Result<Vec<RegularPoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open points file {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let id_col = headers
        .iter()
        .position(|h| h == "node_id")
        .with_context(|| format!("points file {} has no 'node_id' column", path.display()))?;

    let mut feature_cols: Vec<(usize, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(col, h)| {
            h.strip_prefix("feature_")
                .and_then(|n| n.parse::<usize>().ok())
                .map(|n| (n, col))
        })
        .collect();
    feature_cols.sort_unstable();
    if feature_cols.is_empty() {
        bail!("points file {} has no feature_* columns", path.display());
    }
    for (i, &(n, _)) in feature_cols.iter().enumerate() {
        if n != i + 1 {
            bail!(
                "points file {} is missing column feature_{}",
                path.display(),
                i + 1
            );
        }
    }

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("points file {} row {}", path.display(), row + 2))?;
        let id = record.get(id_col).unwrap_or("").trim();
        if id.is_empty() {
            bail!("points file {} row {}: empty node_id", path.display(), row + 2);
        }
        let features = feature_cols
            .iter()
            .map(|&(n, col)| {
                let cell = record.get(col).unwrap_or("").trim();
                cell.parse::<f64>().map(normalize_component).with_context(|| {
                    format!(
                        "points file {} row {}: bad feature_{} value '{}'",
                        path.display(),
                        row + 2,
                        n,
                        cell
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        points.push(RegularPoint {
            id: id.to_string(),
            features,
        });
    }
    Ok(points)
}

/// Load query definitions from a CSV file.
///
/// When `A_vector` is absent or empty, the query's features fall back to the
/// regular point it references (`ads_N` → `node_N`); queries referencing an
/// unknown point are skipped with a warning.
pub fn load_queries(path: &Path, points: &[RegularPoint]) -> Result<Vec<QueryPoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open queries file {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("queries file {} has no '{}' column", path.display(), name))
    };
    let id_col = col("point_A")?;
    let weights_col = col("Y_vector")?;
    let radius_col = col("D")?;
    let features_col = headers.iter().position(|h| h == "A_vector");

    let dimension = points.first().map(|p| p.features.len()).unwrap_or(0);
    let features_by_id: HashMap<&str, &[f64]> = points
        .iter()
        .map(|p| (p.id.as_str(), p.features.as_slice()))
        .collect();

    let mut queries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("queries file {} row {}", path.display(), row + 2))?;
        let id = record.get(id_col).unwrap_or("").trim();
        if id.is_empty() {
            bail!(
                "queries file {} row {}: empty point_A",
                path.display(),
                row + 2
            );
        }

        let weights = parse_vector(record.get(weights_col).unwrap_or(""), dimension)
            .with_context(|| format!("query '{}': bad Y_vector", id))?;
        if weights.iter().any(|w| *w < 0.0) {
            bail!("query '{}': negative weight in Y_vector", id);
        }

        let radius_cell = record.get(radius_col).unwrap_or("").trim();
        let build_radius: f64 = radius_cell
            .parse()
            .with_context(|| format!("query '{}': bad D value '{}'", id, radius_cell))?;
        if !build_radius.is_finite() || build_radius < 0.0 {
            bail!("query '{}': D must be finite and >= 0, got {}", id, build_radius);
        }

        let explicit = features_col
            .map(|c| record.get(c).unwrap_or("").trim())
            .filter(|cell| !cell.is_empty());
        let features = match explicit {
            Some(cell) => {
                parse_vector(cell, dimension).with_context(|| format!("query '{}': bad A_vector", id))?
            }
            None => match features_by_id.get(referenced_node_id(id).as_str()) {
                Some(f) => f.to_vec(),
                None => {
                    tracing::warn!(
                        query = id,
                        "no A_vector and no matching regular point; query skipped"
                    );
                    continue;
                }
            },
        };

        queries.push(QueryPoint {
            id: id.to_string(),
            features,
            weights,
            build_radius,
        });
    }
    Ok(queries)
}

/// Parse a `;`-separated vector cell, normalizing non-finite components to 0.
pub fn parse_vector(raw: &str, expected: usize) -> Result<Vec<f64>> {
    let values = raw
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map(normalize_component)
                .with_context(|| format!("bad vector component '{}'", s))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() != expected {
        bail!("vector has {} components, expected {}", values.len(), expected);
    }
    Ok(values)
}

/// The regular point a query id refers to: `ads_12` → `node_12`.
fn referenced_node_id(query_id: &str) -> String {
    match query_id.split_once('_') {
        Some((_, suffix)) => format!("node_{}", suffix),
        None => query_id.to_string(),
    }
}

fn normalize_component(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
