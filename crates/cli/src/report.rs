//! Evaluation output files.
//!
//! Two CSV shapes: the per-query comparison report
//! (`query_id, num_ref, num_pred, correctness`) and the response dump
//! (`query_id, D, num_matches, nodes, nodes_with_distance`) consumed by
//! downstream tooling.

use adgraph_core::search::SearchMatch;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// One row of the per-query evaluation report.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query_id: String,
    pub num_ref: usize,
    pub num_pred: usize,
    pub correctness: f64,
}

/// Write the per-query comparison report.
pub fn write_report(path: &Path, rows: &[QueryReport]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create report file {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// One row of the response dump: a query's full match list.
#[derive(Debug, Serialize)]
pub struct ResponseRow {
    pub query_id: String,
    #[serde(rename = "D")]
    pub radius: f64,
    pub num_matches: usize,
    pub nodes: String,
    pub nodes_with_distance: String,
}

impl ResponseRow {
    /// Flatten a match list into the `;`-joined response columns.
    pub fn from_matches(query_id: &str, radius: f64, matches: &[SearchMatch]) -> Self {
        let nodes = matches
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let nodes_with_distance = matches
            .iter()
            .map(|m| format!("{}:{:.6}", m.id, m.distance))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            query_id: query_id.to_string(),
            radius,
            num_matches: matches.len(),
            nodes,
            nodes_with_distance,
        }
    }
}

/// Write the response dump.
pub fn write_responses(path: &Path, rows: &[ResponseRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create responses file {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
