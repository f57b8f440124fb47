//! Export functionality for grids

use crate::db::Grid;
use anyhow::{Context, Result};
use std::path::Path;

/// Write a grid to a CSV file, header row first
pub fn export_csv(grid: &Grid, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(&grid.headers)?;
    for row in &grid.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a grid to a JSON file as an array of header-keyed objects
pub fn export_json(grid: &Grid, path: &Path) -> Result<()> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = grid
        .rows
        .iter()
        .map(|row| {
            grid.headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                .collect()
        })
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
