//! Long-format CSV ingestion: one row per stratum and group.

use std::{fs::File, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use polars::prelude::{CsvReader, DataFrame, DataType, IdxCa, IdxSize, SerReader};
use tracing::{info, warn};

/// Column names identifying the stratum and the group of each row.
#[derive(Debug, Clone)]
pub struct Layout {
    pub stratum_col: String,
    pub group_col: String,
    /// Group labels for row 0 and row 1. Taken from the first stratum when
    /// unset.
    pub group_order: Option<Vec<String>>,
}

/// One stratum's 2x2 table with its row labels.
#[derive(Debug, Clone)]
pub struct StratumFrame {
    pub label: String,
    /// Group labels in row order.
    pub groups: Vec<String>,
    /// Outcome columns only, one row per group.
    pub table: DataFrame,
}

/// Read a CSV file and split it into per-stratum tables.
pub fn read_strata_csv(path: &Path, layout: &Layout) -> Result<Vec<StratumFrame>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let df = CsvReader::new(file)
        .finish()
        .with_context(|| format!("parse csv {}", path.display()))?;
    let frames = split_strata(&df, layout)?;
    info!(path = %path.display(), strata = frames.len(), "loaded strata");
    Ok(frames)
}

/// Split a long-format frame into per-stratum tables, keeping the order in
/// which strata first appear.
pub fn split_strata(df: &DataFrame, layout: &Layout) -> Result<Vec<StratumFrame>> {
    let strata_col = string_column(df, &layout.stratum_col)?;
    let groups_col = string_column(df, &layout.group_col)?;

    let mut rows_by_stratum: IndexMap<String, Vec<IdxSize>> = IndexMap::new();
    for (idx, label) in strata_col.iter().enumerate() {
        match label {
            Some(label) => rows_by_stratum
                .entry(label.clone())
                .or_default()
                .push(idx as IdxSize),
            None => warn!(row = idx, "row without stratum label ignored"),
        }
    }
    if rows_by_stratum.is_empty() {
        bail!("no strata found in column `{}`", layout.stratum_col);
    }

    let group_order = match &layout.group_order {
        Some(order) => order.clone(),
        None => {
            let (_, first_rows) = rows_by_stratum
                .first()
                .ok_or_else(|| anyhow!("no strata found"))?;
            first_rows
                .iter()
                .map(|&row| group_label(&groups_col, row))
                .collect()
        }
    };
    if group_order.len() != 2 || group_order[0] == group_order[1] {
        bail!("expected two distinct groups, found {group_order:?}");
    }

    let outcomes = df
        .drop(&layout.stratum_col)?
        .drop(&layout.group_col)?;

    rows_by_stratum
        .into_iter()
        .map(|(label, rows)| {
            let ordered = order_rows(&label, &rows, &groups_col, &group_order)?;
            let idx = IdxCa::from_vec("rows".into(), ordered);
            let table = outcomes
                .take(&idx)
                .with_context(|| format!("select rows of stratum {label}"))?;
            Ok(StratumFrame {
                label,
                groups: group_order.clone(),
                table,
            })
        })
        .collect()
}

fn group_label(groups_col: &[Option<String>], row: IdxSize) -> String {
    groups_col[row as usize].clone().unwrap_or_default()
}

/// Row indices of one stratum arranged as `group_order`; every group must
/// appear exactly once.
fn order_rows(
    label: &str,
    rows: &[IdxSize],
    groups_col: &[Option<String>],
    group_order: &[String],
) -> Result<Vec<IdxSize>> {
    let found: Vec<String> = rows.iter().map(|&row| group_label(groups_col, row)).collect();
    if found.len() != group_order.len() {
        bail!(
            "stratum `{label}` has groups {found:?}, expected one row each for {group_order:?}"
        );
    }
    group_order
        .iter()
        .map(|group| {
            let mut matching = rows
                .iter()
                .zip(&found)
                .filter(|(_, name)| *name == group)
                .map(|(&row, _)| row);
            match (matching.next(), matching.next()) {
                (Some(row), None) => Ok(row),
                _ => Err(anyhow!(
                    "stratum `{label}` has groups {found:?}, expected one row each for {group_order:?}"
                )),
            }
        })
        .collect()
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| anyhow!("missing column `{name}`"))?;
    let as_text = column.cast(&DataType::String)?;
    Ok(as_text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}
