//! Constraint and index assembly
//!
//! The catalog returns one row per index x field. These helpers fold those
//! rows into one group per index and derive the constraint views the UI
//! shows: the full constraint list, the raw index list and the key-column
//! sets used to colour the columns grid.

use crate::db::error::{MetadataError, Result};
use crate::db::grid::{cell, Grid};
use crate::db::schema::{CheckRow, IndexSegment, ReferenceSegment};
use std::collections::HashMap;
use std::fmt;

/// Referential action the engine applies when none is declared
pub const DEFAULT_RULE: &str = "RESTRICT";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
}

impl ConstraintKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "PRIMARY KEY" => Some(ConstraintKind::PrimaryKey),
            "FOREIGN KEY" => Some(ConstraintKind::ForeignKey),
            "UNIQUE" => Some(ConstraintKind::Unique),
            "CHECK" => Some(ConstraintKind::Check),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Check => "CHECK",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table and columns a foreign key index points at
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKeyTarget {
    pub index_name: String,
    pub table: String,
    pub fields: Vec<String>,
}

impl ForeignKeyTarget {
    /// Build from the segments of the referenced index
    pub fn from_segments(index_name: &str, segments: &[ReferenceSegment]) -> Result<Self> {
        let first = segments.first().ok_or_else(|| {
            MetadataError::not_found("referenced index", index_name)
        })?;
        Ok(Self {
            index_name: index_name.to_string(),
            table: first.relation_name.clone(),
            fields: segments.iter().map(|s| s.field_name.clone()).collect(),
        })
    }
}

impl fmt::Display for ForeignKeyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table, self.fields.join(","))
    }
}

/// All segments of one index, with its constraint metadata
#[derive(Clone, Debug, PartialEq)]
pub struct IndexGroup {
    pub index_id: String,
    pub index_name: String,
    pub unique_flag: Option<String>,
    pub inactive_flag: Option<String>,
    pub statistics: Option<String>,
    pub constraint_type: Option<String>,
    pub constraint_name: Option<String>,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
    /// Name of the referenced index, for foreign keys
    pub foreign_key_index: Option<String>,
    /// Filled in by [`IndexGroup::resolve_reference`]
    pub references: Option<ForeignKeyTarget>,
    pub fields: Vec<String>,
}

impl IndexGroup {
    fn start(segment: &IndexSegment) -> Self {
        Self {
            index_id: segment.index_id.clone(),
            index_name: segment.index_name.clone(),
            unique_flag: segment.unique_flag.clone(),
            inactive_flag: segment.inactive_flag.clone(),
            statistics: segment.statistics.clone(),
            constraint_type: segment.constraint_type.clone(),
            constraint_name: segment.constraint_name.clone(),
            update_rule: segment.update_rule.clone(),
            delete_rule: segment.delete_rule.clone(),
            foreign_key_index: segment.foreign_key_index.clone().filter(|f| !f.is_empty()),
            references: None,
            fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> Option<ConstraintKind> {
        self.constraint_type.as_deref().and_then(ConstraintKind::parse)
    }

    pub fn resolve_reference(&mut self, target: ForeignKeyTarget) {
        self.references = Some(target);
    }
}

/// Group segments by index id.
///
/// Groups come out in first-seen order and fields keep their row order.
/// Each call builds a fresh map, so grouping the same rows twice yields
/// identical output.
pub fn group_segments(segments: &[IndexSegment]) -> Vec<IndexGroup> {
    let mut groups: Vec<IndexGroup> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();

    for segment in segments {
        let idx = *by_id.entry(segment.index_id.as_str()).or_insert_with(|| {
            groups.push(IndexGroup::start(segment));
            groups.len() - 1
        });
        if let Some(field) = &segment.field_name {
            groups[idx].fields.push(field.clone());
        }
    }
    groups
}

/// One row of the constraints grid
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintRecord {
    pub name: String,
    pub kind: ConstraintKind,
    pub fields: Vec<String>,
    pub condition: String,
}

/// Foreign key condition: `REFERENCES T(a,b)` plus any non-default rules
pub fn foreign_key_condition(
    target: &ForeignKeyTarget,
    update_rule: Option<&str>,
    delete_rule: Option<&str>,
) -> String {
    let mut s = format!("REFERENCES {}", target);
    if let Some(rule) = update_rule.filter(|r| *r != DEFAULT_RULE) {
        s.push_str(" ON UPDATE ");
        s.push_str(rule);
    }
    if let Some(rule) = delete_rule.filter(|r| *r != DEFAULT_RULE) {
        s.push_str(" ON DELETE ");
        s.push_str(rule);
    }
    s
}

/// Full constraint list: primary keys, unique keys, foreign keys, checks.
///
/// Foreign key groups must have had their references resolved.
pub fn constraint_records(groups: &[IndexGroup], checks: &[CheckRow]) -> Result<Vec<ConstraintRecord>> {
    let mut records = Vec::new();

    for kind in [ConstraintKind::PrimaryKey, ConstraintKind::Unique] {
        for g in groups.iter().filter(|g| g.kind() == Some(kind)) {
            records.push(ConstraintRecord {
                name: cell(&g.constraint_name),
                kind,
                fields: g.fields.clone(),
                condition: String::new(),
            });
        }
    }

    for g in groups.iter().filter(|g| g.kind() == Some(ConstraintKind::ForeignKey)) {
        let target = g.references.as_ref().ok_or_else(|| {
            MetadataError::ContractViolation(format!(
                "foreign key {} has no referenced index",
                cell(&g.constraint_name)
            ))
        })?;
        records.push(ConstraintRecord {
            name: cell(&g.constraint_name),
            kind: ConstraintKind::ForeignKey,
            fields: g.fields.clone(),
            condition: foreign_key_condition(
                target,
                g.update_rule.as_deref(),
                g.delete_rule.as_deref(),
            ),
        });
    }

    for check in checks {
        records.push(ConstraintRecord {
            name: check.name.clone(),
            kind: ConstraintKind::Check,
            fields: Vec::new(),
            condition: check.source.clone(),
        });
    }
    Ok(records)
}

/// The constraints grid: `NAME | CONDITION | TYPE | FIELDS`
pub fn constraints_grid(records: &[ConstraintRecord]) -> Grid {
    let mut grid = Grid::new(&["NAME", "CONDITION", "TYPE", "FIELDS"]);
    for r in records {
        grid.push(vec![
            r.name.clone(),
            r.condition.clone(),
            r.kind.to_string(),
            r.fields.join(","),
        ]);
    }
    grid
}

/// The "show index" grid, one row per index including plain indexes
pub fn index_grid(groups: &[IndexGroup]) -> Grid {
    let mut grid = Grid::new(&[
        "INDEX_NAME", "CONST_NAME", "CONST_TYPE", "FOREIGN_KEY", "FIELD_NAME",
        "UNIQUE_FLAG", "UPDATE_RULE", "DELETE_RULE", "STATISTICS", "INACT",
    ]);
    for g in groups {
        grid.push(vec![
            g.index_name.clone(),
            cell(&g.constraint_name),
            cell(&g.constraint_type),
            g.references.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            g.fields.join(","),
            cell(&g.unique_flag),
            cell(&g.update_rule),
            cell(&g.delete_rule),
            cell(&g.statistics),
            cell(&g.inactive_flag),
        ]);
    }
    grid
}

/// Field names of every group of one constraint kind, flattened
pub fn key_fields(groups: &[IndexGroup], kind: ConstraintKind) -> Vec<String> {
    groups
        .iter()
        .filter(|g| g.kind() == Some(kind))
        .flat_map(|g| g.fields.iter().map(|f| f.trim().to_string()))
        .collect()
}

/// How a column takes part in the table's keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRole {
    PrimaryAndForeign,
    Primary,
    Foreign,
    Unique,
    None,
}

/// Key membership of a table's columns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyColumns {
    pub primary: Vec<String>,
    pub foreign: Vec<String>,
    pub unique: Vec<String>,
}

impl KeyColumns {
    pub fn from_groups(groups: &[IndexGroup]) -> Self {
        Self {
            primary: key_fields(groups, ConstraintKind::PrimaryKey),
            foreign: key_fields(groups, ConstraintKind::ForeignKey),
            unique: key_fields(groups, ConstraintKind::Unique),
        }
    }

    pub fn role(&self, column: &str) -> KeyRole {
        let has = |set: &[String]| set.iter().any(|f| f == column);
        match (has(&self.primary), has(&self.foreign), has(&self.unique)) {
            (true, true, _) => KeyRole::PrimaryAndForeign,
            (true, false, _) => KeyRole::Primary,
            (false, true, _) => KeyRole::Foreign,
            (false, false, true) => KeyRole::Unique,
            (false, false, false) => KeyRole::None,
        }
    }
}
