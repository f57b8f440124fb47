//! Grant aggregation

use crate::db::error::{MetadataError, Result};
use crate::db::grid::Grid;
use crate::db::schema::GrantRow;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Privilege {
    Select,
    Delete,
    Insert,
    Update,
    References,
    Execute,
}

impl Privilege {
    /// Map a one-letter `RDB$PRIVILEGE` code
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "S" => Ok(Privilege::Select),
            "D" => Ok(Privilege::Delete),
            "I" => Ok(Privilege::Insert),
            "U" => Ok(Privilege::Update),
            "R" => Ok(Privilege::References),
            "X" => Ok(Privilege::Execute),
            other => Err(MetadataError::ContractViolation(format!(
                "unknown privilege code '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Delete => "DELETE",
            Privilege::Insert => "INSERT",
            Privilege::Update => "UPDATE",
            Privilege::References => "REFERENCES",
            Privilege::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privileges of one grantee, for one grant option and (optionally) one column
#[derive(Clone, Debug, PartialEq)]
pub struct GrantEntry {
    pub grantee: String,
    pub grant_option: String,
    /// `None` for table-level grants
    pub field_name: Option<String>,
    /// In first-granted order, without duplicates
    pub privileges: Vec<Privilege>,
}

/// Fold raw grant rows into one entry per (grantee, grant option, field)
pub fn aggregate_grants(rows: &[GrantRow]) -> Result<Vec<GrantEntry>> {
    let mut entries: Vec<GrantEntry> = Vec::new();
    let mut index: HashMap<(&str, &str, Option<&str>), usize> = HashMap::new();

    for row in rows {
        let privilege = Privilege::from_code(&row.privilege)?;
        let key = (
            row.grantee.as_str(),
            row.grant_option.as_str(),
            row.field_name.as_deref(),
        );
        let idx = *index.entry(key).or_insert_with(|| {
            entries.push(GrantEntry {
                grantee: row.grantee.clone(),
                grant_option: row.grant_option.clone(),
                field_name: row.field_name.clone(),
                privileges: Vec::new(),
            });
            entries.len() - 1
        });
        let privileges = &mut entries[idx].privileges;
        if !privileges.contains(&privilege) {
            privileges.push(privilege);
        }
    }
    Ok(entries)
}

/// Grants grid; gains a `FIELD_NAME` column when any grant is column-level
pub fn grants_grid(entries: &[GrantEntry]) -> Grid {
    let has_field = entries.iter().any(|e| e.field_name.is_some());
    let mut grid = if has_field {
        Grid::new(&["NAME", "PRIVILEGE", "GRANT_OPTION", "FIELD_NAME"])
    } else {
        Grid::new(&["NAME", "PRIVILEGE", "GRANT_OPTION"])
    };
    for e in entries {
        let mut row = vec![
            e.grantee.clone(),
            e.privileges
                .iter()
                .map(Privilege::as_str)
                .collect::<Vec<_>>()
                .join(","),
            e.grant_option.clone(),
        ];
        if has_field {
            row.push(e.field_name.clone().unwrap_or_default());
        }
        grid.push(row);
    }
    grid
}
