//! Raw catalog results and positional row binding

use crate::db::error::{MetadataError, Result};

/// Result of a statement as handed over by the transport: column names and
/// rows of nullable strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Strip the padding of fixed-width catalog fields.
    ///
    /// Only trailing whitespace is removed; blank strings stay as `Some("")`.
    pub fn trimmed(mut self) -> Self {
        for row in &mut self.rows {
            for cell in row.iter_mut().flatten() {
                let len = cell.trim_end().len();
                cell.truncate(len);
            }
        }
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Bind every row into a typed struct
    pub fn bind<T: FromRow>(&self) -> Result<Vec<T>> {
        let layout = ColumnLayout::new(&self.columns);
        self.rows
            .iter()
            .map(|cells| T::from_row(&Row { layout: &layout, cells }))
            .collect()
    }
}

/// Column-name to position lookup built once per result
pub struct ColumnLayout<'a> {
    names: &'a [String],
}

impl<'a> ColumnLayout<'a> {
    fn new(names: &'a [String]) -> Self {
        Self { names }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(column))
    }
}

/// One catalog row, addressable by column name
pub struct Row<'a> {
    layout: &'a ColumnLayout<'a>,
    cells: &'a [Option<String>],
}

impl<'a> Row<'a> {
    /// Nullable text value; errors when the column is not part of the result
    pub fn opt(&self, column: &str) -> Result<Option<String>> {
        let idx = self
            .layout
            .position(column)
            .ok_or_else(|| MetadataError::missing_column(column))?;
        Ok(self.cells.get(idx).cloned().flatten())
    }

    /// Text value with NULL read as the empty string
    pub fn text(&self, column: &str) -> Result<String> {
        Ok(self.opt(column)?.unwrap_or_default())
    }

    /// Integer value; NULL and blank read as `None`
    pub fn int(&self, column: &str) -> Result<Option<i64>> {
        match self.opt(column)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                MetadataError::ContractViolation(format!(
                    "column {} holds non-numeric value '{}'",
                    column, s
                ))
            }),
        }
    }
}

/// Construct a typed record from a catalog row
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

/// Quote a value as a SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a name as a delimited SQL identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Object name as it goes into SQL text: regular identifiers (upper-case
/// letter first, then upper-case letters, digits, `_` or `$`) stay bare,
/// anything else is delimited.
pub fn sql_name(name: &str) -> String {
    let mut chars = name.chars();
    let regular = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '$');
    if regular {
        name.to_string()
    } else {
        quote_ident(name)
    }
}
