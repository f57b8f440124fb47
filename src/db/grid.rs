//! Display-ready grids handed to the UI

use crate::db::query::RawResult;
use serde::Serialize;

/// Headers plus rows of display strings
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `header` in row `row`
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Headers as shown in table captions: `FIELD_NAME` -> `Field Name`
    pub fn titles(&self) -> Vec<String> {
        self.headers.iter().map(|h| head_title(h)).collect()
    }
}

impl From<RawResult> for Grid {
    fn from(raw: RawResult) -> Self {
        Self {
            headers: raw.columns,
            rows: raw
                .rows
                .into_iter()
                .map(|r| r.into_iter().map(|c| c.unwrap_or_default()).collect())
                .collect(),
        }
    }
}

/// Title-case a column alias, turning underscores into spaces
pub fn head_title(header: &str) -> String {
    header
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Optional catalog text as a grid cell
pub(crate) fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
