//! Type formatter - renders catalog type codes as SQL type strings

use crate::db::schema::{ColumnDescriptor, DomainRow, FieldType};

/// Switches for [`format_type`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeFormat {
    /// Show a user domain's name instead of its primitive type
    pub resolve_domain: bool,
    pub show_not_null: bool,
    pub show_default: bool,
}

impl Default for TypeFormat {
    fn default() -> Self {
        Self {
            resolve_domain: true,
            show_not_null: false,
            show_default: false,
        }
    }
}

impl TypeFormat {
    /// Always render the primitive type, even for user domains
    pub fn primitive() -> Self {
        Self {
            resolve_domain: false,
            ..Self::default()
        }
    }
}

/// Format a field type for display, e.g. `VARCHAR(40)` or `NUMERIC(10,2)`
pub fn format_type(field: &FieldType, opts: TypeFormat) -> String {
    let mut s = if opts.resolve_domain && field.is_user_domain() {
        field.domain_name.trim().to_string()
    } else {
        primitive_type(field)
    };

    if opts.show_default {
        if let Some(default) = field.default_source.as_deref().filter(|d| !d.is_empty()) {
            s.push(' ');
            s.push_str(default);
        }
    }
    if opts.show_not_null && field.is_not_null() {
        s.push_str(" NOT NULL");
    }
    s
}

fn primitive_type(field: &FieldType) -> String {
    let clen = field
        .character_length
        .map(|n| n.to_string())
        .unwrap_or_default();

    match field.type_name.as_str() {
        "SHORT" => "SMALLINT".to_string(),
        "LONG" => "INTEGER".to_string(),
        "TEXT" => format!("CHAR({})", clen),
        "VARYING" => format!("VARCHAR({})", clen),
        "INT64" => {
            let mut s = if field.sub_type == Some(1) {
                "NUMERIC(".to_string()
            } else {
                "DECIMAL(".to_string()
            };
            if let Some(precision) = field.precision {
                s.push_str(&precision.to_string());
                if let Some(scale) = field.scale {
                    s.push(',');
                    s.push_str(&(-scale).to_string());
                }
            }
            s.push(')');
            s
        }
        "BLOB" => format!("BLOB SUB_TYPE {}", field.sub_type.unwrap_or(0)),
        "DOUBLE" => "DOUBLE PRECISION".to_string(),
        other => other.to_string(),
    }
}

/// Default clause shown in the columns grid.
///
/// The column's own default wins; otherwise the domain's default is shown
/// tagged with the domain name it came from.
pub fn default_source_string(column: &ColumnDescriptor) -> String {
    if let Some(own) = &column.field.default_source {
        own.clone()
    } else if let Some(dom) = &column.domain_default_source {
        format!("{}({})", dom, column.field.domain_name.trim())
    } else {
        String::new()
    }
}

/// Default clause of a domain row
pub fn domain_default_string(domain: &DomainRow) -> String {
    domain.field.default_source.clone().unwrap_or_default()
}
