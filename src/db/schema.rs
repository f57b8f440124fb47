//! Typed catalog rows
//!
//! One struct per catalog query. Each is bound from a [`RawResult`] by
//! column name, so the SQL aliases in `catalog.rs` and the names used here
//! must agree.
//!
//! [`RawResult`]: crate::db::RawResult

use crate::db::error::Result;
use crate::db::query::{FromRow, Row};

/// Prefix reserved for system-generated catalog names
pub const SYSTEM_PREFIX: &str = "RDB$";

/// The `RDB$FIELDS` side of a column, domain or parameter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldType {
    /// `RDB$TYPES.RDB$TYPE_NAME` (SHORT, LONG, VARYING, ...)
    pub type_name: String,
    pub sub_type: Option<i64>,
    pub precision: Option<i64>,
    /// Stored negated by the engine
    pub scale: Option<i64>,
    pub character_length: Option<i64>,
    /// Name of the underlying domain; system-generated ones start with `RDB$`
    pub domain_name: String,
    pub null_flag: Option<i64>,
    pub default_source: Option<String>,
}

impl FieldType {
    /// True when the type comes from a user-created domain
    pub fn is_user_domain(&self) -> bool {
        !self.domain_name.starts_with(SYSTEM_PREFIX)
    }

    pub fn is_not_null(&self) -> bool {
        self.null_flag == Some(1)
    }

    /// Bind the shared type columns; `null_flag` and `default_source` are
    /// left to the caller because their source table differs per query.
    fn bind(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            type_name: row.text("TYPE_NAME")?,
            sub_type: row.int("FIELD_SUB_TYPE")?,
            precision: row.int("FIELD_PRECISION")?,
            scale: row.int("FIELD_SCALE")?,
            character_length: row.int("CHARACTER_LENGTH")?,
            domain_name: row.text("FIELD_NAME")?,
            null_flag: None,
            default_source: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationRow {
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
}

impl FromRow for RelationRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
            owner: row.text("OWNER")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoleRow {
    pub name: String,
    pub owner: String,
}

impl FromRow for RoleRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
            owner: row.text("OWNER")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureRow {
    pub name: String,
    pub description: Option<String>,
}

impl FromRow for ProcedureRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExceptionRow {
    pub name: String,
    pub message: Option<String>,
    pub description: Option<String>,
}

impl FromRow for ExceptionRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
            message: row.opt("MESSAGE_STRING")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

/// External (UDF) function declaration
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionRow {
    pub name: String,
    pub entrypoint: Option<String>,
    pub library: Option<String>,
    pub description: Option<String>,
}

impl FromRow for FunctionRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("FUNCTION_NAME")?,
            entrypoint: row.opt("ENTRYPOINT")?,
            library: row.opt("LIBNAME")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorRow {
    pub name: String,
}

impl FromRow for GeneratorRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
        })
    }
}

/// A table or view column joined with its domain and type
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub field: FieldType,
    pub description: Option<String>,
    pub domain_default_source: Option<String>,
    pub validation_source: Option<String>,
}

impl ColumnDescriptor {
    pub fn nullable(&self) -> bool {
        !self.field.is_not_null()
    }
}

impl FromRow for ColumnDescriptor {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let mut field = FieldType::bind(row)?;
        field.null_flag = row.int("NULL_FLAG")?;
        field.default_source = row.opt("DEFAULT_SOURCE")?;
        Ok(Self {
            name: row.text("NAME")?,
            field,
            description: row.opt("DESCRIPTION")?,
            domain_default_source: row.opt("DOM_DEFAULT_SOURCE")?,
            validation_source: row.opt("VALIDATION_SOURCE")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomainRow {
    pub name: String,
    pub field: FieldType,
    pub validation_source: Option<String>,
    pub description: Option<String>,
}

impl FromRow for DomainRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let mut field = FieldType::bind(row)?;
        field.default_source = row.opt("DEFAULT_SOURCE")?;
        Ok(Self {
            name: row.text("NAME")?,
            field,
            validation_source: row.opt("VALIDATION_SOURCE")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

/// Procedure parameter with its type
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub field: FieldType,
}

impl FromRow for ParamDescriptor {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let mut field = FieldType::bind(row)?;
        field.null_flag = row.int("NULL_FLAG")?;
        field.default_source = row.opt("DEFAULT_SOURCE")?;
        Ok(Self {
            name: row.text("NAME")?.trim().to_string(),
            description: row.opt("DESCRIPTION")?,
            field,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureHeader {
    pub name: String,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl FromRow for ProcedureHeader {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?.trim().to_string(),
            source: row.opt("SOURCE")?,
            description: row.opt("DESCRIPTION")?,
        })
    }
}

/// One field of one index, left-joined with its constraint and referential rules
#[derive(Clone, Debug, PartialEq)]
pub struct IndexSegment {
    pub index_name: String,
    pub index_id: String,
    pub unique_flag: Option<String>,
    pub inactive_flag: Option<String>,
    pub statistics: Option<String>,
    pub foreign_key_index: Option<String>,
    pub field_name: Option<String>,
    pub constraint_type: Option<String>,
    pub constraint_name: Option<String>,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
}

impl FromRow for IndexSegment {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            index_name: row.text("INDEX_NAME")?,
            index_id: row.text("INDEX_ID")?,
            unique_flag: row.opt("UNIQUE_FLAG")?,
            inactive_flag: row.opt("INACT")?,
            statistics: row.opt("STATISTIC")?,
            foreign_key_index: row.opt("FOREIGN_KEY")?,
            field_name: row.opt("FIELD_NAME")?,
            constraint_type: row.opt("CONST_TYPE")?,
            constraint_name: row.opt("CONST_NAME")?,
            update_rule: row.opt("UPDATE_RULE")?,
            delete_rule: row.opt("DELETE_RULE")?,
        })
    }
}

/// One field of the index a foreign key points at
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSegment {
    pub relation_name: String,
    pub field_name: String,
}

impl FromRow for ReferenceSegment {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            relation_name: row.text("RELATION_NAME")?,
            field_name: row.text("FIELD_NAME")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckRow {
    pub name: String,
    pub source: String,
}

impl FromRow for CheckRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("CHECK_NAME")?,
            source: row.text("CHECK_SOURCE")?,
        })
    }
}

/// One privilege granted on an object
#[derive(Clone, Debug, PartialEq)]
pub struct GrantRow {
    pub grantee: String,
    pub privilege: String,
    pub grant_option: String,
    pub field_name: Option<String>,
}

impl FromRow for GrantRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            grantee: row.text("NAME")?,
            privilege: row.text("PRIVILEGE")?,
            grant_option: row.text("GRANT_OPTION")?,
            field_name: row.opt("FIELD_NAME")?.filter(|f| !f.is_empty()),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TriggerRow {
    pub name: String,
    pub table_name: Option<String>,
    pub sequence: Option<i64>,
    pub trigger_type: Option<i64>,
    pub inactive: bool,
}

impl FromRow for TriggerRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            name: row.text("NAME")?,
            table_name: row.opt("TABLE_NAME")?,
            sequence: row.int("SEQUENCE")?,
            trigger_type: row.int("TRIGGER_TYPE")?,
            inactive: row.int("INACT")? == Some(1),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TriggerSource {
    pub table_name: Option<String>,
    pub source: Option<String>,
}

impl FromRow for TriggerSource {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            table_name: row.opt("TABLE_NAME")?,
            source: row.opt("SOURCE")?,
        })
    }
}
