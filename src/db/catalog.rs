//! Catalog query set
//!
//! [`Catalog`] owns the session of one open database and runs the fixed set
//! of read-only queries against the `RDB$` system tables. Every statement
//! goes through [`Catalog::execute`], which serializes access to the session
//! and strips the padding of fixed-width catalog fields.
//!
//! Object names are interpolated into the SQL text as quoted literals.

use crate::db::constraints::{self, ConstraintKind, ConstraintRecord, ForeignKeyTarget, IndexGroup, KeyColumns};
use crate::db::driver::{ConnectParams, Connector, Session};
use crate::db::error::{MetadataError, Result};
use crate::db::grants::{aggregate_grants, GrantEntry};
use crate::db::grid::Grid;
use crate::db::procedures::{ParamDirection, ProcedureSignature};
use crate::db::query::{quote_literal, sql_name, FromRow, RawResult};
use crate::db::schema::{
    CheckRow, ColumnDescriptor, DomainRow, ExceptionRow, FunctionRow, GeneratorRow, GrantRow,
    IndexSegment, ParamDescriptor, ProcedureHeader, ProcedureRow, ReferenceSegment,
    RelationRow, RoleRow, TriggerRow, TriggerSource,
};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Introspection handle for one open database
pub struct Catalog {
    session: Mutex<Box<dyn Session>>,
    name: String,
}

impl Catalog {
    /// Open a session through `connector`
    pub async fn open(connector: &dyn Connector, params: &ConnectParams) -> Result<Self> {
        let session = connector.open(params).await?;
        debug!(database = %params.location(), charset = %params.charset, "database opened");
        Ok(Self::from_session(params.location(), session))
    }

    /// Wrap an already open session
    pub fn from_session(name: impl Into<String>, session: Box<dyn Session>) -> Self {
        Self {
            session: Mutex::new(session),
            name: name.into(),
        }
    }

    /// Name of the database this catalog reads
    pub fn database_name(&self) -> &str {
        &self.name
    }

    /// Close the session. Consumes the catalog, so no call can be outstanding.
    pub async fn close(self) -> Result<()> {
        let mut session = self.session.into_inner();
        session.close().await?;
        debug!(database = %self.name, "database closed");
        Ok(())
    }

    /// Run a statement and return its trimmed rows
    pub async fn execute(&self, sql: &str) -> Result<RawResult> {
        let start = Instant::now();
        let mut session = self.session.lock().await;
        let result = session.execute(sql).await;
        match &result {
            Ok(raw) => debug!(
                statement = %compact(sql),
                rows = raw.row_count(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "catalog query"
            ),
            Err(e) => warn!(statement = %compact(sql), error = %e, "catalog query failed"),
        }
        Ok(result?.trimmed())
    }

    async fn fetch<T: FromRow>(&self, sql: &str) -> Result<Vec<T>> {
        self.execute(sql).await?.bind()
    }

    // --- Object lists ---

    /// User tables, or system tables when `system` is set
    pub async fn tables(&self, system: bool) -> Result<Vec<RelationRow>> {
        let sql = format!(
            "select rdb$relation_name NAME, rdb$owner_name OWNER, rdb$description DESCRIPTION
             from rdb$relations
             where rdb$system_flag={} and rdb$view_source is null
             order by rdb$relation_name",
            if system { 1 } else { 0 }
        );
        self.fetch(&sql).await
    }

    pub async fn views(&self) -> Result<Vec<RelationRow>> {
        self.fetch(
            "select rdb$relation_name NAME, rdb$owner_name OWNER, rdb$description DESCRIPTION
             from rdb$relations
             where rdb$flags=1 and rdb$view_source is not null
             order by rdb$relation_name",
        )
        .await
    }

    /// Source text of a view; `None` when no such view exists
    pub async fn view_source(&self, name: &str) -> Result<Option<String>> {
        let sql = format!(
            "select rdb$view_source VIEW_SOURCE
             from rdb$relations
             where rdb$relation_name={} and rdb$flags=1 and rdb$view_source is not null",
            quote_literal(name)
        );
        let raw = self.execute(&sql).await?;
        Ok(raw.rows.into_iter().next().and_then(|r| r.into_iter().next().flatten()))
    }

    pub async fn roles(&self) -> Result<Vec<RoleRow>> {
        self.fetch(
            "select rdb$role_name NAME, rdb$owner_name OWNER
             from rdb$roles order by rdb$role_name",
        )
        .await
    }

    pub async fn exceptions(&self) -> Result<Vec<ExceptionRow>> {
        self.fetch(
            "select rdb$exception_name NAME, rdb$message MESSAGE_STRING, rdb$description DESCRIPTION
             from rdb$exceptions
             order by rdb$exception_number",
        )
        .await
    }

    /// External function declarations
    pub async fn functions(&self) -> Result<Vec<FunctionRow>> {
        self.fetch(
            "select rdb$function_name FUNCTION_NAME, rdb$entrypoint ENTRYPOINT,
                rdb$module_name LIBNAME, rdb$description DESCRIPTION
             from rdb$functions
             order by rdb$function_name",
        )
        .await
    }

    pub async fn generators(&self) -> Result<Vec<GeneratorRow>> {
        self.fetch(
            "select rdb$generator_name NAME from rdb$generators
             where rdb$system_flag is null or rdb$system_flag = 0
             order by rdb$system_flag, rdb$generator_name",
        )
        .await
    }

    /// Current value of a generator, read without incrementing it.
    ///
    /// Plain upper-case names go in bare so the statement also parses in
    /// dialect 1; other names are double-quoted, which needs dialect 3.
    pub async fn generator_value(&self, name: &str) -> Result<Option<String>> {
        let sql = format!("select gen_id({}, 0) V from rdb$database", sql_name(name));
        let raw = self.execute(&sql).await?;
        let value = raw
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| MetadataError::ContractViolation("rdb$database returned no row".to_string()))?;
        Ok(value.into_iter().next().flatten())
    }

    /// Generator names paired with their current values
    pub async fn generators_with_values(&self) -> Result<Vec<(GeneratorRow, Option<String>)>> {
        let mut out = Vec::new();
        for generator in self.generators().await? {
            let value = self.generator_value(&generator.name).await?;
            out.push((generator, value));
        }
        Ok(out)
    }

    pub async fn procedures(&self) -> Result<Vec<ProcedureRow>> {
        self.fetch(
            "select rdb$procedure_name NAME, rdb$description DESCRIPTION
             from rdb$procedures order by rdb$procedure_name",
        )
        .await
    }

    /// Triggers of one table, or of every table
    pub async fn triggers(&self, table: Option<&str>) -> Result<Vec<TriggerRow>> {
        let filter = table
            .map(|t| format!(" and rdb$relation_name={}", quote_literal(t)))
            .unwrap_or_default();
        let sql = format!(
            "select rdb$trigger_name NAME, rdb$relation_name TABLE_NAME,
                rdb$trigger_sequence SEQUENCE, rdb$trigger_type TRIGGER_TYPE,
                rdb$trigger_inactive INACT
             from rdb$triggers
             where (rdb$system_flag is null or rdb$system_flag = 0){}
             order by rdb$relation_name, rdb$trigger_type, rdb$trigger_sequence",
            filter
        );
        self.fetch(&sql).await
    }

    /// `recreate trigger` script for a trigger; `None` when it does not exist
    pub async fn trigger_source(&self, name: &str) -> Result<Option<String>> {
        let sql = format!(
            "select rdb$relation_name TABLE_NAME, rdb$trigger_source SOURCE
             from rdb$triggers
             where rdb$trigger_name={}",
            quote_literal(name)
        );
        let rows: Vec<TriggerSource> = self.fetch(&sql).await?;
        Ok(rows.into_iter().next().map(|t| {
            format!("recreate trigger {}\n{}", name, t.source.unwrap_or_default())
        }))
    }

    // --- Types ---

    /// User-defined domains
    pub async fn domains(&self) -> Result<Vec<DomainRow>> {
        self.fetch(&format!(
            "{} and not B.rdb$field_name like 'RDB$%'
             order by B.rdb$field_name",
            DOMAIN_SELECT
        ))
        .await
    }

    /// A single domain by name
    pub async fn domain(&self, name: &str) -> Result<Option<DomainRow>> {
        let sql = format!("{} and B.rdb$field_name={}", DOMAIN_SELECT, quote_literal(name));
        Ok(self.fetch(&sql).await?.into_iter().next())
    }

    /// Columns of a table or view in position order
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let sql = format!(
            "select A.rdb$field_name NAME, A.rdb$null_flag NULL_FLAG,
                A.rdb$default_source DEFAULT_SOURCE, A.rdb$description DESCRIPTION,
                C.rdb$type_name TYPE_NAME, B.rdb$field_sub_type FIELD_SUB_TYPE,
                B.rdb$field_precision FIELD_PRECISION, B.rdb$field_scale FIELD_SCALE,
                B.rdb$character_length \"CHARACTER_LENGTH\", B.rdb$field_name FIELD_NAME,
                B.rdb$default_source DOM_DEFAULT_SOURCE, B.rdb$validation_source VALIDATION_SOURCE
             from rdb$relation_fields A, rdb$fields B, rdb$types C
             where C.rdb$field_name='RDB$FIELD_TYPE'
                and A.rdb$field_source = B.rdb$field_name
                and B.rdb$field_type = C.rdb$type
                and upper(A.rdb$relation_name) = {}
             order by A.rdb$field_position, A.rdb$field_name",
            quote_literal(&table.to_uppercase())
        );
        self.fetch(&sql).await
    }

    // --- Procedures ---

    /// Header and ordered IN/OUT parameters of a stored procedure.
    ///
    /// An unknown name is a contract violation.
    pub async fn procedure_signature(&self, name: &str) -> Result<ProcedureSignature> {
        let sql = format!(
            "select rdb$procedure_name NAME, rdb$procedure_source SOURCE,
                rdb$description DESCRIPTION
             from rdb$procedures
             where rdb$procedure_name={}",
            quote_literal(name)
        );
        let headers: Vec<ProcedureHeader> = self.fetch(&sql).await?;
        if headers.is_empty() {
            warn!(procedure = name, "procedure not found");
            return Err(MetadataError::not_found("procedure", name));
        }
        let in_params = self.procedure_params(name, ParamDirection::In).await?;
        let out_params = self.procedure_params(name, ParamDirection::Out).await?;
        ProcedureSignature::assemble(name, headers, in_params, out_params)
    }

    async fn procedure_params(&self, name: &str, direction: ParamDirection) -> Result<Vec<ParamDescriptor>> {
        let sql = format!(
            "select A.rdb$parameter_name NAME, A.rdb$description DESCRIPTION,
                C.rdb$type_name TYPE_NAME, B.rdb$field_sub_type FIELD_SUB_TYPE,
                B.rdb$field_precision FIELD_PRECISION, B.rdb$field_scale FIELD_SCALE,
                B.rdb$character_length \"CHARACTER_LENGTH\", B.rdb$field_name FIELD_NAME,
                B.rdb$null_flag NULL_FLAG, B.rdb$default_source DEFAULT_SOURCE
             from rdb$procedure_parameters A, rdb$fields B, rdb$types C
             where C.rdb$field_name='RDB$FIELD_TYPE'
                and A.rdb$field_source = B.rdb$field_name
                and A.rdb$parameter_type = {}
                and B.rdb$field_type = C.rdb$type
                and A.rdb$procedure_name = {}
             order by A.rdb$parameter_number",
            direction.code(),
            quote_literal(name)
        );
        self.fetch(&sql).await
    }

    // --- Grants ---

    /// Raw privilege rows on a table, view, procedure or role
    pub async fn grant_rows(&self, object: &str) -> Result<Vec<GrantRow>> {
        let sql = format!(
            "select rdb$user NAME, rdb$privilege PRIVILEGE,
                rdb$grant_option GRANT_OPTION, rdb$field_name FIELD_NAME
             from rdb$user_privileges
             where rdb$relation_name={}
             order by rdb$user",
            quote_literal(object)
        );
        self.fetch(&sql).await
    }

    /// Privileges on an object grouped per grantee, option and field
    pub async fn grant_users(&self, object: &str) -> Result<Vec<GrantEntry>> {
        aggregate_grants(&self.grant_rows(object).await?)
    }

    // --- Constraints and indexes ---

    /// Every index of a table grouped by index id, foreign keys resolved
    pub async fn key_constraints_and_index(&self, table: &str) -> Result<Vec<IndexGroup>> {
        let sql = format!(
            "select A.rdb$index_name INDEX_NAME, A.rdb$index_id INDEX_ID,
                A.rdb$unique_flag UNIQUE_FLAG, A.rdb$index_inactive INACT,
                A.rdb$statistics STATISTIC, A.rdb$foreign_key FOREIGN_KEY,
                B.rdb$field_name FIELD_NAME,
                C.rdb$constraint_type CONST_TYPE, C.rdb$constraint_name CONST_NAME,
                D.rdb$update_rule UPDATE_RULE, D.rdb$delete_rule DELETE_RULE
             from rdb$indices A
                left join rdb$index_segments B on A.rdb$index_name=B.rdb$index_name
                left join rdb$relation_constraints C on A.rdb$index_name=C.rdb$index_name
                left join rdb$ref_constraints D on C.rdb$constraint_name=D.rdb$constraint_name
             where upper(A.rdb$relation_name)={}
             order by A.rdb$index_id, B.rdb$field_position",
            quote_literal(&table.to_uppercase())
        );
        let segments: Vec<IndexSegment> = self.fetch(&sql).await?;
        let mut groups = constraints::group_segments(&segments);
        for group in groups.iter_mut() {
            if let Some(index) = group.foreign_key_index.clone() {
                group.resolve_reference(self.references(&index).await?);
            }
        }
        Ok(groups)
    }

    async fn references(&self, index: &str) -> Result<ForeignKeyTarget> {
        let sql = format!(
            "select A.rdb$relation_name RELATION_NAME, B.rdb$field_name FIELD_NAME
             from rdb$indices A, rdb$index_segments B
             where A.rdb$index_name={}
                and A.rdb$index_name=B.rdb$index_name
             order by B.rdb$field_position",
            quote_literal(index)
        );
        let segments: Vec<ReferenceSegment> = self.fetch(&sql).await?;
        ForeignKeyTarget::from_segments(index, &segments)
    }

    /// CHECK constraints of a table with their source text
    pub async fn check_constraints(&self, table: &str) -> Result<Vec<CheckRow>> {
        let sql = format!(
            "select A.rdb$constraint_name CHECK_NAME, C.rdb$trigger_source CHECK_SOURCE
             from rdb$relation_constraints A, rdb$check_constraints B, rdb$triggers C
             where A.rdb$constraint_type='CHECK'
                and A.rdb$constraint_name = B.rdb$constraint_name
                and B.rdb$trigger_name = C.rdb$trigger_name
                and C.rdb$trigger_type=1
                and upper(A.rdb$relation_name) = {}",
            quote_literal(&table.to_uppercase())
        );
        self.fetch(&sql).await
    }

    /// Primary, unique, foreign key and check constraints of a table
    pub async fn constraints(&self, table: &str) -> Result<Vec<ConstraintRecord>> {
        let groups = self.key_constraints_and_index(table).await?;
        let checks = self.check_constraints(table).await?;
        constraints::constraint_records(&groups, &checks)
    }

    /// Columns of a table that take part in primary, foreign or unique keys
    pub async fn key_columns(&self, table: &str) -> Result<KeyColumns> {
        Ok(KeyColumns::from_groups(&self.key_constraints_and_index(table).await?))
    }

    /// Primary key fields in segment order, taken from the index grouping
    pub async fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        let groups = self.key_constraints_and_index(table).await?;
        Ok(constraints::key_fields(&groups, ConstraintKind::PrimaryKey))
    }

    /// Unique constraint fields, taken from the index grouping
    pub async fn unique_keys(&self, table: &str) -> Result<Vec<String>> {
        let groups = self.key_constraints_and_index(table).await?;
        Ok(constraints::key_fields(&groups, ConstraintKind::Unique))
    }

    /// Foreign key segments of a table joined with the segments they reference
    pub async fn foreign_keys(&self, table: &str) -> Result<Grid> {
        let sql = format!(
            "select A.rdb$index_name INDEX_NAME, A.rdb$foreign_key FOREIGN_KEY,
                B.rdb$field_name FIELD_NAME,
                C.rdb$constraint_type CONST_TYPE, C.rdb$constraint_name CONST_NAME,
                D.rdb$update_rule UPDATE_RULE, D.rdb$delete_rule DELETE_RULE,
                A2.rdb$relation_name REF_TABLE, B2.rdb$field_name REF_FIELD
             from rdb$indices A
                left join rdb$index_segments B on A.rdb$index_name=B.rdb$index_name
                left join rdb$relation_constraints C on A.rdb$index_name=C.rdb$index_name
                left join rdb$ref_constraints D on C.rdb$constraint_name=D.rdb$constraint_name,
                rdb$indices A2, rdb$index_segments B2
             where upper(A.rdb$relation_name)={}
                and A2.rdb$index_name=A.rdb$foreign_key
                and A2.rdb$index_name=B2.rdb$index_name
                and B.rdb$field_position=B2.rdb$field_position",
            quote_literal(&table.to_uppercase())
        );
        Ok(self.execute(&sql).await?.into())
    }

    /// Columns of other tables whose foreign keys point at `table`
    pub async fn referenced_columns(&self, table: &str) -> Result<Grid> {
        let sql = format!(
            "select B2.rdb$field_name FIELD_NAME, C.rdb$constraint_name CONST_NAME,
                A.rdb$relation_name REFERENCED_TABLE, B.rdb$field_name REFERENCED_FIELD
             from rdb$indices A
                left join rdb$relation_constraints C on A.rdb$index_name=C.rdb$index_name,
                rdb$index_segments B, rdb$indices A2, rdb$index_segments B2
             where A.rdb$index_name=B.rdb$index_name
                and A2.rdb$index_name=B2.rdb$index_name
                and A.rdb$foreign_key = A2.rdb$index_name
                and A2.rdb$relation_name = {}
                and B.rdb$field_position=B2.rdb$field_position",
            quote_literal(&table.to_uppercase())
        );
        Ok(self.execute(&sql).await?.into())
    }
}

const DOMAIN_SELECT: &str = "select B.rdb$field_name NAME, C.rdb$type_name TYPE_NAME,
        B.rdb$field_sub_type FIELD_SUB_TYPE, B.rdb$field_precision FIELD_PRECISION,
        B.rdb$field_scale FIELD_SCALE, B.rdb$character_length \"CHARACTER_LENGTH\",
        B.rdb$field_name FIELD_NAME, B.rdb$validation_source VALIDATION_SOURCE,
        B.rdb$default_source DEFAULT_SOURCE, B.rdb$description DESCRIPTION
     from rdb$fields B, rdb$types C
     where C.rdb$field_name='RDB$FIELD_TYPE'
        and B.rdb$field_type=C.rdb$type";

/// Statement text squeezed onto one line for log output
fn compact(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
