//! Schema tree browsing
//!
//! The tree shown by the UI is made of [`SchemaNode`]s. Selecting a node
//! produces a [`Pane`] (a grid or a block of text) and, for folders, the child
//! nodes to show beneath it. Context actions such as "show constraints" are
//! available per node kind through [`Action`].

use crate::db::constraints::{constraints_grid, index_grid, KeyColumns};
use crate::db::grants::grants_grid;
use crate::db::grid::{cell, Grid};
use crate::db::types::{default_source_string, domain_default_string, format_type, TypeFormat};
use crate::db::{Catalog, MetadataError, Result};

/// A node of the schema tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaNode {
    Root,
    Server { name: String },
    Database { name: String },
    Domains,
    Exceptions,
    Functions,
    Generators,
    Procedures,
    Procedure { name: String },
    Roles,
    Role { name: String },
    Tables,
    Table { name: String },
    SystemTables,
    SystemTable { name: String },
    Triggers,
    Trigger { name: String, inactive: bool },
    Views,
    View { name: String },
}

/// Context actions on a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    TableConstraints,
    ShowIndex,
    ShowReferencedColumns,
    ShowGrants,
    ViewSource,
}

/// Right-hand pane content for a node
#[derive(Clone, Debug, PartialEq)]
pub enum Pane {
    Empty,
    Grid(Grid),
    /// Columns grid of a table, with key membership for colouring rows
    Columns { grid: Grid, keys: KeyColumns },
    Text(String),
}

/// Result of selecting a node
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub pane: Pane,
    /// Children to attach under a folder node
    pub children: Vec<SchemaNode>,
}

impl Selection {
    fn pane(pane: Pane) -> Self {
        Self {
            pane,
            children: Vec::new(),
        }
    }

    fn with_children(grid: Grid, children: Vec<SchemaNode>) -> Self {
        Self {
            pane: Pane::Grid(grid),
            children,
        }
    }
}

impl SchemaNode {
    /// Folders shown under an opened database
    pub fn database_folders() -> Vec<SchemaNode> {
        vec![
            SchemaNode::Domains,
            SchemaNode::Tables,
            SchemaNode::Views,
            SchemaNode::Procedures,
            SchemaNode::Triggers,
            SchemaNode::Generators,
            SchemaNode::Exceptions,
            SchemaNode::Functions,
            SchemaNode::Roles,
            SchemaNode::SystemTables,
        ]
    }

    /// Label shown in the tree
    pub fn label(&self) -> &str {
        match self {
            SchemaNode::Root => "Servers",
            SchemaNode::Domains => "Domains",
            SchemaNode::Exceptions => "Exceptions",
            SchemaNode::Functions => "Functions",
            SchemaNode::Generators => "Generators",
            SchemaNode::Procedures => "Procedures",
            SchemaNode::Roles => "Roles",
            SchemaNode::Tables => "Tables",
            SchemaNode::SystemTables => "System Tables",
            SchemaNode::Triggers => "Triggers",
            SchemaNode::Views => "Views",
            SchemaNode::Server { name }
            | SchemaNode::Database { name }
            | SchemaNode::Procedure { name }
            | SchemaNode::Role { name }
            | SchemaNode::Table { name }
            | SchemaNode::SystemTable { name }
            | SchemaNode::Trigger { name, .. }
            | SchemaNode::View { name } => name.as_str(),
        }
    }

    /// Whether `action` applies to this node
    pub fn supports(&self, action: Action) -> bool {
        match action {
            Action::TableConstraints | Action::ShowIndex | Action::ShowReferencedColumns => {
                matches!(self, SchemaNode::Table { .. } | SchemaNode::SystemTable { .. })
            }
            Action::ShowGrants => matches!(
                self,
                SchemaNode::Table { .. } | SchemaNode::View { .. } | SchemaNode::Procedure { .. }
            ),
            Action::ViewSource => {
                matches!(self, SchemaNode::View { .. } | SchemaNode::Procedure { .. })
            }
        }
    }
}

/// Fill the pane for a selected node
pub async fn select(catalog: &Catalog, node: &SchemaNode) -> Result<Selection> {
    match node {
        SchemaNode::Root | SchemaNode::Server { .. } => Ok(Selection::pane(Pane::Empty)),
        SchemaNode::Database { .. } => Ok(Selection {
            pane: Pane::Empty,
            children: SchemaNode::database_folders(),
        }),
        SchemaNode::Domains => {
            let mut grid = Grid::new(&["NAME", "TYPE", "CHECK", "DEFAULT", "DESCRIPTION"]);
            for d in catalog.domains().await? {
                grid.push(vec![
                    d.name.clone(),
                    format_type(&d.field, TypeFormat::primitive()),
                    cell(&d.validation_source),
                    domain_default_string(&d),
                    cell(&d.description),
                ]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
        SchemaNode::Exceptions => {
            let mut grid = Grid::new(&["NAME", "MESSAGE_STRING", "DESCRIPTION"]);
            for e in catalog.exceptions().await? {
                grid.push(vec![e.name, cell(&e.message), cell(&e.description)]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
        SchemaNode::Functions => {
            let mut grid = Grid::new(&["FUNCTION_NAME", "ENTRYPOINT", "LIBNAME", "DESCRIPTION"]);
            for f in catalog.functions().await? {
                grid.push(vec![f.name, cell(&f.entrypoint), cell(&f.library), cell(&f.description)]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
        SchemaNode::Generators => {
            let mut grid = Grid::new(&["NAME", "COUNT"]);
            for (g, value) in catalog.generators_with_values().await? {
                grid.push(vec![g.name, cell(&value)]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
        SchemaNode::Procedures => {
            let procs = catalog.procedures().await?;
            let mut grid = Grid::new(&["NAME", "DESCRIPTION"]);
            let mut children = Vec::new();
            for p in procs {
                children.push(SchemaNode::Procedure { name: p.name.clone() });
                grid.push(vec![p.name, cell(&p.description)]);
            }
            Ok(Selection::with_children(grid, children))
        }
        SchemaNode::Procedure { name } => {
            let sig = catalog.procedure_signature(name).await?;
            Ok(Selection::pane(Pane::Grid(sig.parameter_grid())))
        }
        SchemaNode::Roles => {
            let roles = catalog.roles().await?;
            let mut grid = Grid::new(&["NAME", "OWNER"]);
            let mut children = Vec::new();
            for r in roles {
                children.push(SchemaNode::Role { name: r.name.clone() });
                grid.push(vec![r.name, r.owner]);
            }
            Ok(Selection::with_children(grid, children))
        }
        SchemaNode::Role { name } => {
            let mut grid = Grid::new(&["NAME", "PRIVILEGE", "GRANT_OPTION", "FIELD_NAME"]);
            for g in catalog.grant_rows(name).await? {
                grid.push(vec![g.grantee, g.privilege, g.grant_option, g.field_name.unwrap_or_default()]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
        SchemaNode::Tables | SchemaNode::SystemTables => {
            let system = matches!(node, SchemaNode::SystemTables);
            let tables = catalog.tables(system).await?;
            let mut grid = Grid::new(&["NAME", "OWNER", "DESCRIPTION"]);
            let mut children = Vec::new();
            for t in tables {
                children.push(if system {
                    SchemaNode::SystemTable { name: t.name.clone() }
                } else {
                    SchemaNode::Table { name: t.name.clone() }
                });
                grid.push(vec![t.name, t.owner, cell(&t.description)]);
            }
            Ok(Selection::with_children(grid, children))
        }
        SchemaNode::Table { name } | SchemaNode::SystemTable { name } => {
            let mut grid = Grid::new(&["NAME", "TYPE", "IS NULL", "DEFAULT", "DESCRIPTION"]);
            for c in catalog.columns(name).await? {
                grid.push(vec![
                    c.name.clone(),
                    format_type(&c.field, TypeFormat::default()),
                    c.field.null_flag.map(|f| f.to_string()).unwrap_or_default(),
                    default_source_string(&c),
                    cell(&c.description),
                ]);
            }
            let keys = catalog.key_columns(name).await?;
            Ok(Selection::pane(Pane::Columns { grid, keys }))
        }
        SchemaNode::Triggers => {
            let triggers = catalog.triggers(None).await?;
            let mut grid = Grid::new(&["NAME", "TABLE_NAME", "SEQUENCE", "TRIGGER_TYPE", "INACT"]);
            let mut children = Vec::new();
            for t in triggers {
                children.push(SchemaNode::Trigger {
                    name: t.name.clone(),
                    inactive: t.inactive,
                });
                grid.push(vec![
                    t.name,
                    cell(&t.table_name),
                    t.sequence.map(|s| s.to_string()).unwrap_or_default(),
                    t.trigger_type.map(|s| s.to_string()).unwrap_or_default(),
                    if t.inactive { "1" } else { "0" }.to_string(),
                ]);
            }
            Ok(Selection::with_children(grid, children))
        }
        SchemaNode::Trigger { name, .. } => {
            let src = catalog
                .trigger_source(name)
                .await?
                .ok_or_else(|| MetadataError::not_found("trigger", name))?;
            Ok(Selection::pane(Pane::Text(src)))
        }
        SchemaNode::Views => {
            let views = catalog.views().await?;
            let mut grid = Grid::new(&["NAME", "OWNER", "DESCRIPTION"]);
            let mut children = Vec::new();
            for v in views {
                children.push(SchemaNode::View { name: v.name.clone() });
                grid.push(vec![v.name, v.owner, cell(&v.description)]);
            }
            Ok(Selection::with_children(grid, children))
        }
        SchemaNode::View { name } => {
            let mut grid = Grid::new(&["NAME", "TYPE", "DESCRIPTION"]);
            for c in catalog.columns(name).await? {
                grid.push(vec![
                    c.name.clone(),
                    format_type(&c.field, TypeFormat::default()),
                    cell(&c.description),
                ]);
            }
            Ok(Selection::pane(Pane::Grid(grid)))
        }
    }
}

/// Run a context action on a node
pub async fn run_action(catalog: &Catalog, node: &SchemaNode, action: Action) -> Result<Pane> {
    if !node.supports(action) {
        return Err(MetadataError::ContractViolation(format!(
            "{:?} is not available on {}",
            action,
            node.label()
        )));
    }
    let name = node.label();
    match action {
        Action::TableConstraints => Ok(Pane::Grid(constraints_grid(&catalog.constraints(name).await?))),
        Action::ShowIndex => Ok(Pane::Grid(index_grid(&catalog.key_constraints_and_index(name).await?))),
        Action::ShowReferencedColumns => Ok(Pane::Grid(catalog.referenced_columns(name).await?)),
        Action::ShowGrants => Ok(Pane::Grid(grants_grid(&catalog.grant_users(name).await?))),
        Action::ViewSource => match node {
            SchemaNode::View { .. } => {
                let source = catalog
                    .view_source(name)
                    .await?
                    .ok_or_else(|| MetadataError::not_found("view", name))?;
                Ok(Pane::Text(format!("recreate view {} as\n{}", name, source)))
            }
            _ => Ok(Pane::Text(catalog.procedure_signature(name).await?.alter_ddl())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::constraints::KeyRole;
    use crate::db::driver::scripted::ScriptedSession;

    const COLUMN_COLS: &[&str] = &[
        "NAME", "NULL_FLAG", "DEFAULT_SOURCE", "DESCRIPTION", "TYPE_NAME",
        "FIELD_SUB_TYPE", "FIELD_PRECISION", "FIELD_SCALE", "CHARACTER_LENGTH",
        "FIELD_NAME", "DOM_DEFAULT_SOURCE", "VALIDATION_SOURCE",
    ];

    const SEGMENT_COLS: &[&str] = &[
        "INDEX_NAME", "INDEX_ID", "UNIQUE_FLAG", "INACT", "STATISTIC", "FOREIGN_KEY",
        "FIELD_NAME", "CONST_TYPE", "CONST_NAME", "UPDATE_RULE", "DELETE_RULE",
    ];

    const PARAM_COLS: &[&str] = &[
        "NAME", "DESCRIPTION", "TYPE_NAME", "FIELD_SUB_TYPE", "FIELD_PRECISION",
        "FIELD_SCALE", "CHARACTER_LENGTH", "FIELD_NAME", "NULL_FLAG", "DEFAULT_SOURCE",
    ];

    fn catalog(session: ScriptedSession) -> Catalog {
        Catalog::from_session("test.fdb", Box::new(session))
    }

    fn grid(pane: Pane) -> Grid {
        match pane {
            Pane::Grid(grid) => grid,
            other => panic!("expected a grid, got {:?}", other),
        }
    }

    /// SALES with a primary key, a cascading foreign key, a plain index and a check
    fn sales_session() -> ScriptedSession {
        ScriptedSession::new()
            .on(
                &["from rdb$indices A", "left join rdb$ref_constraints", "'SALES'"],
                SEGMENT_COLS,
                &[
                    &[Some("RDB$PRIMARY20"), Some("1"), Some("1"), Some("0"), Some("0.01"), None,
                      Some("PO_NUMBER"), Some("PRIMARY KEY"), Some("INTEG_60"), None, None],
                    &[Some("RDB$FOREIGN21"), Some("2"), Some("0"), Some("0"), Some("0.2"),
                      Some("RDB$PRIMARY15"), Some("CUST_NO"), Some("FOREIGN KEY"), Some("INTEG_61"),
                      Some("RESTRICT"), Some("CASCADE")],
                    &[Some("NEEDX"), Some("3"), Some("0"), Some("0"), Some("0.04"), None,
                      Some("DATE_NEEDED"), None, None, None, None],
                ],
            )
            .on(
                &["RELATION_NAME", "'RDB$PRIMARY15'"],
                &["RELATION_NAME", "FIELD_NAME"],
                &[&[Some("CUSTOMER"), Some("CUST_NO")]],
            )
            .on(
                &["CHECK_NAME", "'SALES'"],
                &["CHECK_NAME", "CHECK_SOURCE"],
                &[&[Some("INTEG_65"), Some("CHECK (qty_ordered >= 1)")]],
            )
    }

    /// GET_EMP(EMP_NO) returning FULL_NAME
    fn procedure_session() -> ScriptedSession {
        ScriptedSession::new()
            .on(
                &["rdb$procedure_source", "'GET_EMP'"],
                &["NAME", "SOURCE", "DESCRIPTION"],
                &[&[Some("GET_EMP"), Some("begin suspend; end"), Some("employee lookup")]],
            )
            .on(
                &["rdb$parameter_type = 0", "'GET_EMP'"],
                PARAM_COLS,
                &[&[Some("EMP_NO"), Some("employee id"), Some("SHORT"), Some("0"), Some("0"),
                    Some("0"), None, Some("EMPNO"), None, None]],
            )
            .on(
                &["rdb$parameter_type = 1", "'GET_EMP'"],
                PARAM_COLS,
                &[&[Some("FULL_NAME"), None, Some("VARYING"), Some("0"), None, Some("0"),
                    Some("37"), Some("RDB$12"), None, None]],
            )
    }

    #[test]
    fn test_action_availability() {
        let table = SchemaNode::Table { name: "EMPLOYEE".into() };
        let view = SchemaNode::View { name: "PHONE_LIST".into() };
        let proc_ = SchemaNode::Procedure { name: "GET_EMP".into() };

        assert!(table.supports(Action::ShowIndex));
        assert!(table.supports(Action::ShowGrants));
        assert!(!table.supports(Action::ViewSource));
        assert!(view.supports(Action::ViewSource));
        assert!(proc_.supports(Action::ShowGrants));
        assert!(!proc_.supports(Action::TableConstraints));
        assert!(!SchemaNode::Tables.supports(Action::ShowGrants));
    }

    #[tokio::test]
    async fn test_database_lists_folders() {
        let sel = select(&catalog(ScriptedSession::new()), &SchemaNode::Database { name: "emp".into() })
            .await
            .unwrap();
        assert_eq!(sel.pane, Pane::Empty);
        assert!(sel.children.contains(&SchemaNode::Generators));
    }

    #[tokio::test]
    async fn test_triggers_folder_marks_inactive() {
        let session = ScriptedSession::new().on(
            &["from rdb$triggers"],
            &["NAME", "TABLE_NAME", "SEQUENCE", "TRIGGER_TYPE", "INACT"],
            &[
                &[Some("SET_EMP_NO "), Some("EMPLOYEE"), Some("0"), Some("1"), Some("0")],
                &[Some("OLD_TRG"), Some("EMPLOYEE"), Some("1"), Some("2"), Some("1")],
            ],
        );
        let sel = select(&catalog(session), &SchemaNode::Triggers).await.unwrap();
        assert_eq!(
            sel.children,
            vec![
                SchemaNode::Trigger { name: "SET_EMP_NO".into(), inactive: false },
                SchemaNode::Trigger { name: "OLD_TRG".into(), inactive: true },
            ]
        );
    }

    #[tokio::test]
    async fn test_table_columns_with_keys() {
        let session = ScriptedSession::new()
            .on(
                &["from rdb$relation_fields A"],
                &[
                    "NAME", "NULL_FLAG", "DEFAULT_SOURCE", "DESCRIPTION", "TYPE_NAME",
                    "FIELD_SUB_TYPE", "FIELD_PRECISION", "FIELD_SCALE", "CHARACTER_LENGTH",
                    "FIELD_NAME", "DOM_DEFAULT_SOURCE", "VALIDATION_SOURCE",
                ],
                &[
                    &[Some("ID"), Some("1"), None, None, Some("LONG"), None, None, Some("0"), None,
                      Some("RDB$1"), None, None],
                    &[Some("NAME"), None, None, Some("full name"), Some("VARYING"), None, None, Some("0"),
                      Some("40"), Some("RDB$2"), None, None],
                ],
            )
            .on(
                &["from rdb$indices A", "left join rdb$ref_constraints"],
                &[
                    "INDEX_NAME", "INDEX_ID", "UNIQUE_FLAG", "INACT", "STATISTIC", "FOREIGN_KEY",
                    "FIELD_NAME", "CONST_TYPE", "CONST_NAME", "UPDATE_RULE", "DELETE_RULE",
                ],
                &[&[Some("RDB$PRIMARY1"), Some("0"), Some("1"), None, None, None, Some("ID"),
                    Some("PRIMARY KEY"), Some("PK_T"), None, None]],
            );
        let sel = select(&catalog(session), &SchemaNode::Table { name: "T".into() }).await.unwrap();
        match sel.pane {
            Pane::Columns { grid, keys } => {
                assert_eq!(grid.rows[0], vec!["ID", "INTEGER", "1", "", ""]);
                assert_eq!(grid.rows[1], vec!["NAME", "VARCHAR(40)", "", "", "full name"]);
                assert_eq!(keys.role("ID"), KeyRole::Primary);
                assert_eq!(keys.role("NAME"), KeyRole::None);
            }
            other => panic!("unexpected pane {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_view_source_action() {
        let session = ScriptedSession::new().on(
            &["VIEW_SOURCE"],
            &["VIEW_SOURCE"],
            &[&[Some("SELECT phone_ext FROM employee")]],
        );
        let pane = run_action(
            &catalog(session),
            &SchemaNode::View { name: "PHONE_LIST".into() },
            Action::ViewSource,
        )
        .await
        .unwrap();
        assert_eq!(
            pane,
            Pane::Text("recreate view PHONE_LIST as\nSELECT phone_ext FROM employee".into())
        );
    }

    #[tokio::test]
    async fn test_unsupported_action_is_rejected() {
        let session = ScriptedSession::new();
        let err = run_action(&catalog(session.clone()), &SchemaNode::Roles, Action::ShowIndex)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::ContractViolation(_)));
        assert!(session.statements().is_empty());
    }

    #[tokio::test]
    async fn test_grants_action_grid() {
        let session = ScriptedSession::new().on(
            &["rdb$user_privileges"],
            &["NAME", "PRIVILEGE", "GRANT_OPTION", "FIELD_NAME"],
            &[
                &[Some("PUBLIC"), Some("S"), Some("0"), None],
                &[Some("PUBLIC"), Some("I"), Some("0"), None],
            ],
        );
        let pane = run_action(
            &catalog(session),
            &SchemaNode::Table { name: "COUNTRY".into() },
            Action::ShowGrants,
        )
        .await
        .unwrap();
        match pane {
            Pane::Grid(grid) => {
                assert_eq!(grid.headers, vec!["NAME", "PRIVILEGE", "GRANT_OPTION"]);
                assert_eq!(grid.rows, vec![vec!["PUBLIC", "SELECT,INSERT", "0"]]);
            }
            other => panic!("unexpected pane {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_domains_folder_shows_primitive_types() {
        let session = ScriptedSession::new().on(
            &["from rdb$fields B", "not B.rdb$field_name like 'RDB$%'"],
            &[
                "NAME", "TYPE_NAME", "FIELD_SUB_TYPE", "FIELD_PRECISION", "FIELD_SCALE",
                "CHARACTER_LENGTH", "FIELD_NAME", "VALIDATION_SOURCE", "DEFAULT_SOURCE",
                "DESCRIPTION",
            ],
            &[
                &[Some("SALARY"), Some("INT64"), Some("1"), Some("10"), Some("-2"), None,
                  Some("SALARY"), Some("CHECK (VALUE > 0)"), Some("DEFAULT 0"), None],
                &[Some("FIRSTNAME"), Some("VARYING"), Some("0"), None, Some("0"), Some("15"),
                  Some("FIRSTNAME"), None, None, Some("given name")],
            ],
        );
        let sel = select(&catalog(session), &SchemaNode::Domains).await.unwrap();
        let grid = grid(sel.pane);
        assert_eq!(grid.headers, vec!["NAME", "TYPE", "CHECK", "DEFAULT", "DESCRIPTION"]);
        assert_eq!(grid.rows[0], vec!["SALARY", "NUMERIC(10,2)", "CHECK (VALUE > 0)", "DEFAULT 0", ""]);
        assert_eq!(grid.rows[1], vec!["FIRSTNAME", "VARCHAR(15)", "", "", "given name"]);
        assert!(sel.children.is_empty());
    }

    #[tokio::test]
    async fn test_exceptions_folder() {
        let session = ScriptedSession::new().on(
            &["from rdb$exceptions"],
            &["NAME", "MESSAGE_STRING", "DESCRIPTION"],
            &[&[Some("UNKNOWN_EMP_ID"), Some("Invalid employee number or project id."), None]],
        );
        let sel = select(&catalog(session), &SchemaNode::Exceptions).await.unwrap();
        assert_eq!(
            grid(sel.pane).rows,
            vec![vec!["UNKNOWN_EMP_ID", "Invalid employee number or project id.", ""]]
        );
    }

    #[tokio::test]
    async fn test_functions_folder() {
        let session = ScriptedSession::new().on(
            &["from rdb$functions"],
            &["FUNCTION_NAME", "ENTRYPOINT", "LIBNAME", "DESCRIPTION"],
            &[&[Some("ABS"), Some("IB_UDF_abs"), Some("ib_udf"), None]],
        );
        let sel = select(&catalog(session), &SchemaNode::Functions).await.unwrap();
        let grid = grid(sel.pane);
        assert_eq!(grid.headers, vec!["FUNCTION_NAME", "ENTRYPOINT", "LIBNAME", "DESCRIPTION"]);
        assert_eq!(grid.rows, vec![vec!["ABS", "IB_UDF_abs", "ib_udf", ""]]);
    }

    #[tokio::test]
    async fn test_generators_folder_reads_values() {
        let session = ScriptedSession::new()
            .on(&["from rdb$generators"], &["NAME"], &[&[Some("CUST_NO_GEN")], &[Some("EMP_NO_GEN")]])
            .on(&["gen_id(CUST_NO_GEN, 0)"], &["V"], &[&[Some("1015")]])
            .on(&["gen_id(EMP_NO_GEN, 0)"], &["V"], &[&[None]]);
        let sel = select(&catalog(session), &SchemaNode::Generators).await.unwrap();
        let grid = grid(sel.pane);
        assert_eq!(grid.headers, vec!["NAME", "COUNT"]);
        assert_eq!(grid.rows, vec![vec!["CUST_NO_GEN", "1015"], vec!["EMP_NO_GEN", ""]]);
    }

    #[tokio::test]
    async fn test_procedures_folder_lists_children() {
        let session = ScriptedSession::new().on(
            &["from rdb$procedures order by"],
            &["NAME", "DESCRIPTION"],
            &[&[Some("ADD_EMP_PROJ"), None], &[Some("GET_EMP"), Some("employee lookup")]],
        );
        let sel = select(&catalog(session), &SchemaNode::Procedures).await.unwrap();
        assert_eq!(
            sel.children,
            vec![
                SchemaNode::Procedure { name: "ADD_EMP_PROJ".into() },
                SchemaNode::Procedure { name: "GET_EMP".into() },
            ]
        );
        assert_eq!(grid(sel.pane).rows[1], vec!["GET_EMP", "employee lookup"]);
    }

    #[tokio::test]
    async fn test_procedure_node_shows_parameters() {
        let node = SchemaNode::Procedure { name: "GET_EMP".into() };
        let sel = select(&catalog(procedure_session()), &node).await.unwrap();
        let grid = grid(sel.pane);
        assert_eq!(grid.headers, vec!["NAME", "I/O", "TYPE", "DESCRIPTION"]);
        assert_eq!(
            grid.rows,
            vec![
                vec!["EMP_NO", "IN", "EMPNO", "employee id"],
                vec!["FULL_NAME", "OUT", "VARCHAR(37)", ""],
            ]
        );
    }

    #[tokio::test]
    async fn test_procedure_view_source_renders_alter_script() {
        let node = SchemaNode::Procedure { name: "GET_EMP".into() };
        let pane = run_action(&catalog(procedure_session()), &node, Action::ViewSource)
            .await
            .unwrap();
        assert_eq!(
            pane,
            Pane::Text(
                "set term !! ;\nalter procedure GET_EMP(EMP_NO EMPNO)\n\
                 returns (FULL_NAME VARCHAR(37)) as\nbegin suspend; end!!\nset term ; !!"
                    .into()
            )
        );
    }

    #[tokio::test]
    async fn test_roles_folder_and_role_members() {
        let session = ScriptedSession::new()
            .on(&["from rdb$roles"], &["NAME", "OWNER"], &[&[Some("RDB$ADMIN"), Some("SYSDBA")]])
            .on(
                &["from rdb$user_privileges", "'RDB$ADMIN'"],
                &["NAME", "PRIVILEGE", "GRANT_OPTION", "FIELD_NAME"],
                &[&[Some("ALICE"), Some("M"), Some("2"), None]],
            );
        let cat = catalog(session);

        let sel = select(&cat, &SchemaNode::Roles).await.unwrap();
        assert_eq!(sel.children, vec![SchemaNode::Role { name: "RDB$ADMIN".into() }]);
        assert_eq!(grid(sel.pane).rows, vec![vec!["RDB$ADMIN", "SYSDBA"]]);

        let sel = select(&cat, &SchemaNode::Role { name: "RDB$ADMIN".into() }).await.unwrap();
        assert_eq!(grid(sel.pane).rows, vec![vec!["ALICE", "M", "2", ""]]);
    }

    #[tokio::test]
    async fn test_tables_and_system_tables_folders() {
        let cols: &[&str] = &["NAME", "OWNER", "DESCRIPTION"];
        let session = ScriptedSession::new()
            .on(&["rdb$system_flag=0"], cols, &[&[Some("COUNTRY"), Some("SYSDBA"), None]])
            .on(&["rdb$system_flag=1"], cols, &[&[Some("RDB$PAGES"), Some("SYSDBA"), None]]);
        let cat = catalog(session);

        let user = select(&cat, &SchemaNode::Tables).await.unwrap();
        assert_eq!(user.children, vec![SchemaNode::Table { name: "COUNTRY".into() }]);

        let system = select(&cat, &SchemaNode::SystemTables).await.unwrap();
        assert_eq!(system.children, vec![SchemaNode::SystemTable { name: "RDB$PAGES".into() }]);
        assert_eq!(grid(system.pane).rows, vec![vec!["RDB$PAGES", "SYSDBA", ""]]);
    }

    #[tokio::test]
    async fn test_views_folder_and_view_columns() {
        let session = ScriptedSession::new()
            .on(
                &["OWNER", "rdb$view_source is not null"],
                &["NAME", "OWNER", "DESCRIPTION"],
                &[&[Some("PHONE_LIST"), Some("SYSDBA"), Some("phone numbers")]],
            )
            .on(
                &["from rdb$relation_fields A", "'PHONE_LIST'"],
                COLUMN_COLS,
                &[&[Some("PHONE_EXT"), None, None, None, Some("VARYING"), Some("0"), None,
                    Some("0"), Some("4"), Some("RDB$20"), None, None]],
            );
        let cat = catalog(session);

        let sel = select(&cat, &SchemaNode::Views).await.unwrap();
        assert_eq!(sel.children, vec![SchemaNode::View { name: "PHONE_LIST".into() }]);
        assert_eq!(grid(sel.pane).rows, vec![vec!["PHONE_LIST", "SYSDBA", "phone numbers"]]);

        let sel = select(&cat, &SchemaNode::View { name: "PHONE_LIST".into() }).await.unwrap();
        let grid = grid(sel.pane);
        assert_eq!(grid.headers, vec!["NAME", "TYPE", "DESCRIPTION"]);
        assert_eq!(grid.rows, vec![vec!["PHONE_EXT", "VARCHAR(4)", ""]]);
    }

    #[tokio::test]
    async fn test_trigger_node_shows_script() {
        let session = ScriptedSession::new()
            .on(&["rdb$trigger_source"], &["TABLE_NAME", "SOURCE"], &[])
            .on(
                &["rdb$trigger_source", "'SAVE_SALARY_CHANGE'"],
                &["TABLE_NAME", "SOURCE"],
                &[&[Some("EMPLOYEE"), Some("AS BEGIN END")]],
            );
        let cat = catalog(session);
        let node = SchemaNode::Trigger { name: "SAVE_SALARY_CHANGE".into(), inactive: false };
        let sel = select(&cat, &node).await.unwrap();
        assert_eq!(sel.pane, Pane::Text("recreate trigger SAVE_SALARY_CHANGE\nAS BEGIN END".into()));

        let missing = SchemaNode::Trigger { name: "GONE".into(), inactive: true };
        assert!(matches!(
            select(&cat, &missing).await,
            Err(MetadataError::ContractViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_table_constraints_action() {
        let table = SchemaNode::Table { name: "SALES".into() };
        let grid = grid(run_action(&catalog(sales_session()), &table, Action::TableConstraints).await.unwrap());
        assert_eq!(grid.headers, vec!["NAME", "CONDITION", "TYPE", "FIELDS"]);
        assert_eq!(
            grid.rows,
            vec![
                vec!["INTEG_60", "", "PRIMARY KEY", "PO_NUMBER"],
                vec!["INTEG_61", "REFERENCES CUSTOMER(CUST_NO) ON DELETE CASCADE", "FOREIGN KEY", "CUST_NO"],
                vec!["INTEG_65", "CHECK (qty_ordered >= 1)", "CHECK", ""],
            ]
        );
    }

    #[tokio::test]
    async fn test_show_index_action_includes_plain_indexes() {
        let table = SchemaNode::Table { name: "SALES".into() };
        let grid = grid(run_action(&catalog(sales_session()), &table, Action::ShowIndex).await.unwrap());
        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.cell(1, "FOREIGN_KEY"), Some("CUSTOMER(CUST_NO)"));
        assert_eq!(grid.cell(1, "DELETE_RULE"), Some("CASCADE"));
        assert_eq!(grid.cell(2, "INDEX_NAME"), Some("NEEDX"));
        assert_eq!(grid.cell(2, "CONST_TYPE"), Some(""));
        assert_eq!(grid.cell(2, "FIELD_NAME"), Some("DATE_NEEDED"));
    }

    #[tokio::test]
    async fn test_referenced_columns_action() {
        let session = ScriptedSession::new().on(
            &["A2.rdb$relation_name = 'CUSTOMER'"],
            &["FIELD_NAME", "CONST_NAME", "REFERENCED_TABLE", "REFERENCED_FIELD"],
            &[&[Some("CUST_NO"), Some("INTEG_61"), Some("SALES"), Some("CUST_NO")]],
        );
        let table = SchemaNode::Table { name: "CUSTOMER".into() };
        let grid = grid(
            run_action(&catalog(session), &table, Action::ShowReferencedColumns)
                .await
                .unwrap(),
        );
        assert_eq!(grid.rows, vec![vec!["CUST_NO", "INTEG_61", "SALES", "CUST_NO"]]);
    }
}
