//! Procedure signature assembly

use crate::db::error::{MetadataError, Result};
use crate::db::grid::{cell, Grid};
use crate::db::schema::{ParamDescriptor, ProcedureHeader};
use crate::db::types::{format_type, TypeFormat};

/// `RDB$PARAMETER_TYPE` values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamDirection {
    In = 0,
    Out = 1,
}

impl ParamDirection {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamDirection::In => "IN",
            ParamDirection::Out => "OUT",
        }
    }
}

/// A stored procedure with its ordered input and output parameters
#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureSignature {
    pub name: String,
    pub source: String,
    pub description: Option<String>,
    pub in_params: Vec<ParamDescriptor>,
    pub out_params: Vec<ParamDescriptor>,
}

impl ProcedureSignature {
    /// Merge the header with its parameters.
    ///
    /// `headers` must hold exactly one row for `name`.
    pub fn assemble(
        name: &str,
        headers: Vec<ProcedureHeader>,
        in_params: Vec<ParamDescriptor>,
        out_params: Vec<ParamDescriptor>,
    ) -> Result<Self> {
        let mut headers = headers.into_iter();
        let header = headers
            .next()
            .ok_or_else(|| MetadataError::not_found("procedure", name))?;
        if headers.next().is_some() {
            return Err(MetadataError::ContractViolation(format!(
                "procedure '{}' matched more than one catalog row",
                name
            )));
        }
        Ok(Self {
            name: header.name,
            source: header.source.unwrap_or_default(),
            description: header.description,
            in_params,
            out_params,
        })
    }

    /// `NAME | I/O | TYPE | DESCRIPTION`, inputs first
    pub fn parameter_grid(&self) -> Grid {
        let mut grid = Grid::new(&["NAME", "I/O", "TYPE", "DESCRIPTION"]);
        let tagged = self
            .in_params
            .iter()
            .map(|p| (ParamDirection::In, p))
            .chain(self.out_params.iter().map(|p| (ParamDirection::Out, p)));
        for (dir, p) in tagged {
            grid.push(vec![
                p.name.clone(),
                dir.label().to_string(),
                format_type(&p.field, TypeFormat::default()),
                cell(&p.description),
            ]);
        }
        grid
    }

    /// isql script that recreates the procedure body.
    ///
    /// The input list and the `returns` clause are left out when empty.
    pub fn alter_ddl(&self) -> String {
        let params = |list: &[ParamDescriptor]| {
            list.iter()
                .map(|p| format!("{} {}", p.name, format_type(&p.field, TypeFormat::default())))
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut ddl = format!("set term !! ;\nalter procedure {}", self.name);
        if !self.in_params.is_empty() {
            ddl.push_str(&format!("({})", params(&self.in_params)));
        }
        ddl.push('\n');
        if !self.out_params.is_empty() {
            ddl.push_str(&format!("returns ({}) ", params(&self.out_params)));
        }
        ddl.push_str(&format!("as\n{}!!\nset term ; !!", self.source));
        ddl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::FieldType;

    fn header(name: &str) -> ProcedureHeader {
        ProcedureHeader {
            name: name.to_string(),
            source: Some("begin\n  suspend;\nend".to_string()),
            description: None,
        }
    }

    fn param(name: &str, type_name: &str, len: Option<i64>) -> ParamDescriptor {
        ParamDescriptor {
            name: name.to_string(),
            description: None,
            field: FieldType {
                type_name: type_name.to_string(),
                character_length: len,
                domain_name: "RDB$7".to_string(),
                ..FieldType::default()
            },
        }
    }

    #[test]
    fn test_missing_header_is_contract_violation() {
        let err = ProcedureSignature::assemble("NOPE", vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, MetadataError::ContractViolation(_)));
    }

    #[test]
    fn test_duplicate_header_is_contract_violation() {
        let err = ProcedureSignature::assemble("P", vec![header("P"), header("P")], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, MetadataError::ContractViolation(_)));
    }

    #[test]
    fn test_no_outputs_gives_empty_list() {
        let sig = ProcedureSignature::assemble(
            "ADD_EMP",
            vec![header("ADD_EMP")],
            vec![param("EMP_NO", "SHORT", None)],
            vec![],
        )
        .unwrap();
        assert!(sig.out_params.is_empty());
        assert_eq!(sig.in_params.len(), 1);
    }

    #[test]
    fn test_parameter_grid_and_ddl() {
        let sig = ProcedureSignature::assemble(
            "GET_EMP",
            vec![header("GET_EMP")],
            vec![param("EMP_NO", "SHORT", None)],
            vec![param("FULL_NAME", "VARYING", Some(37)), param("SALARY", "DOUBLE", None)],
        )
        .unwrap();

        let grid = sig.parameter_grid();
        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[0], vec!["EMP_NO", "IN", "SMALLINT", ""]);
        assert_eq!(grid.rows[1], vec!["FULL_NAME", "OUT", "VARCHAR(37)", ""]);

        assert_eq!(
            sig.alter_ddl(),
            "set term !! ;\nalter procedure GET_EMP(EMP_NO SMALLINT)\n\
             returns (FULL_NAME VARCHAR(37),SALARY DOUBLE PRECISION) as\n\
             begin\n  suspend;\nend!!\nset term ; !!"
        );
    }

    #[test]
    fn test_ddl_without_parameters() {
        let mut bare = header("P");
        bare.source = Some("begin end".to_string());
        let sig = ProcedureSignature::assemble("P", vec![bare], vec![], vec![]).unwrap();
        assert_eq!(sig.alter_ddl(), "set term !! ;\nalter procedure P\nas\nbegin end!!\nset term ; !!");

        let sig = ProcedureSignature::assemble(
            "LOG_IT",
            vec![header("LOG_IT")],
            vec![param("MSG", "VARYING", Some(80))],
            vec![],
        )
        .unwrap();
        assert!(sig.alter_ddl().starts_with("set term !! ;\nalter procedure LOG_IT(MSG VARCHAR(80))\nas\n"));

        let sig = ProcedureSignature::assemble(
            "NEXT_ID",
            vec![header("NEXT_ID")],
            vec![],
            vec![param("ID", "LONG", None)],
        )
        .unwrap();
        assert!(sig.alter_ddl().starts_with("set term !! ;\nalter procedure NEXT_ID\nreturns (ID INTEGER) as\n"));
    }
}
