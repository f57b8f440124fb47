//! Transport abstraction
//!
//! The wire protocol lives outside this crate. A transport provides a
//! [`Connector`] that opens [`Session`]s; the metadata layer only ever asks a
//! session to execute a statement and hand back the fully materialized rows.

use crate::config::Charset;
use crate::db::error::Result;
use crate::db::query::RawResult;
use async_trait::async_trait;

/// Default Firebird server port
pub const DEFAULT_PORT: u16 = 3050;

/// Everything needed to open one database session
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectParams {
    pub host: String,
    pub path: String,
    pub user: String,
    pub password: String,
    pub charset: Charset,
    pub port: u16,
}

impl ConnectParams {
    /// JDBC-style location string, `host/port:path`
    pub fn location(&self) -> String {
        format!("{}/{}:{}", self.host, self.port, self.path)
    }
}

/// Opens sessions against a server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a session; failures must be reported as `MetadataError::Connection`
    async fn open(&self, params: &ConnectParams) -> Result<Box<dyn Session>>;
}

/// A live session against one database.
///
/// Implementations are driven one statement at a time; callers never issue
/// a second `execute` before the first has returned.
#[async_trait]
pub trait Session: Send {
    /// Execute a read statement and return every row.
    /// Failures must be reported as `MetadataError::Execution`.
    async fn execute(&mut self, sql: &str) -> Result<RawResult>;

    /// Close the session
    async fn close(&mut self) -> Result<()>;
}
