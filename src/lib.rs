//! Firebird console - schema introspection library
//! Reads the RDB$ system catalog and shapes it for a schema browser

pub mod browse;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;

pub use browse::{Action, Pane, SchemaNode, Selection};
pub use config::{AppConfig, Charset, ConnProfile};
pub use db::{Catalog, MetadataError};
