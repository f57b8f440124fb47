//! Database module: transport abstraction and catalog introspection

pub mod catalog;
pub mod constraints;
pub(crate) mod driver;
mod error;
pub mod grants;
pub(crate) mod grid;
pub mod procedures;
mod query;
pub mod schema;
pub mod types;

pub use catalog::Catalog;
pub use driver::*;
pub use error::*;
pub use grid::{head_title, Grid};
pub use query::*;
