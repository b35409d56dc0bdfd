//! obra-cqrs-core - Command/Query traits

mod command;
mod query;

pub use command::*;
pub use query::*;
