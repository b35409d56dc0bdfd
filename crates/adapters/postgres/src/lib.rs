//! obra-adapter-postgres - PostgreSQL adapter

mod connection;
mod transaction;

pub use connection::*;
pub use transaction::*;
