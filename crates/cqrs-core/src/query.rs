//! Query trait definitions

use async_trait::async_trait;
use obra_errors::AppResult;

/// Query trait
pub trait Query: Send + Sync {
    type Result: Send;
}

/// Query Handler trait
///
/// Named `execute` rather than `handle` so a type can serve both commands
/// and queries without method-resolution ambiguity.
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn execute(&self, query: Q) -> AppResult<Q::Result>;
}
