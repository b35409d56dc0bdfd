//! obra-bootstrap - unified service startup
//!
//! Startup skeleton shared by service binaries

mod infrastructure;
mod retry;
mod runtime;
mod starter;

pub use infrastructure::*;
pub use retry::*;
pub use runtime::*;
pub use starter::*;
