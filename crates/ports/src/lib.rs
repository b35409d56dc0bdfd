//! obra-ports - abstract infrastructure interfaces

mod storage;

pub use storage::*;
