//! Domain services

pub mod password;
pub mod warranty;
