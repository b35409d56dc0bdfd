//! Application layer: commands, queries and their handlers

pub mod audit;
pub mod auth;
pub mod billing;
pub mod context;
pub mod document;
pub mod lead;
pub mod owner;
pub mod project;
pub mod tenant;
pub mod unit;
pub mod warranty;

pub use context::Actor;
