//! HTTP handlers for lakehouse queries

mod handler;
mod types;

pub use handler::*;
pub use types::*;
