//! SQLSage Core - Shared abstractions for the query advisor
//!
//! This crate provides the small vocabulary every other SQLSage crate
//! depends on:
//!
//! - `SqlsageError` - Error type shared across crates
//! - `DatabaseType` - Database-type tags and their aliases
//! - `PlanExecutor` - The collaborator that runs EXPLAIN statements

mod dialect;
mod error;
mod executor;

pub use dialect::*;
pub use error::*;
pub use executor::*;
