//! SQLSage Analyzer - Heuristic query analysis and index advice
//!
//! This crate provides functionality for:
//! - A lexical pass over SQL text (classified tokens, statement type, pretty printing)
//! - Structural extraction of tables, columns, predicates, joins and ordering
//! - Heuristic complexity scoring against a fixed factor catalog
//! - Index recommendations with ready-to-run `CREATE INDEX` statements
//! - EXPLAIN statement construction and execution plan insights
//!
//! None of this is a real parser or planner: every component works on
//! token and regex heuristics and degrades to empty results instead of
//! failing.

pub mod advisor;
pub mod complexity;
pub mod config;
pub mod explain;
pub mod extract;
pub mod indexes;
pub mod lexer;

pub use advisor::*;
pub use complexity::*;
pub use config::*;
pub use explain::*;
pub use extract::*;
pub use indexes::*;
pub use lexer::*;
