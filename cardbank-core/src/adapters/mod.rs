//! Adapter implementations
//!
//! Adapters implement the CardRepository port:
//! - DuckDB for durable storage
//! - In-memory storage with failure injection for tests

pub mod duckdb;
pub mod memory;
