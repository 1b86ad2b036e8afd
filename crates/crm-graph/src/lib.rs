//! crm-graph: Neo4j client for customer, opportunity and interaction records.
//!
//! This crate is the only place that talks to the graph database. Reads and
//! writes are issued as parameterized Cypher through [`GraphClient`]; the
//! service layer depends on the [`EntityStore`] trait instead, which also has
//! an in-process [`MemoryStore`] implementation.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryStore;
pub use store::EntityStore;
