//! crm-core: Shared types, configuration, and error handling for the CRM graph service.
//!
//! This crate provides the foundational types used across all CRM components:
//! - Entity kinds (Customer, Opportunity, Interaction) and their identifiers
//! - Bulk ingestion payloads and per-record outcomes
//! - Configuration management
//! - The error taxonomy surfaced to HTTP callers

pub mod config;
pub mod error;
pub mod types;

pub use error::{CrmError, Result, ValidationError};
pub use types::{
    Attributes, BulkCreateReport, BulkCreateRequest, DeleteAck, EntityId, EntityKind, EntityRecord,
    EntityView, QueryRequest, RecordOutcome, RecordStatus, Relations,
};
