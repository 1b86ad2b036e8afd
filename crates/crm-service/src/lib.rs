//! crm-service: Entity CRUD and natural-language query dispatch.
//!
//! [`EntityService`] turns entity kind + id + JSON payload operations into
//! store calls over an injected [`EntityStore`](crm_graph::EntityStore).
//! [`QueryDispatcher`] classifies a free-text query into an entity kind,
//! pulls the first integer out of it and retrieves that entity.

pub mod classifier;
pub mod dispatch;
pub mod entity;
pub mod extract;
pub mod validate;

pub use classifier::{Classifier, ClassifierError, HttpClassifier, KeywordClassifier, LabelScore};
pub use dispatch::QueryDispatcher;
pub use entity::EntityService;
