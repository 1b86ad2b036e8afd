//! The storage seam used by the service layer.

use async_trait::async_trait;
use crm_core::{Attributes, EntityId, EntityKind, EntityRecord, Relations};

use crate::client::{GraphClient, GraphError};

/// Entity persistence operations, independent of the backing database.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Create the per-kind uniqueness constraints. Idempotent.
    async fn initialize_schema(&self) -> Result<(), GraphError>;

    /// Create the node if absent, then overlay the record's attributes.
    async fn merge_entity(&self, record: &EntityRecord) -> Result<(), GraphError>;

    /// Replace the owner edge of an opportunity or interaction.
    /// Returns whether the record ended up linked to an existing customer.
    async fn set_owner(
        &self,
        kind: EntityKind,
        id: EntityId,
        customer_id: Option<EntityId>,
    ) -> Result<bool, GraphError>;

    /// Merge attributes onto an existing node; `None` when it does not exist.
    async fn update_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<Option<Attributes>, GraphError>;

    /// Detach-delete a node; `false` when it did not exist.
    async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<bool, GraphError>;

    async fn get_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Attributes>, GraphError>;

    async fn relations(&self, kind: EntityKind, id: EntityId) -> Result<Relations, GraphError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), GraphError>;
}

#[async_trait]
impl EntityStore for GraphClient {
    async fn initialize_schema(&self) -> Result<(), GraphError> {
        self.initialize_schema().await
    }

    async fn merge_entity(&self, record: &EntityRecord) -> Result<(), GraphError> {
        self.merge_entity(record).await
    }

    async fn set_owner(
        &self,
        kind: EntityKind,
        id: EntityId,
        customer_id: Option<EntityId>,
    ) -> Result<bool, GraphError> {
        self.set_owner(kind, id, customer_id).await
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<Option<Attributes>, GraphError> {
        self.update_entity(kind, id, attributes).await
    }

    async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<bool, GraphError> {
        self.delete_entity(kind, id).await
    }

    async fn get_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Attributes>, GraphError> {
        self.get_entity(kind, id).await
    }

    async fn relations(&self, kind: EntityKind, id: EntityId) -> Result<Relations, GraphError> {
        self.relations(kind, id).await
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.ping().await
    }
}
