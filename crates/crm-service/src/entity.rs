//! Entity CRUD over an injected [`EntityStore`].

use std::sync::Arc;

use crm_core::{
    BulkCreateReport, BulkCreateRequest, CrmError, DeleteAck, EntityId, EntityKind, EntityView,
    RecordOutcome, RecordStatus, Relations, Result,
};
use crm_graph::EntityStore;
use serde_json::Value;

use crate::validate::{self, PartialUpdate};

/// Translates entity operations into store calls.
#[derive(Clone)]
pub struct EntityService {
    store: Arc<dyn EntityStore>,
}

impl EntityService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Create the per-kind uniqueness constraints. Safe to call repeatedly.
    pub async fn initialize_schema(&self) -> Result<()> {
        self.store.initialize_schema().await?;
        tracing::info!("Schema initialized");
        Ok(())
    }

    /// Ingest customers, then opportunities, then interactions.
    ///
    /// Each record succeeds or fails on its own; the report carries one
    /// outcome per input record in input order.
    pub async fn create(&self, request: &BulkCreateRequest) -> BulkCreateReport {
        let mut report = BulkCreateReport::default();

        for (kind, records) in request.batches() {
            for (index, raw) in records.iter().enumerate() {
                let outcome = self.create_one(kind, index, raw).await;
                if let Some(error) = &outcome.error {
                    tracing::warn!(kind = %kind, index, error = %error, "Record rejected");
                }
                report.push(outcome);
            }
        }

        tracing::info!(
            stored = report.stored,
            failed = report.failed,
            "Bulk create finished"
        );
        report
    }

    async fn create_one(&self, kind: EntityKind, index: usize, raw: &Value) -> RecordOutcome {
        let mut outcome = RecordOutcome {
            kind,
            index,
            id: raw.get("id").and_then(|v| EntityId::from_value("id", v).ok()),
            status: RecordStatus::Failed,
            linked: None,
            error: None,
        };

        let result: Result<Option<bool>> = async {
            let record = validate::parse_record(kind, raw)?;
            let owner = validate::owner_ref(kind, &record.attributes)?;
            self.store.merge_entity(&record).await?;
            match owner {
                Some(customer_id) => Ok(Some(
                    self.store.set_owner(kind, record.id, Some(customer_id)).await?,
                )),
                // Without a customer_id the existing owner edge is kept.
                None if kind.owner_relationship().is_some() => {
                    match self.store.relations(kind, record.id).await? {
                        Relations::Owned { customer_id } => Ok(Some(customer_id.is_some())),
                        Relations::Customer { .. } => Ok(Some(false)),
                    }
                }
                None => Ok(None),
            }
        }
        .await;

        match result {
            Ok(linked) => {
                outcome.status = RecordStatus::Stored;
                outcome.linked = linked;
            }
            Err(e) => outcome.error = Some(e.to_string()),
        }
        outcome
    }

    /// Merge `partial` onto an existing entity and return it as retrieve would.
    pub async fn update(&self, kind: EntityKind, id: EntityId, partial: &Value) -> Result<EntityView> {
        let PartialUpdate { attributes, owner } = validate::parse_partial(kind, id, partial)?;

        let updated = self
            .store
            .update_entity(kind, id, &attributes)
            .await?
            .ok_or(CrmError::NotFound { kind, id })?;

        if let Some(customer_id) = owner {
            let linked = self.store.set_owner(kind, id, customer_id).await?;
            tracing::debug!(kind = %kind, id = id.0, linked, "Owner relationship updated");
        }

        let relations = self.store.relations(kind, id).await?;
        tracing::info!(kind = %kind, id = id.0, fields = attributes.len(), "Entity updated");

        Ok(EntityView {
            kind,
            id,
            attributes: updated,
            relations,
        })
    }

    /// Detach-delete an entity.
    pub async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<DeleteAck> {
        if !self.store.delete_entity(kind, id).await? {
            return Err(CrmError::NotFound { kind, id });
        }
        tracing::info!(kind = %kind, id = id.0, "Entity deleted");
        Ok(DeleteAck {
            deleted: true,
            kind,
            id,
        })
    }

    /// Fetch an entity with the ids of its one-hop neighbours.
    pub async fn retrieve(&self, kind: EntityKind, id: EntityId) -> Result<EntityView> {
        let attributes = self
            .store
            .get_entity(kind, id)
            .await?
            .ok_or(CrmError::NotFound { kind, id })?;
        let relations = self.store.relations(kind, id).await?;

        Ok(EntityView {
            kind,
            id,
            attributes,
            relations,
        })
    }

    /// Check the backing store is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await?;
        Ok(())
    }
}
