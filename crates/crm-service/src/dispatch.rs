//! Natural-language query dispatch.
//!
//! Classify → extract id → retrieve. The top-ranked label is always
//! trusted; there is no confidence threshold.

use std::sync::Arc;

use crm_core::{CrmError, EntityKind, EntityView, Result, ValidationError};

use crate::classifier::{Classifier, ClassifierError};
use crate::entity::EntityService;
use crate::extract;

/// Candidate labels offered to the classifier, one per entity kind.
pub const CANDIDATE_LABELS: [&str; 3] = [
    EntityKind::Customer.as_str(),
    EntityKind::Opportunity.as_str(),
    EntityKind::Interaction.as_str(),
];

/// Routes free-text queries to an entity retrieval.
#[derive(Clone)]
pub struct QueryDispatcher {
    classifier: Arc<dyn Classifier>,
    entities: EntityService,
}

impl QueryDispatcher {
    pub fn new(classifier: Arc<dyn Classifier>, entities: EntityService) -> Self {
        Self {
            classifier,
            entities,
        }
    }

    /// Answer a query such as "Tell me about customer 1".
    pub async fn dispatch(&self, query: &str) -> Result<EntityView> {
        if query.trim().is_empty() {
            return Err(ValidationError::missing("query").into());
        }

        let kind = self.classify(query).await?;
        let id = extract::first_id(query)?;

        self.entities.retrieve(kind, id).await
    }

    async fn classify(&self, query: &str) -> Result<EntityKind> {
        let scores = self
            .classifier
            .classify(query, &CANDIDATE_LABELS)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Classifier call failed");
                CrmError::from(e)
            })?;

        // Ties go to the earlier entry.
        let top = scores
            .iter()
            .reduce(|best, s| if s.score > best.score { s } else { best })
            .ok_or_else(|| CrmError::from(ClassifierError::Empty))?;

        let kind = EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == top.label)
            .ok_or_else(|| CrmError::from(ClassifierError::UnknownLabel(top.label.clone())))?;

        tracing::info!(label = %kind, score = top.score, "Query classified");
        Ok(kind)
    }
}
