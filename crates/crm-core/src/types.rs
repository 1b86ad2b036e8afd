//! Core domain types for the CRM graph.
//!
//! Every entity is a Neo4j node carrying a unique integer `id` plus an open,
//! flat map of attributes. Opportunities and Interactions point at the
//! Customer they belong to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Flat property map stored on a node (everything except `id`).
pub type Attributes = Map<String, Value>;

/// Attribute naming the owning customer on Opportunity and Interaction records.
pub const CUSTOMER_REF: &str = "customer_id";

// ── Entity Kinds ──────────────────────────────────────────────────

/// The three record categories held in the graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Opportunity,
    Interaction,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Customer,
        EntityKind::Opportunity,
        EntityKind::Interaction,
    ];

    /// Lowercase wire name, also used as the classifier label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Opportunity => "opportunity",
            EntityKind::Interaction => "interaction",
        }
    }

    /// Neo4j node label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Opportunity => "Opportunity",
            EntityKind::Interaction => "Interaction",
        }
    }

    /// Relationship type from this kind to its owning Customer, if it has one.
    pub fn owner_relationship(&self) -> Option<&'static str> {
        match self {
            EntityKind::Customer => None,
            EntityKind::Opportunity => Some("BELONGS_TO"),
            EntityKind::Interaction => Some("WITH"),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ValidationError;

    /// Case-insensitive; plural path segments (`customers`) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "customers" => Ok(EntityKind::Customer),
            "opportunity" | "opportunities" => Ok(EntityKind::Opportunity),
            "interaction" | "interactions" => Ok(EntityKind::Interaction),
            _ => Err(ValidationError::UnknownEntityKind(s.to_string())),
        }
    }
}

// ── Identifiers ───────────────────────────────────────────────────

/// Unique (per kind) identifier of an entity node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Parse an id from a URL path segment or free-text token.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ValidationError::invalid(field, format!("`{raw}` is not an integer id")))?;
        Self::checked(field, value)
    }

    /// Read an id out of a JSON value. Only non-negative integers are accepted.
    pub fn from_value(field: &str, value: &Value) -> Result<Self, ValidationError> {
        match value.as_i64() {
            Some(v) => Self::checked(field, v),
            None => Err(ValidationError::invalid(
                field,
                format!("expected a non-negative integer, got {value}"),
            )),
        }
    }

    fn checked(field: &str, value: i64) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::invalid(field, "ids must be non-negative"));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Records ───────────────────────────────────────────────────────

/// A validated record ready to be merged into the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub id: EntityId,
    pub attributes: Attributes,
}

/// One-hop relationship summary attached to a retrieved entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Relations {
    /// Ids of the opportunities and interactions pointing at a customer.
    Customer {
        opportunity_ids: Vec<EntityId>,
        interaction_ids: Vec<EntityId>,
    },
    /// The customer an opportunity or interaction is linked to.
    Owned { customer_id: Option<EntityId> },
}

impl Relations {
    /// The relation shape for a kind with nothing linked yet.
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Customer => Relations::Customer {
                opportunity_ids: Vec::new(),
                interaction_ids: Vec::new(),
            },
            EntityKind::Opportunity | EntityKind::Interaction => {
                Relations::Owned { customer_id: None }
            }
        }
    }
}

/// An entity as returned by retrieve, update and the query endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityView {
    pub kind: EntityKind,
    pub id: EntityId,
    pub attributes: Attributes,
    #[serde(flatten)]
    pub relations: Relations,
}

// ── Bulk Ingestion ────────────────────────────────────────────────

/// Body of `POST /create/`. Records stay raw JSON so each one is validated
/// (and can fail) independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub customers: Vec<Value>,
    #[serde(default)]
    pub opportunities: Vec<Value>,
    #[serde(default)]
    pub interactions: Vec<Value>,
}

impl BulkCreateRequest {
    /// Records in ingestion order: customers first so owner links can resolve.
    pub fn batches(&self) -> [(EntityKind, &[Value]); 3] {
        [
            (EntityKind::Customer, self.customers.as_slice()),
            (EntityKind::Opportunity, self.opportunities.as_slice()),
            (EntityKind::Interaction, self.interactions.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Stored,
    Failed,
}

/// Result of ingesting a single record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordOutcome {
    pub kind: EntityKind,
    /// Position of the record within its input array.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub status: RecordStatus,
    /// Whether an owner relationship was created (Opportunity/Interaction only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /create/`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkCreateReport {
    pub outcomes: Vec<RecordOutcome>,
    pub stored: usize,
    pub failed: usize,
}

impl BulkCreateReport {
    pub fn push(&mut self, outcome: RecordOutcome) {
        match outcome.status {
            RecordStatus::Stored => self.stored += 1,
            RecordStatus::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Acknowledgement returned by delete.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeleteAck {
    pub deleted: bool,
    pub kind: EntityKind,
    pub id: EntityId,
}

/// Body of `POST /query/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_kind_parse_is_case_insensitive() {
        assert_eq!("Customer".parse::<EntityKind>().unwrap(), EntityKind::Customer);
        assert_eq!("OPPORTUNITY".parse::<EntityKind>().unwrap(), EntityKind::Opportunity);
        assert_eq!(" interaction ".parse::<EntityKind>().unwrap(), EntityKind::Interaction);
        assert_eq!("opportunities".parse::<EntityKind>().unwrap(), EntityKind::Opportunity);
    }

    #[test]
    fn unknown_entity_kind_is_rejected() {
        let err = "salesrep".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownEntityKind("salesrep".to_string()));
    }

    #[test]
    fn owner_relationships() {
        assert_eq!(EntityKind::Customer.owner_relationship(), None);
        assert_eq!(EntityKind::Opportunity.owner_relationship(), Some("BELONGS_TO"));
        assert_eq!(EntityKind::Interaction.owner_relationship(), Some("WITH"));
    }

    #[test]
    fn entity_id_from_value() {
        assert_eq!(EntityId::from_value("id", &json!(7)).unwrap(), EntityId(7));
        assert!(EntityId::from_value("id", &json!("7")).is_err());
        assert!(EntityId::from_value("id", &json!(1.5)).is_err());
        assert!(EntityId::from_value("id", &json!(-3)).is_err());
    }

    #[test]
    fn entity_id_parse_path_segment() {
        assert_eq!(EntityId::parse("id", "12").unwrap(), EntityId(12));
        let err = EntityId::parse("id", "abc").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { .. }));
    }

    #[test]
    fn customer_view_serializes_related_ids() {
        let view = EntityView {
            kind: EntityKind::Customer,
            id: EntityId(1),
            attributes: json!({"name": "Acme"}).as_object().cloned().unwrap(),
            relations: Relations::Customer {
                opportunity_ids: vec![EntityId(10)],
                interaction_ids: vec![],
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            json!({
                "kind": "customer",
                "id": 1,
                "attributes": {"name": "Acme"},
                "opportunity_ids": [10],
                "interaction_ids": []
            })
        );
    }

    #[test]
    fn owned_view_serializes_customer_id() {
        let view = EntityView {
            kind: EntityKind::Interaction,
            id: EntityId(5),
            attributes: Attributes::new(),
            relations: Relations::empty(EntityKind::Interaction),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["customer_id"], Value::Null);
    }

    #[test]
    fn bulk_request_defaults_missing_arrays() {
        let req: BulkCreateRequest = serde_json::from_value(json!({"customers": [{"id": 1}]})).unwrap();
        assert_eq!(req.customers.len(), 1);
        assert!(req.opportunities.is_empty());
        assert!(req.interactions.is_empty());
    }

    #[test]
    fn bulk_report_counts_outcomes() {
        let mut report = BulkCreateReport::default();
        report.push(RecordOutcome {
            kind: EntityKind::Customer,
            index: 0,
            id: Some(EntityId(1)),
            status: RecordStatus::Stored,
            linked: None,
            error: None,
        });
        report.push(RecordOutcome {
            kind: EntityKind::Customer,
            index: 1,
            id: None,
            status: RecordStatus::Failed,
            linked: None,
            error: Some("missing required field `id`".to_string()),
        });
        assert_eq!(report.stored, 1);
        assert_eq!(report.failed, 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert!(json["outcomes"][0].get("error").is_none());
    }
}
