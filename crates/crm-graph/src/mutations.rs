//! Write operations for the CRM graph.
//!
//! Nodes are identified by (label, id). Creation uses MERGE so re-ingesting
//! the same record updates it in place instead of violating the uniqueness
//! constraint.

use crm_core::{Attributes, EntityId, EntityKind, EntityRecord};
use neo4rs::{query, BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value;

use crate::client::{GraphClient, GraphError};
use crate::queries::{row_attributes, row_column};

impl GraphClient {
    // ── Node Upserts ─────────────────────────────────────────────

    /// Merge a record keyed on its id, then overlay its attributes.
    pub async fn merge_entity(&self, record: &EntityRecord) -> Result<(), GraphError> {
        let cypher = format!(
            "MERGE (n:{label} {{id: $id}})
             SET n += $props",
            label = record.kind.label()
        );

        let q = query(&cypher)
            .param("id", record.id.0)
            .param("props", attributes_to_bolt(&record.attributes));

        self.run(q).await?;
        tracing::debug!(kind = %record.kind, id = record.id.0, "Merged entity");
        Ok(())
    }

    /// Partially update an existing node. `null` values remove attributes.
    ///
    /// Returns the node's attributes after the update, or `None` when no node
    /// with that id exists.
    pub async fn update_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<Option<Attributes>, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             SET n += $props
             RETURN properties(n) AS props",
            label = kind.label()
        );

        let q = query(&cypher)
            .param("id", id.0)
            .param("props", attributes_to_bolt(attributes));

        match self.query_one(q).await? {
            Some(row) => Ok(Some(row_attributes(&row)?)),
            None => Ok(None),
        }
    }

    // ── Relationships ────────────────────────────────────────────

    /// Point an opportunity or interaction at its customer, replacing any
    /// previous owner edge. `None` just removes the edge.
    ///
    /// Returns whether an edge now exists; a customer id with no matching
    /// node leaves the record unlinked.
    pub async fn set_owner(
        &self,
        kind: EntityKind,
        id: EntityId,
        customer_id: Option<EntityId>,
    ) -> Result<bool, GraphError> {
        let Some(rel) = kind.owner_relationship() else {
            return Ok(false);
        };
        let label = kind.label();

        let Some(customer_id) = customer_id else {
            let cypher = format!(
                "MATCH (n:{label} {{id: $id}})-[old:{rel}]->(:Customer)
                 DELETE old"
            );
            self.run(query(&cypher).param("id", id.0)).await?;
            return Ok(false);
        };

        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             OPTIONAL MATCH (n)-[old:{rel}]->(:Customer)
             DELETE old
             WITH DISTINCT n
             MATCH (c:Customer {{id: $customer_id}})
             MERGE (n)-[:{rel}]->(c)
             RETURN count(c) AS linked"
        );

        let q = query(&cypher)
            .param("id", id.0)
            .param("customer_id", customer_id.0);

        let linked = match self.query_one(q).await? {
            Some(row) => row_column::<i64>(&row, "linked")? > 0,
            None => false,
        };
        if !linked {
            tracing::debug!(kind = %kind, id = id.0, customer_id = customer_id.0, "Owner customer not found, left unlinked");
        }
        Ok(linked)
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Delete a node together with every relationship touching it.
    /// Returns whether a node was deleted.
    pub async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<bool, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             DETACH DELETE n
             RETURN count(n) AS cnt",
            label = kind.label()
        );

        let q = query(&cypher).param("id", id.0);

        match self.query_one(q).await? {
            Some(row) => Ok(row_column::<i64>(&row, "cnt")? > 0),
            None => Ok(false),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Convert an attribute map into a Bolt map parameter.
pub(crate) fn attributes_to_bolt(attributes: &Attributes) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in attributes {
        map.put(BoltString::from(key.as_str()), to_bolt(value));
    }
    BoltType::Map(map)
}

fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => n
                .as_f64()
                .map(BoltType::from)
                .unwrap_or(BoltType::Null(BoltNull)),
        },
        Value::String(s) => BoltType::from(s.clone()),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => attributes_to_bolt(map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_map_to_matching_bolt_types() {
        assert!(matches!(to_bolt(&json!(3)), BoltType::Integer(_)));
        assert!(matches!(to_bolt(&json!(2.5)), BoltType::Float(_)));
        assert!(matches!(to_bolt(&json!(true)), BoltType::Boolean(_)));
        assert!(matches!(to_bolt(&json!("x")), BoltType::String(_)));
        assert!(matches!(to_bolt(&Value::Null), BoltType::Null(_)));
    }

    #[test]
    fn arrays_become_lists() {
        match to_bolt(&json!(["a", "b"])) {
            BoltType::List(list) => assert_eq!(list.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn attributes_become_a_map() {
        let attrs = json!({"name": "Acme", "tier": 2}).as_object().cloned().unwrap();
        match attributes_to_bolt(&attrs) {
            BoltType::Map(map) => assert_eq!(map.value.len(), 2),
            other => panic!("expected map, got {other:?}"),
        }
    }
}
