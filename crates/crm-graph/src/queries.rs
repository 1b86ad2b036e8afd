//! Read operations for the CRM graph.

use crm_core::{Attributes, EntityId, EntityKind, Relations};
use neo4rs::query;

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Single Node Lookups ──────────────────────────────────────

    /// Get a node's attributes by kind and id.
    pub async fn get_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Attributes>, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             RETURN properties(n) AS props",
            label = kind.label()
        );

        let q = query(&cypher).param("id", id.0);

        match self.query_one(q).await? {
            Some(row) => Ok(Some(row_attributes(&row)?)),
            None => Ok(None),
        }
    }

    // ── Neighbor Queries ─────────────────────────────────────────

    /// One-hop relationship summary for a node.
    pub async fn relations(&self, kind: EntityKind, id: EntityId) -> Result<Relations, GraphError> {
        match kind.owner_relationship() {
            None => self.customer_relations(id).await,
            Some(rel) => self.owner_of(kind, rel, id).await,
        }
    }

    async fn customer_relations(&self, id: EntityId) -> Result<Relations, GraphError> {
        let q = query(
            "MATCH (c:Customer {id: $id})
             OPTIONAL MATCH (o:Opportunity)-[:BELONGS_TO]->(c)
             WITH c, collect(DISTINCT o.id) AS opportunity_ids
             OPTIONAL MATCH (i:Interaction)-[:WITH]->(c)
             RETURN opportunity_ids, collect(DISTINCT i.id) AS interaction_ids",
        )
        .param("id", id.0);

        let Some(row) = self.query_one(q).await? else {
            return Ok(Relations::empty(EntityKind::Customer));
        };

        let mut opportunity_ids: Vec<i64> = row_column(&row, "opportunity_ids")?;
        let mut interaction_ids: Vec<i64> = row_column(&row, "interaction_ids")?;
        opportunity_ids.sort_unstable();
        interaction_ids.sort_unstable();

        Ok(Relations::Customer {
            opportunity_ids: opportunity_ids.into_iter().map(EntityId).collect(),
            interaction_ids: interaction_ids.into_iter().map(EntityId).collect(),
        })
    }

    async fn owner_of(
        &self,
        kind: EntityKind,
        rel: &str,
        id: EntityId,
    ) -> Result<Relations, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             OPTIONAL MATCH (n)-[:{rel}]->(c:Customer)
             RETURN c.id AS customer_id
             LIMIT 1",
            label = kind.label()
        );

        let q = query(&cypher).param("id", id.0);

        let customer_id = match self.query_one(q).await? {
            Some(row) => row_column::<Option<i64>>(&row, "customer_id")?,
            None => None,
        };

        Ok(Relations::Owned {
            customer_id: customer_id.map(EntityId),
        })
    }
}

/// Pull the `props` column out of a row, dropping the `id` key.
/// Decode one column, surfacing type mismatches instead of defaulting.
pub(crate) fn row_column<T>(row: &neo4rs::Row, column: &str) -> Result<T, GraphError>
where
    T: serde::de::DeserializeOwned,
{
    row.get::<T>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read `{column}`: {e}")))
}

pub(crate) fn row_attributes(row: &neo4rs::Row) -> Result<Attributes, GraphError> {
    let mut props: Attributes = row
        .get("props")
        .map_err(|e| GraphError::Serialization(format!("Failed to read node properties: {e}")))?;
    props.remove("id");
    Ok(props)
}
