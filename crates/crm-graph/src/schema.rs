//! Schema initialization: one uniqueness constraint per entity kind.

use crm_core::EntityKind;
use neo4rs::query;

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    /// Ensure `id` is unique for every entity label.
    ///
    /// Safe to call repeatedly. A constraint that already exists (including an
    /// equivalent one under a different name) is not an error.
    pub async fn initialize_schema(&self) -> Result<(), GraphError> {
        for kind in EntityKind::ALL {
            let q = query(&constraint_statement(kind));
            match self.run(q).await {
                Ok(()) => {
                    tracing::info!(label = kind.label(), "Uniqueness constraint ensured");
                }
                Err(e) if is_already_exists(&e) => {
                    tracing::debug!(label = kind.label(), error = %e, "Constraint already present");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Name under which the uniqueness constraint for `kind` is registered.
pub fn constraint_name(kind: EntityKind) -> String {
    format!("{}_id_unique", kind.as_str())
}

fn constraint_statement(kind: EntityKind) -> String {
    format!(
        "CREATE CONSTRAINT {name} IF NOT EXISTS
         FOR (n:{label}) REQUIRE n.id IS UNIQUE",
        name = constraint_name(kind),
        label = kind.label(),
    )
}

/// Neo4j reports pre-existing schema rules under a few different codes
/// depending on server version and whether the names match.
fn is_already_exists(err: &GraphError) -> bool {
    let msg = err.to_string();
    msg.contains("EquivalentSchemaRuleAlreadyExists")
        || msg.contains("ConstraintAlreadyExists")
        || msg.contains("already exists")
}
