//! In-memory implementation of [`EntityStore`].
//!
//! Mirrors the Cypher semantics of [`GraphClient`](crate::GraphClient):
//! merge-by-id, `null` removes an attribute, detach delete, and owner edges
//! only to customers that exist. Used by tests and by `--in-memory` mode.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use crm_core::{Attributes, EntityId, EntityKind, EntityRecord, Relations};
use tokio::sync::RwLock;

use crate::client::GraphError;
use crate::store::EntityStore;

type NodeKey = (EntityKind, EntityId);

#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<NodeKey, Attributes>>,
    /// Opportunity/Interaction -> owning customer.
    owners: RwLock<HashMap<NodeKey, EntityId>>,
    constraints: RwLock<BTreeSet<EntityKind>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost database connection: every call fails until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of uniqueness constraints registered so far.
    pub async fn constraint_count(&self) -> usize {
        self.constraints.read().await.len()
    }

    fn check_online(&self) -> Result<(), GraphError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GraphError::Connection("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn apply(target: &mut Attributes, changes: &Attributes) {
    for (key, value) in changes {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn initialize_schema(&self) -> Result<(), GraphError> {
        self.check_online()?;
        let mut constraints = self.constraints.write().await;
        for kind in EntityKind::ALL {
            constraints.insert(kind);
        }
        Ok(())
    }

    async fn merge_entity(&self, record: &EntityRecord) -> Result<(), GraphError> {
        self.check_online()?;
        let mut nodes = self.nodes.write().await;
        let node = nodes.entry((record.kind, record.id)).or_default();
        apply(node, &record.attributes);
        Ok(())
    }

    async fn set_owner(
        &self,
        kind: EntityKind,
        id: EntityId,
        customer_id: Option<EntityId>,
    ) -> Result<bool, GraphError> {
        self.check_online()?;
        if kind.owner_relationship().is_none() {
            return Ok(false);
        }
        let nodes = self.nodes.read().await;
        let mut owners = self.owners.write().await;
        if !nodes.contains_key(&(kind, id)) {
            return Ok(false);
        }
        owners.remove(&(kind, id));

        match customer_id {
            Some(customer) if nodes.contains_key(&(EntityKind::Customer, customer)) => {
                owners.insert((kind, id), customer);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<Option<Attributes>, GraphError> {
        self.check_online()?;
        let mut nodes = self.nodes.write().await;
        Ok(nodes.get_mut(&(kind, id)).map(|node| {
            apply(node, attributes);
            node.clone()
        }))
    }

    async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<bool, GraphError> {
        self.check_online()?;
        let mut nodes = self.nodes.write().await;
        let mut owners = self.owners.write().await;
        if nodes.remove(&(kind, id)).is_none() {
            return Ok(false);
        }
        match kind {
            EntityKind::Customer => owners.retain(|_, customer| *customer != id),
            EntityKind::Opportunity | EntityKind::Interaction => {
                owners.remove(&(kind, id));
            }
        }
        Ok(true)
    }

    async fn get_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Attributes>, GraphError> {
        self.check_online()?;
        Ok(self.nodes.read().await.get(&(kind, id)).cloned())
    }

    async fn relations(&self, kind: EntityKind, id: EntityId) -> Result<Relations, GraphError> {
        self.check_online()?;
        let owners = self.owners.read().await;
        match kind {
            EntityKind::Customer => {
                let mut opportunity_ids = Vec::new();
                let mut interaction_ids = Vec::new();
                for ((owned_kind, owned_id), customer) in owners.iter() {
                    if *customer != id {
                        continue;
                    }
                    match owned_kind {
                        EntityKind::Opportunity => opportunity_ids.push(*owned_id),
                        EntityKind::Interaction => interaction_ids.push(*owned_id),
                        EntityKind::Customer => {}
                    }
                }
                opportunity_ids.sort_unstable();
                interaction_ids.sort_unstable();
                Ok(Relations::Customer {
                    opportunity_ids,
                    interaction_ids,
                })
            }
            EntityKind::Opportunity | EntityKind::Interaction => Ok(Relations::Owned {
                customer_id: owners.get(&(kind, id)).copied(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), GraphError> {
        self.check_online()
    }
}
