//! Service layer API for organisation workflow operations
use std::sync::Arc;

use crate::organisation::{OrganisationNode, TimeStamp};
use crate::repository::OrganisationRepository;
use crate::store::OrganisationStore;
use crate::validation;

/// Field patch for an update. `None` leaves the persisted value untouched;
/// clearing a set field is not expressible, the engine never deletes.
#[derive(Debug, Default, Clone)]
pub struct OrganisationsAenderung {
    pub kennung: Option<String>,
    pub name: Option<String>,
    pub namensergaenzung: Option<String>,
    pub kuerzel: Option<String>,
    pub email_domain: Option<String>,
    pub administriert_von: Option<String>,
    pub zugehoerig_zu: Option<String>,
}

impl OrganisationsAenderung {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_kennung(mut self, kennung: &str) -> Self {
        self.kennung = Some(kennung.to_string());
        self
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn set_namensergaenzung(mut self, namensergaenzung: &str) -> Self {
        self.namensergaenzung = Some(namensergaenzung.to_string());
        self
    }
    pub fn set_kuerzel(mut self, kuerzel: &str) -> Self {
        self.kuerzel = Some(kuerzel.to_string());
        self
    }
    pub fn set_email_domain(mut self, email_domain: &str) -> Self {
        self.email_domain = Some(email_domain.to_string());
        self
    }
    pub fn set_administriert_von(mut self, parent_id: &str) -> Self {
        self.administriert_von = Some(parent_id.to_string());
        self
    }
    pub fn set_zugehoerig_zu(mut self, parent_id: &str) -> Self {
        self.zugehoerig_zu = Some(parent_id.to_string());
        self
    }

    fn apply(&self, node: &mut OrganisationNode) {
        if let Some(kennung) = &self.kennung {
            node.kennung = Some(kennung.clone());
        }
        if let Some(name) = &self.name {
            node.name = Some(name.clone());
        }
        if let Some(namensergaenzung) = &self.namensergaenzung {
            node.namensergaenzung = Some(namensergaenzung.clone());
        }
        if let Some(kuerzel) = &self.kuerzel {
            node.kuerzel = Some(kuerzel.clone());
        }
        if let Some(email_domain) = &self.email_domain {
            node.email_domain = Some(email_domain.clone());
        }
        if let Some(parent_id) = &self.administriert_von {
            node.administriert_von = Some(parent_id.clone());
        }
        if let Some(parent_id) = &self.zugehoerig_zu {
            node.zugehoerig_zu = Some(parent_id.clone());
        }
    }
}

pub struct OrganisationService {
    store: OrganisationStore,
}

impl OrganisationService {
    /// Open the service over a sled instance and seed the root nodes.
    pub fn new(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        let store = OrganisationStore::new(instance);
        store.ensure_root_nodes()?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &OrganisationStore {
        &self.store
    }

    /// Load a single organisation.
    pub fn find_organisation(&self, id: &str) -> anyhow::Result<Option<OrganisationNode>> {
        Ok(self.store.find_by_id(id)?)
    }

    /// Validate a new organisation against the persisted graph and commit
    /// it. The candidate keeps the id minted at construction.
    pub fn create_organisation(
        &self,
        candidate: OrganisationNode,
    ) -> anyhow::Result<OrganisationNode> {
        validation::validate_create(&self.store, &candidate)?;

        self.store.insert(&candidate)?;

        Ok(candidate)
    }

    /// Merge a field patch into the persisted state, re-validate the full
    /// candidate, and commit.
    pub fn update_organisation(
        &self,
        id: &str,
        aenderung: OrganisationsAenderung,
    ) -> anyhow::Result<OrganisationNode> {
        let mut node = self
            .store
            .find_by_id(id)?
            .ok_or_else(|| anyhow::anyhow!("organisation {} not found", id))?;

        aenderung.apply(&mut node);
        node.updated_at = TimeStamp::new();

        validation::validate_update(&self.store, &node)?;

        self.store.insert(&node)?;

        Ok(node)
    }

    /// Reparent a batch of organisations under a new parent. The whole
    /// batch is validated first (subtree cohesion, then every per-node
    /// rule against the post-move state); on success the moves are
    /// committed in one sled batch.
    pub fn move_organisationen(
        &self,
        ids: &[String],
        new_parent_id: &str,
    ) -> anyhow::Result<Vec<OrganisationNode>> {
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let node = self
                .store
                .find_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("organisation {} not found", id))?;
            candidates.push(node);
        }

        validation::validate_move(&self.store, &candidates, new_parent_id)?;

        let now = TimeStamp::new();
        let moved: Vec<OrganisationNode> = candidates
            .into_iter()
            .map(|mut node| {
                node.administriert_von = Some(new_parent_id.to_string());
                node.zugehoerig_zu = Some(new_parent_id.to_string());
                node.updated_at = now.clone();
                node
            })
            .collect();

        self.store.insert_batch(&moved)?;

        Ok(moved)
    }
}
