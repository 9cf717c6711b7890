//! Sled-backed organisation store. Nodes are CBOR-encoded and keyed by
//! their id; multi-node commits go through a single sled batch.

use std::sync::Arc;

use sled::Batch;

use crate::error::RepositoryError;
use crate::organisation::{
    ERSATZ_ORGANISATION_ID, OEFFENTLICH_ORGANISATION_ID, OrganisationNode, OrganisationsTyp,
    ROOT_ORGANISATION_ID,
};
use crate::repository::OrganisationRepository;

pub struct OrganisationStore {
    instance: Arc<sled::Db>,
}

impl OrganisationStore {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    /// Seed the root and the two anchors if they are not present yet.
    /// Idempotent, so every startup can call it.
    pub fn ensure_root_nodes(&self) -> Result<(), RepositoryError> {
        let mut batch = Batch::default();
        let mut seeded = false;

        if self.find_by_id(ROOT_ORGANISATION_ID)?.is_none() {
            let root = OrganisationNode::new_with(
                ROOT_ORGANISATION_ID.to_string(),
                OrganisationsTyp::Root,
            )
            .set_name("Root");
            batch.insert(root.id.as_bytes(), minicbor::to_vec(&root)?);
            seeded = true;
        }
        if self.find_by_id(OEFFENTLICH_ORGANISATION_ID)?.is_none() {
            let oeffentlich = OrganisationNode::new_with(
                OEFFENTLICH_ORGANISATION_ID.to_string(),
                OrganisationsTyp::Land,
            )
            .set_name("Öffentliche Schulen")
            .set_administriert_von(ROOT_ORGANISATION_ID)
            .set_zugehoerig_zu(ROOT_ORGANISATION_ID);
            batch.insert(oeffentlich.id.as_bytes(), minicbor::to_vec(&oeffentlich)?);
            seeded = true;
        }
        if self.find_by_id(ERSATZ_ORGANISATION_ID)?.is_none() {
            let ersatz = OrganisationNode::new_with(
                ERSATZ_ORGANISATION_ID.to_string(),
                OrganisationsTyp::Land,
            )
            .set_name("Ersatzschulen")
            .set_administriert_von(ROOT_ORGANISATION_ID)
            .set_zugehoerig_zu(ROOT_ORGANISATION_ID);
            batch.insert(ersatz.id.as_bytes(), minicbor::to_vec(&ersatz)?);
            seeded = true;
        }

        if seeded {
            self.instance.apply_batch(batch)?;
        }
        Ok(())
    }

    pub fn insert(&self, node: &OrganisationNode) -> Result<(), RepositoryError> {
        let cbor = minicbor::to_vec(node)?;
        self.instance.insert(node.id.as_bytes(), cbor)?;
        Ok(())
    }

    /// Commit several nodes in one atomic batch.
    pub fn insert_batch(&self, nodes: &[OrganisationNode]) -> Result<(), RepositoryError> {
        let mut batch = Batch::default();
        for node in nodes {
            batch.insert(node.id.as_bytes(), minicbor::to_vec(node)?);
        }
        self.instance.apply_batch(batch)?;
        Ok(())
    }

    // full scan; the administrative tree is small and sled iterates in
    // key order without touching values we skip
    fn scan(
        &self,
        matches: impl Fn(&OrganisationNode) -> bool,
    ) -> Result<Option<OrganisationNode>, RepositoryError> {
        for item in self.instance.iter() {
            let (_, value) = item?;
            let node: OrganisationNode = minicbor::decode(value.as_ref())?;
            if matches(&node) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }
}

impl OrganisationRepository for OrganisationStore {
    fn find_by_id(&self, id: &str) -> Result<Option<OrganisationNode>, RepositoryError> {
        match self.instance.get(id.as_bytes())? {
            Some(value) => Ok(Some(minicbor::decode(value.as_ref())?)),
            None => Ok(None),
        }
    }

    fn find_root_direct_children(
        &self,
    ) -> Result<(Option<OrganisationNode>, Option<OrganisationNode>), RepositoryError> {
        Ok((
            self.find_by_id(OEFFENTLICH_ORGANISATION_ID)?,
            self.find_by_id(ERSATZ_ORGANISATION_ID)?,
        ))
    }

    fn find_by_kennung_under_parent(
        &self,
        kennung: &str,
        parent_id: &str,
    ) -> Result<Option<OrganisationNode>, RepositoryError> {
        self.scan(|node| {
            node.kennung.as_deref() == Some(kennung)
                && node.administriert_von.as_deref() == Some(parent_id)
        })
    }

    fn find_by_name_under_parent(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<OrganisationNode>, RepositoryError> {
        self.scan(|node| {
            node.name.as_deref() == Some(name)
                && node.administriert_von.as_deref() == Some(parent_id)
        })
    }
}
