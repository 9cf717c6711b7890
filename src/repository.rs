//! Abstract read access to the persisted hierarchy. Every rule that needs
//! to look at related nodes goes through this trait, so the engine can be
//! driven by the sled-backed store or by an in-memory test double alike.

use crate::error::RepositoryError;
use crate::organisation::{
    ERSATZ_ORGANISATION_ID, OEFFENTLICH_ORGANISATION_ID, OrganisationNode, ROOT_ORGANISATION_ID,
};

/// Which of the two root anchors a node ultimately belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootDirectChildrenTyp {
    Oeffentlich,
    Ersatz,
}

pub trait OrganisationRepository {
    /// Fetch a single node. `Ok(None)` means the id is unknown; that is a
    /// verdict for the rules, not a failure.
    fn find_by_id(&self, id: &str) -> Result<Option<OrganisationNode>, RepositoryError>;

    /// The two direct children of the tree root: the public anchor and the
    /// substitute anchor, in that order.
    fn find_root_direct_children(
        &self,
    ) -> Result<(Option<OrganisationNode>, Option<OrganisationNode>), RepositoryError>;

    /// First node carrying `kennung` whose administrative parent is
    /// `parent_id`. Used by the sibling-uniqueness rules.
    fn find_by_kennung_under_parent(
        &self,
        kennung: &str,
        parent_id: &str,
    ) -> Result<Option<OrganisationNode>, RepositoryError>;

    /// First node carrying `name` whose administrative parent is
    /// `parent_id`.
    fn find_by_name_under_parent(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<OrganisationNode>, RepositoryError>;

    /// Resolve which root anchor a node ultimately belongs to by walking
    /// the `zugehoerig_zu` chain. Returns `None` when the chain dead-ends,
    /// leaves the tree, or revisits a node before reaching an anchor. The
    /// walk is an explicit loop over ids so termination does not depend on
    /// the stored data being well-formed.
    fn find_zuordnung(&self, id: &str) -> Result<Option<RootDirectChildrenTyp>, RepositoryError> {
        let mut visited: Vec<String> = Vec::new();
        let mut cursor = id.to_string();

        loop {
            if cursor == OEFFENTLICH_ORGANISATION_ID {
                return Ok(Some(RootDirectChildrenTyp::Oeffentlich));
            }
            if cursor == ERSATZ_ORGANISATION_ID {
                return Ok(Some(RootDirectChildrenTyp::Ersatz));
            }
            // reached the root without passing an anchor
            if cursor == ROOT_ORGANISATION_ID {
                return Ok(None);
            }
            if visited.iter().any(|seen| seen == &cursor) {
                return Ok(None);
            }
            visited.push(cursor.clone());

            match self.find_by_id(&cursor)? {
                Some(node) => match node.zugehoerig_zu {
                    Some(parent_id) => cursor = parent_id,
                    None => return Ok(None),
                },
                None => return Ok(None),
            }
        }
    }
}

/// In-memory repository over a plain map. Test double for the unit tests
/// of the rules and the orchestrator; the integration tests run against
/// the sled store instead.
#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub struct MapRepository {
        pub nodes: BTreeMap<String, OrganisationNode>,
    }

    impl MapRepository {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn with(mut self, node: OrganisationNode) -> Self {
            self.insert(node);
            self
        }
        pub fn insert(&mut self, node: OrganisationNode) {
            self.nodes.insert(node.id.clone(), node);
        }
    }

    impl OrganisationRepository for MapRepository {
        fn find_by_id(&self, id: &str) -> Result<Option<OrganisationNode>, RepositoryError> {
            Ok(self.nodes.get(id).cloned())
        }

        fn find_root_direct_children(
            &self,
        ) -> Result<(Option<OrganisationNode>, Option<OrganisationNode>), RepositoryError> {
            Ok((
                self.nodes.get(OEFFENTLICH_ORGANISATION_ID).cloned(),
                self.nodes.get(ERSATZ_ORGANISATION_ID).cloned(),
            ))
        }

        fn find_by_kennung_under_parent(
            &self,
            kennung: &str,
            parent_id: &str,
        ) -> Result<Option<OrganisationNode>, RepositoryError> {
            Ok(self
                .nodes
                .values()
                .find(|node| {
                    node.kennung.as_deref() == Some(kennung)
                        && node.administriert_von.as_deref() == Some(parent_id)
                })
                .cloned())
        }

        fn find_by_name_under_parent(
            &self,
            name: &str,
            parent_id: &str,
        ) -> Result<Option<OrganisationNode>, RepositoryError> {
            Ok(self
                .nodes
                .values()
                .find(|node| {
                    node.name.as_deref() == Some(name)
                        && node.administriert_von.as_deref() == Some(parent_id)
                })
                .cloned())
        }
    }

    /// Repository whose lookups always fail. Used to verify that the
    /// engine fails closed instead of treating an I/O failure as a verdict.
    pub struct FailingRepository;

    impl OrganisationRepository for FailingRepository {
        fn find_by_id(&self, _id: &str) -> Result<Option<OrganisationNode>, RepositoryError> {
            Err(RepositoryError::Encode("lookup failed".to_string()))
        }
        fn find_root_direct_children(
            &self,
        ) -> Result<(Option<OrganisationNode>, Option<OrganisationNode>), RepositoryError> {
            Err(RepositoryError::Encode("lookup failed".to_string()))
        }
        fn find_by_kennung_under_parent(
            &self,
            _kennung: &str,
            _parent_id: &str,
        ) -> Result<Option<OrganisationNode>, RepositoryError> {
            Err(RepositoryError::Encode("lookup failed".to_string()))
        }
        fn find_by_name_under_parent(
            &self,
            _name: &str,
            _parent_id: &str,
        ) -> Result<Option<OrganisationNode>, RepositoryError> {
            Err(RepositoryError::Encode("lookup failed".to_string()))
        }
    }
}
