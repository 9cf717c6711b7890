//! Parent-type, cycle and root-anchor rules. These consult the persisted
//! graph through the repository; the candidate's own edges are read from
//! the in-memory state so a not-yet-committed reparent is judged as if it
//! had been applied.

use crate::error::RepositoryError;
use crate::organisation::{
    ERSATZ_ORGANISATION_ID, OEFFENTLICH_ORGANISATION_ID, OrganisationNode, OrganisationsTyp,
};
use crate::repository::{OrganisationRepository, RootDirectChildrenTyp};
use crate::specification::Specification;

/// Which of the two parent references a rule walks or inspects.
#[derive(Debug, Clone, Copy)]
enum Edge {
    AdministriertVon,
    ZugehoerigZu,
}

impl Edge {
    fn of<'n>(&self, node: &'n OrganisationNode) -> Option<&'n str> {
        match self {
            Edge::AdministriertVon => node.administriert_von.as_deref(),
            Edge::ZugehoerigZu => node.zugehoerig_zu.as_deref(),
        }
    }
}

/// Leaf: the edge points directly at one of the two root anchors.
struct EdgeIstRootChild {
    edge: Edge,
}

impl Specification for EdgeIstRootChild {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        Ok(self.edge.of(candidate).is_some_and(|parent_id| {
            parent_id == OEFFENTLICH_ORGANISATION_ID || parent_id == ERSATZ_ORGANISATION_ID
        }))
    }
}

/// Leaf: the edge is set and resolves to a persisted node of the given
/// typ. An absent edge or an unresolved parent is a violation, not an
/// error.
struct EdgeHatTyp<'a> {
    repo: &'a dyn OrganisationRepository,
    edge: Edge,
    typ: OrganisationsTyp,
}

impl Specification for EdgeHatTyp<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        let Some(parent_id) = self.edge.of(candidate) else {
            return Ok(false);
        };
        match self.repo.find_by_id(parent_id)? {
            Some(parent) => Ok(parent.typ == self.typ),
            None => Ok(false),
        }
    }
}

/// A Schule must be administered by a Traeger.
pub struct SchuleAdministriertVonTraeger<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> SchuleAdministriertVonTraeger<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for SchuleAdministriertVonTraeger<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Schule {
            return Ok(true);
        }
        EdgeHatTyp {
            repo: self.repo,
            edge: Edge::AdministriertVon,
            typ: OrganisationsTyp::Traeger,
        }
        .is_satisfied_by(candidate)
    }
}

/// A Schule must belong to a Traeger.
pub struct SchuleZugehoerigZuTraeger<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> SchuleZugehoerigZuTraeger<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for SchuleZugehoerigZuTraeger<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Schule {
            return Ok(true);
        }
        EdgeHatTyp {
            repo: self.repo,
            edge: Edge::ZugehoerigZu,
            typ: OrganisationsTyp::Traeger,
        }
        .is_satisfied_by(candidate)
    }
}

/// A Klasse must be administered by a Schule.
pub struct KlasseNurVonSchuleAdministriert<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> KlasseNurVonSchuleAdministriert<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for KlasseNurVonSchuleAdministriert<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Klasse {
            return Ok(true);
        }
        EdgeHatTyp {
            repo: self.repo,
            edge: Edge::AdministriertVon,
            typ: OrganisationsTyp::Schule,
        }
        .is_satisfied_by(candidate)
    }
}

/// A Schule may only administer Klassen and Kurse. Judged from the child
/// side when a candidate declares a Schule as its administrative parent.
pub struct NurKlasseKursUnterSchule<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> NurKlasseKursUnterSchule<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for NurKlasseKursUnterSchule<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        let Some(parent_id) = candidate.administriert_von.as_deref() else {
            return Ok(true);
        };
        let Some(parent) = self.repo.find_by_id(parent_id)? else {
            return Ok(true);
        };
        if parent.typ != OrganisationsTyp::Schule {
            return Ok(true);
        }
        Ok(matches!(
            candidate.typ,
            OrganisationsTyp::Klasse | OrganisationsTyp::Kurs
        ))
    }
}

/// A Traeger's administrative parent, when present, must be another
/// Traeger or a root anchor. Top-level carriers without one are permitted.
pub struct TraegerAdministriertVonTraeger<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> TraegerAdministriertVonTraeger<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for TraegerAdministriertVonTraeger<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Traeger {
            return Ok(true);
        }
        if candidate.administriert_von.is_none() {
            return Ok(true);
        }
        EdgeIstRootChild {
            edge: Edge::AdministriertVon,
        }
        .or(EdgeHatTyp {
            repo: self.repo,
            edge: Edge::AdministriertVon,
            typ: OrganisationsTyp::Traeger,
        })
        .is_satisfied_by(candidate)
    }
}

/// A Traeger must belong either directly to a root anchor or to another
/// Traeger.
pub struct TraegerZugehoerigZuTraeger<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> TraegerZugehoerigZuTraeger<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for TraegerZugehoerigZuTraeger<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Traeger {
            return Ok(true);
        }
        EdgeIstRootChild {
            edge: Edge::ZugehoerigZu,
        }
        .or(EdgeHatTyp {
            repo: self.repo,
            edge: Edge::ZugehoerigZu,
            typ: OrganisationsTyp::Traeger,
        })
        .is_satisfied_by(candidate)
    }
}

// Shared chain walk for the two cycle rules. The candidate's own edge is
// the first hop, so a proposed reparent is checked before it is persisted.
// The walk keeps an explicit visited list compared by id; any revisit
// terminates it with a negative verdict, which also bounds the walk on
// corrupted data whose cycle does not pass through the candidate.
fn edge_chain_frei_von_zyklen(
    repo: &dyn OrganisationRepository,
    candidate: &OrganisationNode,
    edge: Edge,
) -> Result<bool, RepositoryError> {
    let mut visited: Vec<String> = vec![candidate.id.clone()];
    let mut cursor = edge.of(candidate).map(str::to_string);

    while let Some(id) = cursor {
        if visited.iter().any(|seen| seen == &id) {
            return Ok(false);
        }
        visited.push(id.clone());

        match repo.find_by_id(&id)? {
            Some(node) => cursor = edge.of(&node).map(str::to_string),
            // dangling reference; the chain ends, the parent-typ rules
            // complain about it where it matters
            None => return Ok(true),
        }
    }
    Ok(true)
}

/// The administriert_von chain starting at the candidate must terminate.
pub struct KeinZyklusInAdministriertVon<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> KeinZyklusInAdministriertVon<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for KeinZyklusInAdministriertVon<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        edge_chain_frei_von_zyklen(self.repo, candidate, Edge::AdministriertVon)
    }
}

/// The zugehoerig_zu chain starting at the candidate must terminate.
pub struct KeinZyklusInZugehoerigZu<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> KeinZyklusInZugehoerigZu<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for KeinZyklusInZugehoerigZu<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        edge_chain_frei_von_zyklen(self.repo, candidate, Edge::ZugehoerigZu)
    }
}

/// A Traeger must resolve, transitively, to one of the two root anchors.
/// The first hop is the candidate's own zugehoerig_zu; everything beyond
/// that is the persisted chain.
pub struct TraegerUnterRootChild<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> TraegerUnterRootChild<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for TraegerUnterRootChild<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Traeger {
            return Ok(true);
        }
        let Some(start) = candidate.zugehoerig_zu.as_deref() else {
            return Ok(false);
        };
        Ok(self.repo.find_zuordnung(start)?.is_some())
    }
}

/// Every node of a batch must resolve to the same root anchor. Evaluated
/// against the persisted state of the batch members.
pub struct OrganisationsOnSameSubtree<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> OrganisationsOnSameSubtree<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }

    /// The anchor a single batch member resolves to.
    pub fn zuordnung_of(
        &self,
        node: &OrganisationNode,
    ) -> Result<Option<RootDirectChildrenTyp>, RepositoryError> {
        self.repo.find_zuordnung(&node.id)
    }
}

impl Specification for OrganisationsOnSameSubtree<'_> {
    type Subject = [OrganisationNode];

    fn is_satisfied_by(&self, candidates: &[OrganisationNode]) -> Result<bool, RepositoryError> {
        let mut reference: Option<RootDirectChildrenTyp> = None;

        for node in candidates {
            let Some(anchor) = self.zuordnung_of(node)? else {
                return Ok(false);
            };
            match reference {
                None => reference = Some(anchor),
                Some(expected) => {
                    if expected != anchor {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

/// The root and the two anchors are seeded once and never altered.
pub struct RootOrganisationImmutable;

impl Specification for RootOrganisationImmutable {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        Ok(!candidate.is_root_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organisation::ROOT_ORGANISATION_ID;
    use crate::repository::testutil::MapRepository;

    fn repo_with_anchors() -> MapRepository {
        MapRepository::new()
            .with(OrganisationNode::new_with(
                ROOT_ORGANISATION_ID.to_string(),
                OrganisationsTyp::Root,
            ))
            .with(
                OrganisationNode::new_with(
                    OEFFENTLICH_ORGANISATION_ID.to_string(),
                    OrganisationsTyp::Land,
                )
                .set_zugehoerig_zu(ROOT_ORGANISATION_ID),
            )
            .with(
                OrganisationNode::new_with(
                    ERSATZ_ORGANISATION_ID.to_string(),
                    OrganisationsTyp::Land,
                )
                .set_zugehoerig_zu(ROOT_ORGANISATION_ID),
            )
    }

    fn traeger(id: &str, zugehoerig_zu: &str) -> OrganisationNode {
        OrganisationNode::new_with(id.to_string(), OrganisationsTyp::Traeger)
            .set_name("Testtraeger")
            .set_zugehoerig_zu(zugehoerig_zu)
    }

    #[test]
    fn schule_needs_traeger_parents() {
        let repo = repo_with_anchors().with(traeger("org_t1", OEFFENTLICH_ORGANISATION_ID));

        let schule = OrganisationNode::new(OrganisationsTyp::Schule)
            .set_administriert_von("org_t1")
            .set_zugehoerig_zu("org_t1");
        assert!(
            SchuleAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&schule)
                .unwrap()
        );
        assert!(
            SchuleZugehoerigZuTraeger::new(&repo)
                .is_satisfied_by(&schule)
                .unwrap()
        );

        // unresolved parent is a violation, not an error
        let dangling = OrganisationNode::new(OrganisationsTyp::Schule)
            .set_administriert_von("org_missing")
            .set_zugehoerig_zu("org_missing");
        assert!(
            !SchuleAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&dangling)
                .unwrap()
        );

        // as is a missing edge
        let orphan = OrganisationNode::new(OrganisationsTyp::Schule);
        assert!(
            !SchuleAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&orphan)
                .unwrap()
        );

        // pointing at the anchor instead of a Traeger is a violation too
        let misparented = OrganisationNode::new(OrganisationsTyp::Schule)
            .set_administriert_von(OEFFENTLICH_ORGANISATION_ID);
        assert!(
            !SchuleAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&misparented)
                .unwrap()
        );
    }

    #[test]
    fn klasse_needs_schule_parent() {
        let mut repo = repo_with_anchors().with(traeger("org_t1", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(
            OrganisationNode::new_with("org_s1".to_string(), OrganisationsTyp::Schule)
                .set_kennung("100")
                .set_name("Schule Eins")
                .set_administriert_von("org_t1")
                .set_zugehoerig_zu("org_t1"),
        );

        let klasse = OrganisationNode::new(OrganisationsTyp::Klasse)
            .set_name("1a")
            .set_administriert_von("org_s1");
        assert!(
            KlasseNurVonSchuleAdministriert::new(&repo)
                .is_satisfied_by(&klasse)
                .unwrap()
        );

        let falsch = OrganisationNode::new(OrganisationsTyp::Klasse)
            .set_name("1a")
            .set_administriert_von("org_t1");
        assert!(
            !KlasseNurVonSchuleAdministriert::new(&repo)
                .is_satisfied_by(&falsch)
                .unwrap()
        );
    }

    #[test]
    fn schule_may_only_administer_klassen_und_kurse() {
        let mut repo = repo_with_anchors().with(traeger("org_t1", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(
            OrganisationNode::new_with("org_s1".to_string(), OrganisationsTyp::Schule)
                .set_kennung("100")
                .set_name("Schule Eins")
                .set_administriert_von("org_t1")
                .set_zugehoerig_zu("org_t1"),
        );

        let spec = NurKlasseKursUnterSchule::new(&repo);

        let klasse = OrganisationNode::new(OrganisationsTyp::Klasse)
            .set_name("1a")
            .set_administriert_von("org_s1");
        assert!(spec.is_satisfied_by(&klasse).unwrap());

        let kurs = OrganisationNode::new(OrganisationsTyp::Kurs)
            .set_name("Mathe AG")
            .set_administriert_von("org_s1");
        assert!(spec.is_satisfied_by(&kurs).unwrap());

        let sonstige = OrganisationNode::new(OrganisationsTyp::Sonstige)
            .set_name("Mensa")
            .set_administriert_von("org_s1");
        assert!(!spec.is_satisfied_by(&sonstige).unwrap());

        // under a non-Schule parent the rule does not apply
        let unter_traeger = OrganisationNode::new(OrganisationsTyp::Sonstige)
            .set_name("Verwaltung")
            .set_administriert_von("org_t1");
        assert!(spec.is_satisfied_by(&unter_traeger).unwrap());
    }

    #[test]
    fn traeger_placement() {
        let repo = repo_with_anchors().with(traeger("org_t1", OEFFENTLICH_ORGANISATION_ID));

        // directly under an anchor
        let top_level = traeger("org_t2", OEFFENTLICH_ORGANISATION_ID);
        assert!(
            TraegerZugehoerigZuTraeger::new(&repo)
                .is_satisfied_by(&top_level)
                .unwrap()
        );

        // nested under another Traeger
        let nested = traeger("org_t3", "org_t1");
        assert!(
            TraegerZugehoerigZuTraeger::new(&repo)
                .is_satisfied_by(&nested)
                .unwrap()
        );

        // belonging to nothing at all is a violation
        let detached =
            OrganisationNode::new_with("org_t4".to_string(), OrganisationsTyp::Traeger);
        assert!(
            !TraegerZugehoerigZuTraeger::new(&repo)
                .is_satisfied_by(&detached)
                .unwrap()
        );

        // administered-by is optional for carriers
        assert!(
            TraegerAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&top_level)
                .unwrap()
        );
        let managed = traeger("org_t5", "org_t1").set_administriert_von("org_t1");
        assert!(
            TraegerAdministriertVonTraeger::new(&repo)
                .is_satisfied_by(&managed)
                .unwrap()
        );
    }

    #[test]
    fn cycle_detection_finds_cycles_through_the_candidate() {
        let mut repo = repo_with_anchors();
        repo.insert(traeger("org_a", "org_b"));
        repo.insert(traeger("org_b", "org_c"));
        repo.insert(traeger("org_c", "org_a"));

        let spec = KeinZyklusInZugehoerigZu::new(&repo);
        for id in ["org_a", "org_b", "org_c"] {
            let node = repo.nodes.get(id).unwrap().clone();
            assert!(!spec.is_satisfied_by(&node).unwrap(), "{id} is on a cycle");
        }
    }

    #[test]
    fn chains_to_the_root_pass_cycle_detection() {
        let mut repo = repo_with_anchors();
        repo.insert(traeger("org_a", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(traeger("org_b", "org_a"));
        repo.insert(traeger("org_c", "org_b"));

        let spec = KeinZyklusInZugehoerigZu::new(&repo);
        let node = repo.nodes.get("org_c").unwrap().clone();
        assert!(spec.is_satisfied_by(&node).unwrap());
    }

    #[test]
    fn proposed_reparent_under_own_descendant_is_a_cycle() {
        let mut repo = repo_with_anchors();
        repo.insert(traeger("org_parent", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(traeger("org_child", "org_parent"));

        // move the parent under its own child before persisting
        let candidate = repo
            .nodes
            .get("org_parent")
            .unwrap()
            .clone()
            .set_zugehoerig_zu("org_child");

        assert!(
            !KeinZyklusInZugehoerigZu::new(&repo)
                .is_satisfied_by(&candidate)
                .unwrap()
        );
    }

    #[test]
    fn traeger_must_resolve_to_an_anchor() {
        let mut repo = repo_with_anchors();
        repo.insert(traeger("org_t1", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(traeger("org_adrift", "org_nowhere"));

        let spec = TraegerUnterRootChild::new(&repo);

        let nested = traeger("org_t2", "org_t1");
        assert!(spec.is_satisfied_by(&nested).unwrap());

        let adrift = repo.nodes.get("org_adrift").unwrap().clone();
        assert!(!spec.is_satisfied_by(&adrift).unwrap());
    }

    #[test]
    fn same_subtree_rule() {
        let mut repo = repo_with_anchors();
        repo.insert(traeger("org_pub", OEFFENTLICH_ORGANISATION_ID));
        repo.insert(traeger("org_ers", ERSATZ_ORGANISATION_ID));
        repo.insert(traeger("org_pub2", "org_pub"));

        let spec = OrganisationsOnSameSubtree::new(&repo);

        let same = vec![
            repo.nodes.get("org_pub").unwrap().clone(),
            repo.nodes.get("org_pub2").unwrap().clone(),
        ];
        assert!(spec.is_satisfied_by(&same).unwrap());

        let mixed = vec![
            repo.nodes.get("org_pub").unwrap().clone(),
            repo.nodes.get("org_ers").unwrap().clone(),
        ];
        assert!(!spec.is_satisfied_by(&mixed).unwrap());
    }

    #[test]
    fn root_nodes_are_immutable() {
        let repo = repo_with_anchors();
        let root = repo.nodes.get(ROOT_ORGANISATION_ID).unwrap().clone();

        assert!(!RootOrganisationImmutable.is_satisfied_by(&root).unwrap());
        assert!(
            RootOrganisationImmutable
                .is_satisfied_by(&traeger("org_t1", OEFFENTLICH_ORGANISATION_ID))
                .unwrap()
        );
    }
}
