//! Validation orchestrator. Pure decision functions over the persisted
//! graph plus a proposed delta: nothing in here writes, and every call
//! owns its own traversal state. Rules run in a fixed order with the
//! purely-local checks first, so invalid input is rejected before any
//! repository round trip is spent on it.

use crate::error::{MultiSpecificationError, OrganisationError, SpecificationError};
use crate::organisation::OrganisationNode;
use crate::repository::OrganisationRepository;
use crate::rules::{
    EmailAdressOnOrganisationsTyp, KeinZyklusInAdministriertVon, KeinZyklusInZugehoerigZu,
    KennungEindeutigUnterParent, KennungOhneLeerzeichen, KennungRequiredForSchule,
    KlasseNameEnthaeltZeichen, KlasseNurVonSchuleAdministriert, KlassenNameEindeutigUnterSchule,
    NameOhneLeerzeichen, NameRequiredForKlasse, NameRequiredForSchule, NurKlasseKursUnterSchule,
    OrganisationsOnSameSubtree, RootOrganisationImmutable, SchuleAdministriertVonTraeger,
    SchuleZugehoerigZuTraeger, TraegerAdministriertVonTraeger, TraegerUnterRootChild,
    TraegerZugehoerigZuTraeger,
};
use crate::specification::Specification;

fn check<S>(
    spec: &S,
    candidate: &OrganisationNode,
    violation: impl FnOnce() -> SpecificationError,
) -> Result<(), OrganisationError>
where
    S: Specification<Subject = OrganisationNode>,
{
    if spec.is_satisfied_by(candidate)? {
        Ok(())
    } else {
        Err(violation().into())
    }
}

// The shared per-candidate rule set. Both the create and the update path
// evaluate the full set against the candidate state; uniqueness rules
// compare by id, so an unchanged field never collides with itself.
fn validate_candidate(
    repo: &dyn OrganisationRepository,
    candidate: &OrganisationNode,
) -> Result<(), OrganisationError> {
    let id = &candidate.id;

    check(&RootOrganisationImmutable, candidate, || {
        SpecificationError::RootOrganisationImmutable {
            entity_id: id.clone(),
        }
    })?;
    check(&KennungRequiredForSchule, candidate, || {
        SpecificationError::KennungRequiredForSchule {
            entity_id: id.clone(),
        }
    })?;
    check(&NameRequiredForSchule, candidate, || {
        SpecificationError::NameRequiredForSchule {
            entity_id: id.clone(),
        }
    })?;
    check(&NameRequiredForKlasse, candidate, || {
        SpecificationError::NameRequiredForKlasse {
            entity_id: id.clone(),
        }
    })?;
    check(&KennungOhneLeerzeichen, candidate, || {
        SpecificationError::KennungEnthaeltLeerzeichen {
            entity_id: id.clone(),
        }
    })?;
    check(&NameOhneLeerzeichen, candidate, || {
        SpecificationError::NameEnthaeltLeerzeichen {
            entity_id: id.clone(),
        }
    })?;
    check(&KlasseNameEnthaeltZeichen, candidate, || {
        SpecificationError::NameEnthaeltKeineZeichen {
            entity_id: id.clone(),
        }
    })?;
    check(&EmailAdressOnOrganisationsTyp, candidate, || {
        SpecificationError::EmailAdressOnOrganisationsTyp {
            entity_id: id.clone(),
        }
    })?;

    // repository-backed parent-typ rules
    check(&SchuleAdministriertVonTraeger::new(repo), candidate, || {
        SpecificationError::SchuleAdministriertVonTraeger {
            entity_id: id.clone(),
        }
    })?;
    check(&SchuleZugehoerigZuTraeger::new(repo), candidate, || {
        SpecificationError::SchuleZugehoerigZuTraeger {
            entity_id: id.clone(),
        }
    })?;
    check(&KlasseNurVonSchuleAdministriert::new(repo), candidate, || {
        SpecificationError::KlasseNurVonSchuleAdministriert {
            entity_id: id.clone(),
        }
    })?;
    check(&NurKlasseKursUnterSchule::new(repo), candidate, || {
        SpecificationError::NurKlasseKursUnterSchule {
            entity_id: id.clone(),
        }
    })?;
    check(&TraegerAdministriertVonTraeger::new(repo), candidate, || {
        SpecificationError::TraegerAdministriertVonTraeger {
            entity_id: id.clone(),
        }
    })?;
    check(&TraegerZugehoerigZuTraeger::new(repo), candidate, || {
        SpecificationError::TraegerZugehoerigZuTraeger {
            entity_id: id.clone(),
        }
    })?;

    // cycle and anchor walks
    check(&KeinZyklusInAdministriertVon::new(repo), candidate, || {
        SpecificationError::ZyklusInAdministriertVon {
            entity_id: id.clone(),
        }
    })?;
    check(&KeinZyklusInZugehoerigZu::new(repo), candidate, || {
        SpecificationError::ZyklusInZugehoerigZu {
            entity_id: id.clone(),
        }
    })?;
    check(&TraegerUnterRootChild::new(repo), candidate, || {
        SpecificationError::TraegerUnterRootChild {
            entity_id: id.clone(),
        }
    })?;

    // uniqueness last; these scan siblings
    check(&KennungEindeutigUnterParent::new(repo), candidate, || {
        SpecificationError::KennungNichtEindeutig {
            entity_id: id.clone(),
            kennung: candidate.kennung.clone().unwrap_or_default(),
        }
    })?;
    check(&KlassenNameEindeutigUnterSchule::new(repo), candidate, || {
        SpecificationError::KlassenNameNichtEindeutig {
            entity_id: id.clone(),
        }
    })?;

    Ok(())
}

/// Validate a proposed new node against the persisted graph. Surfaces the
/// first violated rule; repository failures propagate unchanged.
pub fn validate_create(
    repo: &dyn OrganisationRepository,
    candidate: &OrganisationNode,
) -> Result<(), OrganisationError> {
    validate_candidate(repo, candidate)
}

/// Validate the merged state of an existing node. The candidate carries
/// the persisted id; reparenting is judged through the candidate's own
/// edges as if already applied.
pub fn validate_update(
    repo: &dyn OrganisationRepository,
    candidate: &OrganisationNode,
) -> Result<(), OrganisationError> {
    validate_candidate(repo, candidate)
}

/// Validate a batch reparent. Subtree cohesion is checked across the whole
/// batch against the persisted state before any per-node rule runs, and
/// all per-entity violations are aggregated rather than only the first.
pub fn validate_move(
    repo: &dyn OrganisationRepository,
    candidates: &[OrganisationNode],
    new_parent_id: &str,
) -> Result<(), OrganisationError> {
    // the target must itself resolve to a root anchor
    let Some(expected) = repo.find_zuordnung(new_parent_id)? else {
        return Err(SpecificationError::OrganisationsOnSameSubtree {
            entity_id: new_parent_id.to_string(),
        }
        .into());
    };

    let subtree = OrganisationsOnSameSubtree::new(repo);
    let mut errors: Vec<SpecificationError> = Vec::new();

    for node in candidates {
        if node.is_root_node() {
            errors.push(SpecificationError::RootOrganisationImmutable {
                entity_id: node.id.clone(),
            });
            continue;
        }
        match subtree.zuordnung_of(node)? {
            Some(anchor) if anchor == expected => {}
            _ => errors.push(SpecificationError::OrganisationsOnSameSubtree {
                entity_id: node.id.clone(),
            }),
        }
    }
    if !errors.is_empty() {
        return Err(MultiSpecificationError { errors }.into());
    }

    // per-node rules against the post-move state
    for node in candidates {
        let moved = node
            .clone()
            .set_administriert_von(new_parent_id)
            .set_zugehoerig_zu(new_parent_id);
        match validate_candidate(repo, &moved) {
            Ok(()) => {}
            Err(OrganisationError::Specification(violation)) => errors.push(violation),
            // infrastructure failures are not verdicts; stop aggregating
            Err(other) => return Err(other),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(MultiSpecificationError { errors }.into())
    }
}
