//! Sibling-uniqueness rules. Both compare by id so an unchanged node does
//! not collide with its own persisted state on update.

use crate::error::RepositoryError;
use crate::organisation::{OrganisationNode, OrganisationsTyp};
use crate::repository::OrganisationRepository;
use crate::specification::Specification;

/// A kennung must be unique among siblings under the same administrative
/// parent.
pub struct KennungEindeutigUnterParent<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> KennungEindeutigUnterParent<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for KennungEindeutigUnterParent<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        let (Some(kennung), Some(parent_id)) = (
            candidate.kennung.as_deref(),
            candidate.administriert_von.as_deref(),
        ) else {
            return Ok(true);
        };
        match self.repo.find_by_kennung_under_parent(kennung, parent_id)? {
            Some(other) => Ok(other.id == candidate.id),
            None => Ok(true),
        }
    }
}

/// A Klassenname must be unique among the Klassen under the same Schule.
pub struct KlassenNameEindeutigUnterSchule<'a> {
    repo: &'a dyn OrganisationRepository,
}

impl<'a> KlassenNameEindeutigUnterSchule<'a> {
    pub fn new(repo: &'a dyn OrganisationRepository) -> Self {
        Self { repo }
    }
}

impl Specification for KlassenNameEindeutigUnterSchule<'_> {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Klasse {
            return Ok(true);
        }
        let (Some(name), Some(parent_id)) = (
            candidate.name.as_deref(),
            candidate.administriert_von.as_deref(),
        ) else {
            return Ok(true);
        };
        match self.repo.find_by_name_under_parent(name, parent_id)? {
            Some(other) => Ok(other.id == candidate.id || other.typ != OrganisationsTyp::Klasse),
            None => Ok(true),
        }
    }
}
