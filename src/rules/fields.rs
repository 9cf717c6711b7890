//! Purely-local field rules. None of these touch the repository, which is
//! why the orchestrator runs them before any rule that does.

use crate::error::RepositoryError;
use crate::organisation::{OrganisationNode, OrganisationsTyp};
use crate::specification::Specification;

/// A Schule must carry a non-empty kennung.
pub struct KennungRequiredForSchule;

impl Specification for KennungRequiredForSchule {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Schule {
            return Ok(true);
        }
        Ok(candidate
            .kennung
            .as_deref()
            .is_some_and(|kennung| !kennung.trim().is_empty()))
    }
}

/// A Schule must carry a non-empty name.
pub struct NameRequiredForSchule;

impl Specification for NameRequiredForSchule {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Schule {
            return Ok(true);
        }
        Ok(candidate
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty()))
    }
}

/// A Klasse must carry a non-empty name.
pub struct NameRequiredForKlasse;

impl Specification for NameRequiredForKlasse {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Klasse {
            return Ok(true);
        }
        Ok(candidate
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty()))
    }
}

/// The kennung, when set, carries no leading or trailing whitespace.
pub struct KennungOhneLeerzeichen;

impl Specification for KennungOhneLeerzeichen {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        Ok(candidate.kennung_ohne_leerzeichen())
    }
}

/// The name, when set, carries no trailing whitespace.
pub struct NameOhneLeerzeichen;

impl Specification for NameOhneLeerzeichen {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        Ok(candidate.name_ohne_leerzeichen())
    }
}

/// A Klassenname must contain at least one letter or digit. Absence of the
/// name is left to [`NameRequiredForKlasse`].
pub struct KlasseNameEnthaeltZeichen;

impl Specification for KlasseNameEnthaeltZeichen {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        if candidate.typ != OrganisationsTyp::Klasse || candidate.name.is_none() {
            return Ok(true);
        }
        Ok(candidate.name_enthaelt_zeichen())
    }
}

/// A Klasse may not carry an email domain.
pub struct EmailAdressOnOrganisationsTyp;

impl Specification for EmailAdressOnOrganisationsTyp {
    type Subject = OrganisationNode;

    fn is_satisfied_by(&self, candidate: &OrganisationNode) -> Result<bool, RepositoryError> {
        Ok(!(candidate.typ == OrganisationsTyp::Klasse && candidate.email_domain.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schule() -> OrganisationNode {
        OrganisationNode::new(OrganisationsTyp::Schule)
            .set_kennung("0705123")
            .set_name("Testschule")
    }

    #[test]
    fn kennung_required_only_for_schule() {
        let spec = KennungRequiredForSchule;

        assert!(spec.is_satisfied_by(&schule()).unwrap());
        assert!(
            !spec
                .is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Schule))
                .unwrap()
        );
        // a blank kennung does not count as set
        assert!(
            !spec
                .is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Schule).set_kennung("  "))
                .unwrap()
        );
        assert!(
            spec.is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Traeger))
                .unwrap()
        );
    }

    #[test]
    fn name_required_per_typ() {
        assert!(
            !NameRequiredForSchule
                .is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Schule))
                .unwrap()
        );
        assert!(
            !NameRequiredForKlasse
                .is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Klasse))
                .unwrap()
        );
        assert!(
            NameRequiredForKlasse
                .is_satisfied_by(&OrganisationNode::new(OrganisationsTyp::Sonstige))
                .unwrap()
        );
    }

    #[test]
    fn whitespace_rules() {
        let padded = OrganisationNode::new(OrganisationsTyp::Schule)
            .set_kennung(" 123 ")
            .set_name("Schule ");

        assert!(!KennungOhneLeerzeichen.is_satisfied_by(&padded).unwrap());
        assert!(!NameOhneLeerzeichen.is_satisfied_by(&padded).unwrap());
        assert!(KennungOhneLeerzeichen.is_satisfied_by(&schule()).unwrap());
        assert!(NameOhneLeerzeichen.is_satisfied_by(&schule()).unwrap());
    }

    #[test]
    fn klassenname_needs_a_letter_or_digit() {
        let spec = KlasseNameEnthaeltZeichen;

        let klasse = OrganisationNode::new(OrganisationsTyp::Klasse).set_name("--");
        assert!(!spec.is_satisfied_by(&klasse).unwrap());

        let klasse = OrganisationNode::new(OrganisationsTyp::Klasse).set_name("1a");
        assert!(spec.is_satisfied_by(&klasse).unwrap());

        // other node kinds may name themselves however they like
        let sonstige = OrganisationNode::new(OrganisationsTyp::Sonstige).set_name("--");
        assert!(spec.is_satisfied_by(&sonstige).unwrap());
    }

    #[test]
    fn email_domain_forbidden_on_klasse() {
        let spec = EmailAdressOnOrganisationsTyp;

        let klasse =
            OrganisationNode::new(OrganisationsTyp::Klasse).set_email_domain("schule.example");
        assert!(!spec.is_satisfied_by(&klasse).unwrap());

        let schule = schule().set_email_domain("schule.example");
        assert!(spec.is_satisfied_by(&schule).unwrap());
    }
}
