//! Concrete invariant rules over organisation nodes. Every rule answers
//! `Ok(true)` for a valid candidate; repository-backed rules take the
//! repository as an explicit constructor dependency.

mod fields;
mod hierarchy;
mod uniqueness;

pub use fields::{
    EmailAdressOnOrganisationsTyp, KennungOhneLeerzeichen, KennungRequiredForSchule,
    KlasseNameEnthaeltZeichen, NameOhneLeerzeichen, NameRequiredForKlasse, NameRequiredForSchule,
};
pub use hierarchy::{
    KeinZyklusInAdministriertVon, KeinZyklusInZugehoerigZu, KlasseNurVonSchuleAdministriert,
    NurKlasseKursUnterSchule, OrganisationsOnSameSubtree, RootOrganisationImmutable,
    SchuleAdministriertVonTraeger, SchuleZugehoerigZuTraeger, TraegerAdministriertVonTraeger,
    TraegerUnterRootChild, TraegerZugehoerigZuTraeger,
};
pub use uniqueness::{KennungEindeutigUnterParent, KlassenNameEindeutigUnterSchule};
