//! Error types. Two classes are kept strictly apart: specification
//! violations (business-rule verdicts, enumerated and entity-scoped) and
//! repository failures (a lookup could not complete). A repository failure
//! is never a verdict.

/// A business-rule violation. One variant per invariant; every variant
/// names the offending entity and maps to a closed i18n code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecificationError {
    #[error("organisation {entity_id} is a Schule without a kennung")]
    KennungRequiredForSchule { entity_id: String },
    #[error("organisation {entity_id} is a Schule without a name")]
    NameRequiredForSchule { entity_id: String },
    #[error("organisation {entity_id} is a Klasse without a name")]
    NameRequiredForKlasse { entity_id: String },
    #[error("kennung of organisation {entity_id} has leading or trailing whitespace")]
    KennungEnthaeltLeerzeichen { entity_id: String },
    #[error("name of organisation {entity_id} has trailing whitespace")]
    NameEnthaeltLeerzeichen { entity_id: String },
    #[error("name of Klasse {entity_id} contains no letter or digit")]
    NameEnthaeltKeineZeichen { entity_id: String },
    #[error("organisation {entity_id} of typ Klasse may not carry an email domain")]
    EmailAdressOnOrganisationsTyp { entity_id: String },

    #[error("Schule {entity_id} must be administered by a Traeger")]
    SchuleAdministriertVonTraeger { entity_id: String },
    #[error("Schule {entity_id} must belong to a Traeger")]
    SchuleZugehoerigZuTraeger { entity_id: String },
    #[error("Klasse {entity_id} must be administered by a Schule")]
    KlasseNurVonSchuleAdministriert { entity_id: String },
    #[error("a Schule may only administer Klassen or Kurse, not {entity_id}")]
    NurKlasseKursUnterSchule { entity_id: String },
    #[error("Traeger {entity_id} may only be administered by a Traeger")]
    TraegerAdministriertVonTraeger { entity_id: String },
    #[error("Traeger {entity_id} may only belong to a Traeger or a root anchor")]
    TraegerZugehoerigZuTraeger { entity_id: String },
    #[error("administriert_von chain of organisation {entity_id} contains a cycle")]
    ZyklusInAdministriertVon { entity_id: String },
    #[error("zugehoerig_zu chain of organisation {entity_id} contains a cycle")]
    ZyklusInZugehoerigZu { entity_id: String },
    #[error("Traeger {entity_id} does not resolve to a root anchor")]
    TraegerUnterRootChild { entity_id: String },
    #[error("organisation {entity_id} is not on the same root subtree as the rest of the batch")]
    OrganisationsOnSameSubtree { entity_id: String },
    #[error("organisation {entity_id} is a root node and immutable")]
    RootOrganisationImmutable { entity_id: String },

    #[error("kennung {kennung} of organisation {entity_id} is already taken under this parent")]
    KennungNichtEindeutig { entity_id: String, kennung: String },
    #[error("Klassenname of {entity_id} is already taken under this Schule")]
    KlassenNameNichtEindeutig { entity_id: String },
}

impl SpecificationError {
    /// The closed i18n key identifying the violated invariant. This is the
    /// contract outer layers translate into user-facing messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::KennungRequiredForSchule { .. } => "KENNUNG_REQUIRED_FOR_SCHULE",
            Self::NameRequiredForSchule { .. } => "NAME_REQUIRED_FOR_SCHULE",
            Self::NameRequiredForKlasse { .. } => "NAME_REQUIRED_FOR_KLASSE",
            Self::KennungEnthaeltLeerzeichen { .. } => "KENNUNG_ENTHAELT_LEERZEICHEN",
            Self::NameEnthaeltLeerzeichen { .. } => "NAME_ENTHAELT_LEERZEICHEN",
            Self::NameEnthaeltKeineZeichen { .. } => "NAME_ENTHAELT_KEINE_ZEICHEN",
            Self::EmailAdressOnOrganisationsTyp { .. } => "EMAIL_ADRESS_ON_ORGANISATION_TYP",
            Self::SchuleAdministriertVonTraeger { .. } => "SCHULE_ADMINISTRIERT_VON_TRAEGER",
            Self::SchuleZugehoerigZuTraeger { .. } => "SCHULE_ZUGEHOERIG_ZU_TRAEGER",
            Self::KlasseNurVonSchuleAdministriert { .. } => "KLASSE_NUR_VON_SCHULE_ADMINISTRIERT",
            Self::NurKlasseKursUnterSchule { .. } => "NUR_KLASSE_KURS_UNTER_SCHULE",
            Self::TraegerAdministriertVonTraeger { .. } => "TRAEGER_ADMINISTRIERT_VON_TRAEGER",
            Self::TraegerZugehoerigZuTraeger { .. } => "TRAEGER_ZUGEHOERIG_ZU_TRAEGER",
            Self::ZyklusInAdministriertVon { .. } => "ZYKLUS_IN_ADMINISTRIERT_VON",
            Self::ZyklusInZugehoerigZu { .. } => "ZYKLUS_IN_ZUGEHOERIG_ZU",
            Self::TraegerUnterRootChild { .. } => "TRAEGER_UNTER_ROOT_CHILD",
            Self::OrganisationsOnSameSubtree { .. } => "ORGANISATIONS_ON_SAME_SUBTREE",
            Self::RootOrganisationImmutable { .. } => "ROOT_ORGANISATION_IMMUTABLE",
            Self::KennungNichtEindeutig { .. } => "KENNUNG_EINDEUTIG_UNTER_PARENT",
            Self::KlassenNameNichtEindeutig { .. } => "KLASSENNAME_EINDEUTIG_UNTER_SCHULE",
        }
    }

    /// The id of the entity the violation is about.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::KennungRequiredForSchule { entity_id }
            | Self::NameRequiredForSchule { entity_id }
            | Self::NameRequiredForKlasse { entity_id }
            | Self::KennungEnthaeltLeerzeichen { entity_id }
            | Self::NameEnthaeltLeerzeichen { entity_id }
            | Self::NameEnthaeltKeineZeichen { entity_id }
            | Self::EmailAdressOnOrganisationsTyp { entity_id }
            | Self::SchuleAdministriertVonTraeger { entity_id }
            | Self::SchuleZugehoerigZuTraeger { entity_id }
            | Self::KlasseNurVonSchuleAdministriert { entity_id }
            | Self::NurKlasseKursUnterSchule { entity_id }
            | Self::TraegerAdministriertVonTraeger { entity_id }
            | Self::TraegerZugehoerigZuTraeger { entity_id }
            | Self::ZyklusInAdministriertVon { entity_id }
            | Self::ZyklusInZugehoerigZu { entity_id }
            | Self::TraegerUnterRootChild { entity_id }
            | Self::OrganisationsOnSameSubtree { entity_id }
            | Self::RootOrganisationImmutable { entity_id }
            | Self::KennungNichtEindeutig { entity_id, .. }
            | Self::KlassenNameNichtEindeutig { entity_id } => entity_id,
        }
    }
}

/// All per-entity violations of a batch operation, in evaluation order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for {} organisation(s)", .errors.len())]
pub struct MultiSpecificationError {
    pub errors: Vec<SpecificationError>,
}

/// Infrastructure failure during a repository lookup or write. Propagated
/// unchanged; callers must not treat this as a verdict in either direction.
#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(#[from] sled::Error),
    #[error("stored organisation could not be decoded: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("organisation could not be encoded: {0}")]
    Encode(String),
}

impl From<minicbor::encode::Error<std::convert::Infallible>> for RepositoryError {
    fn from(err: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        RepositoryError::Encode(err.to_string())
    }
}

/// Result error of the validation orchestrator.
#[derive(thiserror::Error, Debug)]
pub enum OrganisationError {
    #[error(transparent)]
    Specification(#[from] SpecificationError),
    #[error(transparent)]
    Specifications(#[from] MultiSpecificationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
