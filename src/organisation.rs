//! Core organisation node model and node kinds
use chrono::{DateTime, TimeZone, Utc};

use crate::utils;

/// Well-known id of the single tree root.
pub const ROOT_ORGANISATION_ID: &str = "org_root";
/// Well-known id of the public-schools anchor directly under the root.
pub const OEFFENTLICH_ORGANISATION_ID: &str = "org_oeffentlich";
/// Well-known id of the substitute-schools anchor directly under the root.
pub const ERSATZ_ORGANISATION_ID: &str = "org_ersatz";

/// Prefix for minted organisation ids (bech32 human-readable part).
pub const ORG_ID_PREFIX: &str = "org_";

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganisationsTyp {
    #[n(0)]
    Root,
    #[n(1)]
    Land,
    #[n(2)]
    Traeger,
    #[n(3)]
    Schule,
    #[n(4)]
    Klasse,
    #[n(5)]
    Kurs,
    #[n(6)]
    Sonstige,
    #[n(7)]
    Anbieter,
}

// Key in the store is the id field. Nodes carry two independent parent
// references: who manages the node and who it is organisationally nested
// under. Both chains must stay acyclic.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct OrganisationNode {
    #[n(0)]
    pub id: String, // bech32 encoded uuid7, or a well-known root id
    #[n(1)]
    pub typ: OrganisationsTyp,
    #[n(2)]
    pub kennung: Option<String>, // external registration code
    #[n(3)]
    pub name: Option<String>,
    #[n(4)]
    pub namensergaenzung: Option<String>,
    #[n(5)]
    pub kuerzel: Option<String>,
    #[n(6)]
    pub email_domain: Option<String>,
    #[n(7)]
    pub administriert_von: Option<String>, // administrative parent id
    #[n(8)]
    pub zugehoerig_zu: Option<String>, // organisational parent id
    #[n(9)]
    pub created_at: TimeStamp<Utc>,
    #[n(10)]
    pub updated_at: TimeStamp<Utc>,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl OrganisationNode {
    /// Construct a node with a freshly minted id. This is the basis for a
    /// create candidate; fields are filled in through the setters below.
    pub fn new(typ: OrganisationsTyp) -> Self {
        let id = utils::new_uuid_to_bech32(ORG_ID_PREFIX)
            .expect("org id prefix is a valid bech32 hrp");
        Self::new_with(id, typ)
    }
    /// Construct a node with a caller-supplied id (well-known roots, or a
    /// node re-hydrated for an update candidate).
    pub fn new_with(id: String, typ: OrganisationsTyp) -> Self {
        let now = TimeStamp::new();
        Self {
            id,
            typ,
            kennung: None,
            name: None,
            namensergaenzung: None,
            kuerzel: None,
            email_domain: None,
            administriert_von: None,
            zugehoerig_zu: None,
            created_at: now.clone(),
            updated_at: now,
        }
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

    /// True when the node is the root or one of the two anchors. These
    /// three are seeded once and never altered or reparented.
    pub fn is_root_node(&self) -> bool {
        is_root_node_id(&self.id)
    }

    /// Checks that the kennung, when set, carries no leading or trailing
    /// whitespace.
    pub fn kennung_ohne_leerzeichen(&self) -> bool {
        match &self.kennung {
            Some(kennung) => kennung == kennung.trim(),
            None => true,
        }
    }
    /// Checks that the name, when set, carries no trailing whitespace.
    pub fn name_ohne_leerzeichen(&self) -> bool {
        match &self.name {
            Some(name) => name == name.trim_end(),
            None => true,
        }
    }
    /// Checks that the name, when set, contains at least one letter or digit.
    pub fn name_enthaelt_zeichen(&self) -> bool {
        match &self.name {
            Some(name) => name.chars().any(|c| c.is_alphanumeric()),
            None => false,
        }
    }
}

/// True for the three seeded node ids (root plus the two anchors).
pub fn is_root_node_id(id: &str) -> bool {
    id == ROOT_ORGANISATION_ID || id == OEFFENTLICH_ORGANISATION_ID || id == ERSATZ_ORGANISATION_ID
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}
impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}
impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
