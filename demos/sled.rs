//! Walk through the engine against a throwaway sled database: seed the
//! root nodes, build a small school hierarchy, then show a rejected
//! candidate and a batch move.

use std::sync::Arc;

use org_hierarchy::{
    organisation::{OEFFENTLICH_ORGANISATION_ID, OrganisationNode, OrganisationsTyp},
    service::OrganisationService,
};

fn main() -> anyhow::Result<()> {
    let db = sled::open("sled")?;

    if !db.is_empty() {
        db.clear()?;
    }

    let service = OrganisationService::new(Arc::new(db))?;

    let traeger = service.create_organisation(
        OrganisationNode::new(OrganisationsTyp::Traeger)
            .set_name("Schulträger Nord")
            .set_zugehoerig_zu(OEFFENTLICH_ORGANISATION_ID),
    )?;
    println!("created Traeger {}", traeger.id);

    let schule = service.create_organisation(
        OrganisationNode::new(OrganisationsTyp::Schule)
            .set_kennung("0705123")
            .set_name("Grundschule am Hafen")
            .set_administriert_von(&traeger.id)
            .set_zugehoerig_zu(&traeger.id),
    )?;
    println!("created Schule {}", schule.id);

    let klasse = service.create_organisation(
        OrganisationNode::new(OrganisationsTyp::Klasse)
            .set_name("1a")
            .set_administriert_von(&schule.id)
            .set_zugehoerig_zu(&schule.id),
    )?;
    println!("created Klasse {}", klasse.id);

    // a second Schule with the same kennung under the same Traeger is
    // refused with the rule that failed
    let rejected = service.create_organisation(
        OrganisationNode::new(OrganisationsTyp::Schule)
            .set_kennung("0705123")
            .set_name("Doppelgängerschule")
            .set_administriert_von(&traeger.id)
            .set_zugehoerig_zu(&traeger.id),
    );
    println!("duplicate kennung: {:?}", rejected.err().map(|e| e.to_string()));

    // reparent the Traeger's schools under a new carrier in one batch
    let neuer_traeger = service.create_organisation(
        OrganisationNode::new(OrganisationsTyp::Traeger)
            .set_name("Schulträger Süd")
            .set_zugehoerig_zu(OEFFENTLICH_ORGANISATION_ID),
    )?;
    let moved = service.move_organisationen(&[schule.id.clone()], &neuer_traeger.id)?;
    println!(
        "moved {} under {}",
        moved[0].name.as_deref().unwrap_or("?"),
        neuer_traeger.name.as_deref().unwrap_or("?")
    );

    Ok(())
}
