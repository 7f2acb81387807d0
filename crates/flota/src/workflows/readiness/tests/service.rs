use super::common::*;
use crate::workflows::fleet::{CrewMemberId, DirectoryError, ShipId};
use crate::workflows::readiness::{
    EntityKind, ExpiryCheck, ListPhase, ListView, ReadinessServiceError,
};

#[tokio::test]
async fn fleet_overview_isolates_failing_ship() {
    let directory = three_ship_fleet();
    let service = service(&directory);

    let overview = service
        .fleet_overview(today())
        .await
        .expect("listing succeeds");

    assert_eq!(overview.expiry.get(&ShipId::from("1")), Some(false));
    assert_eq!(overview.expiry.get(&ShipId::from("2")), Some(false));
    assert_eq!(overview.expiry.get(&ShipId::from("3")), Some(true));
    assert_eq!(overview.summary.banner, "1 barco(s) con documentos caducados.");

    let flags: Vec<_> = overview
        .ships
        .iter()
        .map(|row| (row.ship.id.0.as_str(), row.has_expired_documents))
        .collect();
    assert_eq!(flags, [("1", false), ("2", false), ("3", true)]);
}

#[tokio::test]
async fn fleet_overview_propagates_listing_failure() {
    let directory = three_ship_fleet();
    directory.take_listing_down();

    match service(&directory).fleet_overview(today()).await {
        Err(ReadinessServiceError::Directory(_)) => {}
        other => panic!("expected directory error, got {other:?}"),
    }
}

#[tokio::test]
async fn fleet_view_refresh_walks_state_machine() {
    let directory = three_ship_fleet();
    let service = service(&directory);
    let mut view = ListView::new(EntityKind::Ship);

    service
        .refresh_fleet_view(&mut view, today())
        .await
        .expect("refresh applies");

    assert_eq!(view.phase(), &ListPhase::Loaded);
    assert_eq!(view.check(), ExpiryCheck::Done);
    assert_eq!(view.rows().len(), 3);
    assert!(view.has_expired(&ShipId::from("3")));
    assert_eq!(view.summary().expired, 1);
}

#[tokio::test]
async fn fleet_view_listing_failure_resets_derived_state() {
    let directory = three_ship_fleet();
    let service = service(&directory);
    let mut view = ListView::new(EntityKind::Ship);
    service
        .refresh_fleet_view(&mut view, today())
        .await
        .expect("first refresh applies");
    assert_eq!(view.summary().expired, 1);

    directory.take_listing_down();
    service
        .refresh_fleet_view(&mut view, today())
        .await
        .expect("failed refresh is still a valid transition");

    assert_eq!(
        view.phase(),
        &ListPhase::LoadError("No se pudo cargar el listado.".to_string())
    );
    assert!(view.expiry().is_empty());
    assert_eq!(view.summary().banner, "");
}

#[tokio::test]
async fn empty_crew_list_skips_document_checks() {
    let directory = FakeDirectory::default();
    let service = service(&directory);
    let mut view = ListView::new(EntityKind::CrewMember);

    service
        .refresh_crew_view(&mut view, today())
        .await
        .expect("refresh applies");

    assert_eq!(view.check(), ExpiryCheck::Done);
    assert!(view.expiry().is_empty());
    assert!(directory.crew_document_calls().is_empty());
}

#[tokio::test]
async fn crew_overview_flags_expired_members() {
    let directory = FakeDirectory::default();
    directory.add_crew(
        crew_member("u-1", "Lucía"),
        vec![document("Pasaporte", Some("2026-10-18"))],
    );
    directory.add_crew(
        crew_member("u-2", "Mario"),
        vec![document("Pasaporte", Some("2026-10-19"))],
    );
    directory.add_crew(crew_member("u-3", "Irene"), Vec::new());
    directory.fail_crew_documents("u-3");

    let overview = service(&directory)
        .crew_overview(today())
        .await
        .expect("listing succeeds");

    assert!(overview.expiry.has_expired(&CrewMemberId::from("u-1")));
    assert!(!overview.expiry.has_expired(&CrewMemberId::from("u-2")));
    assert_eq!(overview.expiry.get(&CrewMemberId::from("u-3")), Some(false));
    assert_eq!(
        overview.summary.banner,
        "1 tripulante(s) con documentos caducados."
    );
}

#[tokio::test]
async fn ship_readiness_combines_ship_and_crew_state() {
    let directory = FakeDirectory::default();
    directory.add_ship(
        ship("b-1", "Estrella Polar"),
        vec![document("Navegabilidad", Some("2026-01-01T00:00:00Z"))],
    );
    directory.add_crew(
        crew_member("u-1", "Lucía"),
        vec![document("Libreta", Some("2025-12-31"))],
    );
    directory.add_crew(
        crew_member("u-2", "Mario"),
        vec![document("Libreta", Some("2024-03-01"))],
    );
    directory.add_crew(
        crew_member("u-3", "Irene"),
        vec![document("Libreta", Some("2999-12-31"))],
    );
    for member in ["u-1", "u-2", "u-3"] {
        directory.enrol("b-1", member);
    }

    let report = service(&directory)
        .ship_readiness(&ShipId::from("b-1"), today())
        .await
        .expect("ship exists");

    assert_eq!(report.ship_name.as_deref(), Some("Estrella Polar"));
    assert!(report.ship_documents_expired);
    assert_eq!(report.crew_expired_count, 2);
    assert!(!report.may_sail());
    assert_eq!(
        report.warning,
        "Este barco no puede zarpar al mar: documentos del barco caducados y 2 tripulante(s) con documentos caducados."
    );
    let flagged: Vec<_> = report
        .crew
        .iter()
        .filter(|row| row.has_expired_documents)
        .map(|row| row.assignment.member_id.0.as_str())
        .collect();
    assert_eq!(flagged, ["u-1", "u-2"]);
    assert!(report.crew_error.is_none());
}

#[tokio::test]
async fn ship_readiness_fails_open_on_lookup_errors() {
    let directory = FakeDirectory::default();
    directory.add_ship(
        ship("b-2", "Cabo Mayor"),
        vec![document("ISM", Some("2001-01-01"))],
    );
    directory.enrol("b-2", "u-9");
    directory.fail_ship_documents("b-2");
    directory.fail_roster("b-2");
    directory.take_profiles_down();

    let report = service(&directory)
        .ship_readiness(&ShipId::from("b-2"), today())
        .await
        .expect("transient failures degrade the report");

    assert!(report.ship_name.is_none());

    assert!(!report.ship_documents_expired);
    assert!(report.crew.is_empty());
    assert!(report.crew_expiry.is_empty());
    assert!(report.may_sail());
    assert_eq!(report.warning, "");
    assert_eq!(
        report.crew_error.as_deref(),
        Some("No se pudieron cargar los tripulantes.")
    );
}

#[tokio::test]
async fn available_crew_excludes_roster_members() {
    let directory = FakeDirectory::default();
    directory.add_ship(ship("b-1", "Estrella Polar"), Vec::new());
    directory.add_crew(crew_member("u-1", "Lucía"), Vec::new());
    directory.add_crew(crew_member("u-2", "Mario"), Vec::new());
    directory.enrol("b-1", "u-1");

    let available = service(&directory)
        .available_crew(&ShipId::from("b-1"))
        .await
        .expect("lookups succeed");

    let ids: Vec<_> = available.iter().map(|member| member.id.0.as_str()).collect();
    assert_eq!(ids, ["u-2"]);
}

#[tokio::test]
async fn enrolments_skip_unreadable_rosters() {
    let directory = FakeDirectory::default();
    directory.add_ship(ship("b-1", "Estrella Polar"), Vec::new());
    directory.add_ship(ship("b-2", "Cabo Mayor"), Vec::new());
    directory.add_ship(ship("b-3", "Mar de Alborán"), Vec::new());
    directory.enrol("b-1", "u-1");
    directory.enrol("b-2", "u-1");
    directory.enrol("b-3", "u-1");
    directory.fail_roster("b-2");

    let report = service(&directory)
        .enrolments(&CrewMemberId::from("u-1"))
        .await
        .expect("ship listing succeeds");

    let ships: Vec<_> = report
        .enrolments
        .iter()
        .map(|enrolment| enrolment.ship_id.0.as_str())
        .collect();
    assert_eq!(ships, ["b-1", "b-3"]);
    assert!(report.message.is_empty());

    let none = service(&directory)
        .enrolments(&CrewMemberId::from("u-404"))
        .await
        .expect("ship listing succeeds");
    assert!(none.enrolments.is_empty());
    assert_eq!(none.message, "Sin enroles para este tripulante.");
}

#[tokio::test]
async fn registered_documents_default_to_no_expiry() {
    let directory = FakeDirectory::default();
    directory.add_ship(ship("b-1", "Estrella Polar"), Vec::new());
    let service = service(&directory);

    let document = service
        .register_ship_document(&ShipId::from("b-1"), "Seguro", "barcos/b-1/seguro.pdf", None)
        .await
        .expect("document registered");
    assert_eq!(document.expires_on, "2999-12-31");
    assert_eq!(directory.registered().len(), 1);

    let report = service
        .ship_readiness(&ShipId::from("b-1"), today())
        .await
        .expect("ship exists");
    assert!(!report.ship_documents_expired);

    match service
        .register_ship_document(&ShipId::from("b-1"), " ", "x.pdf", None)
        .await
    {
        Err(ReadinessServiceError::IncompleteDocument) => {}
        other => panic!("expected incomplete document error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_ship_is_not_reported_ready() {
    let directory = three_ship_fleet();

    let error = service(&directory)
        .ship_readiness(&ShipId::from("999"), today())
        .await
        .expect_err("unknown ship");

    assert!(matches!(
        error,
        ReadinessServiceError::Directory(DirectoryError::NotFound)
    ));
    assert_eq!(error.message(), "No se pudo cargar el barco.");
}

#[tokio::test]
async fn removed_crew_no_longer_blocks_sailing() {
    let directory = FakeDirectory::default();
    directory.add_ship(ship("b-1", "Estrella Polar"), Vec::new());
    directory.add_crew(
        crew_member("u-1", "Lucía"),
        vec![document("Libreta", Some("2026-01-01"))],
    );
    directory.enrol("b-1", "u-1");
    let service = service(&directory);

    let before = service
        .ship_readiness(&ShipId::from("b-1"), today())
        .await
        .expect("ship exists");
    assert!(!before.may_sail());

    let removed = service
        .remove_crew(&ShipId::from("b-1"), Some(&CrewMemberId::from("u-1")))
        .await
        .expect("member removed");
    assert_eq!(removed, CrewMemberId::from("u-1"));
    assert!(directory.roster("b-1").is_empty());

    let after = service
        .ship_readiness(&ShipId::from("b-1"), today())
        .await
        .expect("ship exists");
    assert!(after.may_sail());

    let again = service
        .remove_crew(&ShipId::from("b-1"), Some(&CrewMemberId::from("u-1")))
        .await
        .expect_err("member already gone");
    assert!(matches!(
        again,
        ReadinessServiceError::RosterRemoval(DirectoryError::NotFound)
    ));
    assert_eq!(again.message(), "No se pudo quitar el tripulante.");
}

#[tokio::test]
async fn editing_an_expiry_changes_readiness() {
    let directory = FakeDirectory::default();
    directory.add_ship(
        ship("b-1", "Estrella Polar"),
        vec![document("ISM", Some("2026-10-01"))],
    );
    let service = service(&directory);
    let ship_id = ShipId::from("b-1");
    assert!(
        service
            .ship_readiness(&ship_id, today())
            .await
            .expect("ship exists")
            .ship_documents_expired
    );

    let renewed = service
        .update_ship_document_expiry(&ship_id, "docs/ism.pdf", "ISM", Some("2027-10-01"))
        .await
        .expect("expiry updated");
    assert_eq!(renewed.expires_on, "2027-10-01");
    assert!(
        !service
            .ship_readiness(&ship_id, today())
            .await
            .expect("ship exists")
            .ship_documents_expired
    );

    let cleared = service
        .update_ship_document_expiry(&ship_id, "docs/ism.pdf", "ISM", Some(""))
        .await
        .expect("expiry cleared");
    assert_eq!(cleared.expires_on, "2999-12-31");
    assert_eq!(
        directory.ship_documents_of("b-1")[0].expires_on.as_deref(),
        Some("2999-12-31")
    );

    assert!(matches!(
        service
            .update_ship_document_expiry(&ship_id, " ", "ISM", None)
            .await,
        Err(ReadinessServiceError::UnknownDocument)
    ));
    let missing = service
        .update_ship_document_expiry(&ship_id, "docs/otro.pdf", "ISM", None)
        .await
        .expect_err("no such document");
    assert_eq!(missing.message(), "No se pudo actualizar la fecha de caducidad.");
}

#[tokio::test]
async fn crew_documents_require_an_expiry() {
    let directory = FakeDirectory::default();
    directory.add_crew(crew_member("u-1", "Lucía"), Vec::new());
    let service = service(&directory);
    let member = CrewMemberId::from("u-1");

    for blank in [None, Some(""), Some("2999-12-31")] {
        let error = service
            .register_crew_document(&member, "Pasaporte", "u-1/pasaporte.pdf", blank)
            .await
            .expect_err("expiry is mandatory");
        assert!(matches!(error, ReadinessServiceError::MissingExpiry));
        assert_eq!(error.message(), "Selecciona la fecha de caducidad.");
    }
    assert!(matches!(
        service
            .register_crew_document(&member, "Pasaporte", "u-1/pasaporte.pdf", Some("31/12/2027"))
            .await,
        Err(ReadinessServiceError::InvalidExpiry(_))
    ));
    assert!(directory.crew_registered().is_empty());

    let document = service
        .register_crew_document(
            &member,
            "Pasaporte",
            "u-1/pasaporte.pdf",
            Some("2026-10-18T00:00:00Z"),
        )
        .await
        .expect("document registered");
    assert_eq!(document.expires_on, "2026-10-18");
    assert_eq!(directory.crew_registered().len(), 1);

    let overview = service.crew_overview(today()).await.expect("listing");
    assert!(overview.expiry.has_expired(&member));
}
