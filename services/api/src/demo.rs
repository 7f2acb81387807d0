use crate::infra::InMemoryFleetDirectory;
use chrono::{Local, NaiveDate};
use clap::Args;
use flota::config::AppConfig;
use flota::error::AppError;
use flota::workflows::expiry::parse_date;
use flota::workflows::fleet::{CrewMemberId, FleetDirectory, HttpFleetDirectory, ShipId};
use flota::workflows::readiness::{
    CrewOverview, EntityKind, FleetOverview, ListPhase, ListView, ReadinessService,
    ShipReadinessReport,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ZarpeArgs {
    /// Ship identifier (`idBarco`)
    #[arg(long = "barco")]
    pub(crate) ship: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FleetReportArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Report on crew members instead of ships
    #[arg(long)]
    pub(crate) crew: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the demo fleet is built around (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn backend_service() -> Result<ReadinessService<HttpFleetDirectory>, AppError> {
    let config = AppConfig::load()?;
    let directory = HttpFleetDirectory::new(&config.directory)?;
    Ok(ReadinessService::new(Arc::new(directory)))
}

pub(crate) async fn run_zarpe(args: ZarpeArgs) -> Result<(), AppError> {
    let service = backend_service()?;
    let today = resolve_today(args.today);
    let report = service.ship_readiness(&ShipId(args.ship), today).await?;
    render_ship_readiness(&report, today);
    Ok(())
}

pub(crate) async fn run_fleet_report(args: FleetReportArgs) -> Result<(), AppError> {
    let service = backend_service()?;
    let today = resolve_today(args.today);
    if args.crew {
        let overview = service.crew_overview(today).await?;
        render_crew_overview(&overview, today);
    } else {
        let overview = service.fleet_overview(today).await?;
        render_fleet_overview(&overview, today);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = resolve_today(args.today);
    let directory = Arc::new(InMemoryFleetDirectory::demo(today));
    let service = ReadinessService::new(directory);

    println!("Fleet readiness demo");

    let mut fleet_view = ListView::new(EntityKind::Ship);
    if let Err(err) = service.refresh_fleet_view(&mut fleet_view, today).await {
        println!("  Fleet view out of sync: {}", err);
    }
    if let ListPhase::LoadError(message) = fleet_view.phase() {
        println!("  {}", message);
        return Ok(());
    }
    let overview = FleetOverview::new(fleet_view.rows().to_vec(), fleet_view.expiry().clone());
    render_fleet_overview(&overview, today);

    let crew = service.crew_overview(today).await?;
    render_crew_overview(&crew, today);

    for row in &overview.ships {
        let report = service.ship_readiness(&row.ship.id, today).await?;
        render_ship_readiness(&report, today);
    }

    println!("\nGuarded roster changes");
    let attempts = [("1", "12"), ("1", "11"), ("2", "14")];
    for (ship, member) in attempts {
        let ship = ShipId::from(ship);
        let member = CrewMemberId::from(member);
        match service.assign_crew(&ship, Some(&member), today).await {
            Ok(added) => println!("- barco {} + tripulante {}: Tripulante agregado.", ship, added),
            Err(err) => println!("- barco {} + tripulante {}: {}", ship, member, err.message()),
        }
    }

    let report = service.ship_readiness(&ShipId::from("2"), today).await?;
    render_ship_readiness(&report, today);

    println!("\nRoster cleanup and document renewals");
    let removed = service
        .remove_crew(&ShipId::from("3"), Some(&CrewMemberId::from("12")))
        .await?;
    println!("- barco 3 - tripulante {}: Tripulante quitado.", removed);
    let renewal = (today + chrono::Duration::days(365)).format("%Y-%m-%d").to_string();
    service
        .update_ship_document_expiry(&ShipId::from("2"), "barcos/2/ism.pdf", "ISM", Some(&renewal))
        .await?;
    println!("- barco 2 ISM renovado hasta {}", renewal);
    match service
        .register_crew_document(&CrewMemberId::from("14"), "Pasaporte", "14/pasaporte.pdf", None)
        .await
    {
        Ok(document) => println!("- tripulante 14 {}: {}", document.kind, document.expires_on),
        Err(err) => println!("- tripulante 14 Pasaporte: {}", err.message()),
    }
    for ship in ["2", "3"] {
        let report = service.ship_readiness(&ShipId::from(ship), today).await?;
        render_ship_readiness(&report, today);
    }

    let enrolments = service.enrolments(&CrewMemberId::from("13")).await?;
    println!("\nEnroles of tripulante {}", enrolments.crew_member);
    if enrolments.enrolments.is_empty() {
        println!("  {}", enrolments.message);
    }
    for enrolment in &enrolments.enrolments {
        println!("  - {} ({})", enrolment.ship_name, enrolment.ship_id);
    }

    let documents = service.directory().crew_documents(&CrewMemberId::from("13")).await?;
    for document in documents {
        println!(
            "  {} [{}]: {}",
            document.kind,
            document.file_name(),
            document.expiry_label()
        );
    }

    Ok(())
}

fn flag(expired: bool) -> &'static str {
    if expired {
        "CADUCADO"
    } else {
        "ok"
    }
}

pub(crate) fn render_fleet_overview(overview: &FleetOverview, today: NaiveDate) {
    println!("\nShips as of {}", today);
    if !overview.summary.banner.is_empty() {
        println!("  {}", overview.summary.banner);
    }
    for row in &overview.ships {
        println!(
            "  - [{}] {} {} ({} tripulantes)",
            flag(row.has_expired_documents),
            row.ship.id,
            row.ship.name,
            row.ship.crew_count
        );
    }
}

pub(crate) fn render_crew_overview(overview: &CrewOverview, today: NaiveDate) {
    println!("\nCrew as of {}", today);
    if !overview.summary.banner.is_empty() {
        println!("  {}", overview.summary.banner);
    }
    for row in &overview.crew {
        println!(
            "  - [{}] {} {} ({})",
            flag(row.has_expired_documents),
            row.member.id,
            row.member.full_name(),
            row.member.position
        );
    }
}

pub(crate) fn render_ship_readiness(report: &ShipReadinessReport, today: NaiveDate) {
    match &report.ship_name {
        Some(name) => println!("\nZarpe check for barco {} ({}) on {}", report.ship_id, name, today),
        None => println!("\nZarpe check for barco {} on {}", report.ship_id, today),
    }
    if report.may_sail() {
        println!("  Listo para zarpar.");
    } else {
        println!("  {}", report.warning);
    }
    if let Some(error) = &report.crew_error {
        println!("  {}", error);
    }
    for row in &report.crew {
        let name = row
            .assignment
            .name
            .clone()
            .unwrap_or_else(|| row.assignment.member_id.to_string());
        println!("  - [{}] {}", flag(row.has_expired_documents), name);
    }
}
