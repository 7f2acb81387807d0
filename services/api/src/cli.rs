use crate::demo::{run_demo, run_fleet_report, run_zarpe, DemoArgs, FleetReportArgs, ZarpeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use flota::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Flota",
    about = "Document expiry and sail readiness for a fleet of ships and their crews",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check whether a ship may sail, using the configured fleet backend
    Zarpe(ZarpeArgs),
    /// Fleet-wide expiry reports against the configured fleet backend
    Fleet {
        #[command(subcommand)]
        command: FleetCommand,
    },
    /// Walk through expiry checks and guarded roster changes on an in-memory fleet
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FleetCommand {
    /// List ships (or crew) flagged with expired documents
    Report(FleetReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Zarpe(args) => run_zarpe(args).await,
        Command::Fleet {
            command: FleetCommand::Report(args),
        } => run_fleet_report(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
