//! Report command handler
//!
//! Submits spot status reports and files or manages violation reports.

use crate::cli::backend_client;
use crate::config::Config;
use crate::constants::geo::REPORT_MAX_DISTANCE_METERS;
use crate::coord::{distance_m, Coordinates};
use crate::error::{Error, Result};
use crate::proximity::can_report;
use crate::spot::report::{StatusReport, Violation, ViolationReport, ViolationStatus};
use clap::{Args, Subcommand};

/// Report command arguments
#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Report how many spaces are free at a spot
    Status(StatusArgs),

    /// File and manage violation reports
    #[command(subcommand)]
    Violation(ViolationCommand),
}

/// Status report arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Spot id
    #[arg(long)]
    pub spot: String,

    /// Free spaces seen
    #[arg(long)]
    pub available: u32,

    /// Total spaces at the spot
    #[arg(long)]
    pub total: u32,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Your latitude (reports are only accepted near the spot)
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Your longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

#[derive(Subcommand)]
pub enum ViolationCommand {
    /// File a new violation report
    New(NewViolationArgs),

    /// List violation reports
    List {
        /// Only reports in this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one violation report
    Get { id: String },

    /// Change a report's review status
    Update { id: String, status: String },

    /// Delete a violation report
    Delete { id: String },
}

/// New violation arguments
#[derive(Args)]
pub struct NewViolationArgs {
    /// Where it happened
    #[arg(long)]
    pub address: String,

    /// Reserved spot type: pregnant, elderly or disabled
    #[arg(long)]
    pub spot_type: String,

    /// What happened: no_credential, blocking_access, misuse or other
    #[arg(long)]
    pub kind: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: String,

    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Attachment (data URL or link), repeatable
    #[arg(long = "media")]
    pub media: Vec<String>,
}

impl NewViolationArgs {
    fn into_report(self) -> Result<ViolationReport> {
        let report = ViolationReport {
            endereco: self.address,
            latitude: self.lat,
            longitude: self.lng,
            tipo_vaga: self.spot_type.parse().map_err(Error::InvalidReport)?,
            tipo_infracao: self.kind.parse().map_err(Error::InvalidReport)?,
            descricao: self.description,
            midias: self.media,
        };
        report.validate()?;
        Ok(report)
    }
}

fn parse_status(status: &str) -> Result<ViolationStatus> {
    status.parse().map_err(Error::InvalidReport)
}

/// Run the report command
pub async fn run(args: ReportArgs) -> Result<()> {
    let config = Config::load()?;
    let client = backend_client(&config)?;

    match args.command {
        ReportCommand::Status(args) => {
            let report = StatusReport::new(args.available, args.total, args.notes)?;

            if let Some(user) = Coordinates::from_pair(args.lat, args.lng) {
                user.validate()?;
                let spots = client.fetch_spots().await?;
                let spot = spots
                    .iter()
                    .find(|spot| spot.id == args.spot)
                    .ok_or_else(|| Error::InvalidReport(format!("Unknown spot: {}", args.spot)))?;
                if !can_report(user, spot) {
                    return Err(Error::InvalidReport(format!(
                        "You are {:.0} m from {}; reports need to be within {:.0} m",
                        distance_m(user, spot.coords),
                        spot.name,
                        REPORT_MAX_DISTANCE_METERS
                    )));
                }
            }

            let receipt = client.submit_status_report(&args.spot, &report).await?;
            println!("{} ({})", receipt.message, receipt.id);
        }

        ReportCommand::Violation(ViolationCommand::New(args)) => {
            let violation = client.submit_violation(&args.into_report()?).await?;
            print_violation(&violation);
        }

        ReportCommand::Violation(ViolationCommand::List { status }) => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let violations = client.list_violations(status).await?;
            if violations.is_empty() {
                println!("No violation reports.");
            }
            for violation in &violations {
                println!(
                    "{}  {:10}  {}",
                    violation.id,
                    violation.status.as_str(),
                    violation.report.endereco
                );
            }
        }

        ReportCommand::Violation(ViolationCommand::Get { id }) => {
            print_violation(&client.get_violation(&id).await?);
        }

        ReportCommand::Violation(ViolationCommand::Update { id, status }) => {
            let message = client
                .update_violation_status(&id, parse_status(&status)?)
                .await?;
            println!("{}", message);
        }

        ReportCommand::Violation(ViolationCommand::Delete { id }) => {
            println!("{}", client.delete_violation(&id).await?);
        }
    }

    Ok(())
}

fn print_violation(violation: &Violation) {
    let report = &violation.report;
    println!("Violation {}", violation.id);
    println!("  Status:      {}", violation.status);
    if let Some(created) = violation.data_criacao {
        println!("  Created:     {}", created.format("%Y-%m-%d %H:%M"));
    }
    println!("  Address:     {}", report.endereco);
    if let (Some(lat), Some(lng)) = (report.latitude, report.longitude) {
        println!("  Position:    ({:.6}, {:.6})", lat, lng);
    }
    println!("  Spot type:   {:?}", report.tipo_vaga);
    println!("  Violation:   {:?}", report.tipo_infracao);
    println!("  Description: {}", report.descricao);
    if !report.midias.is_empty() {
        println!("  Attachments: {}", report.midias.len());
    }
}
