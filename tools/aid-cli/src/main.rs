use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rapid_aid::aggregate::{count_by, ActiveStats, GroupKey, HistoryStats};
use rapid_aid::services::{Dispatch, FACILITIES_TABLE};
use rapid_aid::{
    AlertDispatcher, AlertReport, Coordinate, DispatchConfig, Facility, FacilityDirectory,
    FacilityKind, Incident, IncidentLocation, MemoryRecordStore, Ranking, Severity,
};

mod input;
mod output;

use input::read_records;
use output::{facility_row, write_facilities_geojson};

#[derive(Parser, Debug)]
#[command(
    name = "rapid-aid",
    author,
    version,
    about = "Find nearby emergency facilities and summarize incidents",
    long_about = "Works on JSON exports of facility and incident records.\n\n\
                  `nearby` ranks facilities by great-circle distance from a point, \
                  `summary` tallies incidents by status and severity, and `alert` \
                  raises an incident against an in-memory copy of the facilities."
)]
struct Cli {
    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank facilities around a point
    Nearby(NearbyArgs),
    /// Tally incidents by status and severity
    Summary(SummaryArgs),
    /// Raise an alert and notify the nearest available facilities
    Alert(AlertArgs),
}

#[derive(Args, Debug)]
struct NearbyArgs {
    /// JSON array of facility records
    #[arg(short, long)]
    facilities: PathBuf,

    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Search radius in kilometres
    #[arg(short, long, default_value_t = 10.0)]
    radius: f64,

    /// Only facilities of this kind (hospital, police, fire, other)
    #[arg(short, long)]
    kind: Option<FacilityKind>,

    /// Skip busy and unavailable facilities
    #[arg(long)]
    available_only: bool,

    /// Print at most this many facilities
    #[arg(short, long)]
    limit: Option<usize>,

    /// Also write the ranked facilities to this GeoJSON file
    #[arg(long)]
    geojson: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// JSON array of incident records
    #[arg(short, long)]
    incidents: PathBuf,

    /// Reference time for weekly counts (RFC 3339, defaults to now)
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct AlertArgs {
    /// JSON array of facility records
    #[arg(short, long)]
    facilities: PathBuf,

    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    #[arg(long, default_value = "")]
    address: String,

    /// Defaults to critical
    #[arg(long)]
    severity: Option<Severity>,

    /// Defaults to "emergency"
    #[arg(long)]
    accident_type: Option<String>,

    /// Defaults to one
    #[arg(long)]
    victims: Option<u32>,

    #[arg(long)]
    description: Option<String>,

    /// Search radius in kilometres
    #[arg(short, long, default_value_t = 10.0)]
    radius: f64,

    /// Upper bound on notified facilities
    #[arg(long, default_value_t = 5)]
    max_notified: usize,
}

impl AlertArgs {
    /// The emergency-button report, overridden by whatever was given
    fn report(&self) -> Result<AlertReport> {
        let coordinates = Coordinate::new(self.lat, self.lon).context("Invalid alert location")?;
        let mut report = AlertReport::emergency_button(IncidentLocation {
            address: self.address.clone(),
            coordinates,
        });

        if let Some(severity) = self.severity {
            report.severity = severity;
        }
        if let Some(accident_type) = &self.accident_type {
            report.accident_type = accident_type.clone();
        }
        if let Some(victims) = self.victims {
            report.victim_count = victims;
        }
        if let Some(description) = &self.description {
            report.description = description.clone();
        }
        Ok(report)
    }

    fn config(&self) -> DispatchConfig {
        DispatchConfig {
            radius_km: self.radius,
            max_notified: self.max_notified,
        }
    }
}

#[derive(Serialize, Debug)]
struct Summary {
    by_status: BTreeMap<&'static str, usize>,
    by_severity: BTreeMap<&'static str, usize>,
    total: usize,
    resolved: usize,
    critical: usize,
    this_week: usize,
    pending: usize,
    acknowledged: usize,
    responding: usize,
}

impl Summary {
    fn new(incidents: &[Incident], now: DateTime<Utc>) -> Self {
        let history = HistoryStats::from_incidents(incidents, now);
        let active = ActiveStats::from_incidents(incidents);

        Self {
            by_status: count_by(incidents, GroupKey::Status),
            by_severity: count_by(incidents, GroupKey::Severity),
            total: history.total,
            resolved: history.resolved,
            critical: history.critical,
            this_week: history.this_week,
            pending: active.pending,
            acknowledged: active.acknowledged,
            responding: active.responding,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    match cli.command {
        Command::Nearby(args) => run_nearby(args),
        Command::Summary(args) => run_summary(args),
        Command::Alert(args) => run_alert(args).await,
    }
}

/// Rank the facilities file around the requested point, honouring the filters
/// and the limit
fn rank_facilities(args: &NearbyArgs) -> Result<Ranking> {
    let origin = Coordinate::new(args.lat, args.lon).context("Invalid search origin")?;

    let mut facilities: Vec<Facility> =
        read_records(&args.facilities).context("Failed to load facilities")?;
    if let Some(kind) = args.kind {
        facilities.retain(|f| f.kind == kind);
    }
    if args.available_only {
        facilities.retain(Facility::is_available);
    }

    let directory = FacilityDirectory::from_facilities(facilities);
    let mut ranking = directory.rank(origin, args.radius);

    for rejection in &ranking.rejected {
        log::warn!("Skipping {}: {}", rejection.facility_id, rejection.error);
    }
    log::info!(
        "{} facilities within {} km, {} further out",
        ranking.within.len(),
        args.radius,
        ranking.out_of_radius
    );

    if let Some(limit) = args.limit {
        ranking.within.truncate(limit);
    }
    Ok(ranking)
}

fn run_nearby(args: NearbyArgs) -> Result<()> {
    let ranking = rank_facilities(&args)?;

    for facility in &ranking.within {
        println!("{}", facility_row(facility));
    }

    if let Some(path) = &args.geojson {
        write_facilities_geojson(&ranking.within, path)?;
    }

    Ok(())
}

fn summarize(args: &SummaryArgs) -> Result<Summary> {
    let incidents: Vec<Incident> =
        read_records(&args.incidents).context("Failed to load incidents")?;
    let now = args.now.unwrap_or_else(Utc::now);

    Ok(Summary::new(&incidents, now))
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let summary = summarize(&args)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );
    Ok(())
}

/// Seed an in-memory store with the facilities file and raise the alert against it
async fn raise_alert(args: &AlertArgs) -> Result<Dispatch> {
    let report = args.report()?;

    let facilities: Vec<Facility> =
        read_records(&args.facilities).context("Failed to load facilities")?;
    let store = MemoryRecordStore::new()
        .with_values(FACILITIES_TABLE, &facilities)
        .context("Failed to seed facility records")?;

    let dispatcher = AlertDispatcher::new(Arc::new(store), args.config());
    let dispatch = dispatcher.raise(report).await.context("Failed to raise alert")?;

    for facility in &dispatch.notified {
        log::info!("Notified {}", facility_row(facility));
    }
    Ok(dispatch)
}

async fn run_alert(args: AlertArgs) -> Result<()> {
    let dispatch = raise_alert(&args).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&dispatch.incident).context("Failed to serialize incident")?
    );
    Ok(())
}
