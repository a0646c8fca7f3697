use std::error::Error;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use evac_route_core::{
    ChangeNotification, CycleOutcome, RecomputeController, ResultSink, RouteUpdate, RouterConfig,
    SinkError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Evacuation route planner for a single floor layout
#[derive(Parser, Debug)]
#[command(name = "evac-route")]
#[command(about = "Compute a fire-aware evacuation route and turn-by-turn directions", long_about = None)]
struct Args {
    /// Layout string, rows separated by the configured delimiter (default '|')
    #[arg(short, long, conflicts_with = "layout_file")]
    layout: Option<String>,

    /// Read the layout from a file instead
    #[arg(short = 'f', long)]
    layout_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write every committed route update to this JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Treat each stdin line as a layout change notification until EOF
    #[arg(short, long)]
    watch: bool,

    /// Building identifier used in log output
    #[arg(long, default_value = "building")]
    building: String,

    /// Floor identifier used in log output
    #[arg(long, default_value = "floor-1")]
    floor: String,
}

/// Prints each update and optionally mirrors it to a JSON file
struct ExportSink {
    path: Option<PathBuf>,
}

impl ExportSink {
    fn write_json(path: &Path, update: &RouteUpdate) -> Result<(), SinkError> {
        let json = update.to_json()?;
        // Staged next to the target, then renamed over it
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, path)?;
        Ok(())
    }
}

impl ResultSink for ExportSink {
    fn write(&self, update: &RouteUpdate) -> Result<(), SinkError> {
        if let Some(path) = &self.path {
            Self::write_json(path, update)?;
            info!(path = %path.display(), "route update exported");
        }
        print_update(update);
        Ok(())
    }
}

fn print_update(update: &RouteUpdate) {
    println!("=== Route Update ===");
    if !update.warning.is_empty() {
        println!("WARNING: {}", update.warning);
    }
    println!("Layout: {}", update.layout);
    for (i, step) in update.instructions.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!();
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_layout(args: &Args) -> Result<String, Box<dyn Error>> {
    match (&args.layout, &args.layout_file) {
        (Some(layout), _) => Ok(layout.clone()),
        (None, Some(path)) => Ok(fs::read_to_string(path)?.trim_end().to_string()),
        (None, None) => Err("either --layout, --layout-file or --watch is required".into()),
    }
}

fn run_once(
    args: &Args,
    controller: &RecomputeController<ExportSink>,
) -> Result<ExitCode, Box<dyn Error>> {
    let layout = read_layout(args)?;
    let notification = ChangeNotification::new(&args.building, &args.floor, layout);

    match controller.handle(&notification)? {
        CycleOutcome::Committed(update) if update.has_route() => Ok(ExitCode::SUCCESS),
        CycleOutcome::Committed(_) => Ok(ExitCode::from(2)),
        CycleOutcome::MissingEntity {
            user_found,
            exit_found,
        } => {
            error!(user_found, exit_found, "layout needs one occupant (U) and one exit (S)");
            Ok(ExitCode::FAILURE)
        }
        CycleOutcome::Rejected(err) => Err(err.into()),
        outcome @ (CycleOutcome::Unchanged | CycleOutcome::Dropped) => {
            Err(format!("unexpected outcome for a fresh controller: {outcome:?}").into())
        }
    }
}

fn run_watch(
    args: &Args,
    controller: RecomputeController<ExportSink>,
) -> Result<ExitCode, Box<dyn Error>> {
    let (tx, rx) = crossbeam_channel::unbounded::<ChangeNotification>();
    let worker = thread::spawn(move || controller.run(&rx));

    info!("watching stdin for layout changes");
    for line in io::stdin().lock().lines() {
        let line = line?;
        let layout = line.trim();
        if layout.is_empty() {
            continue;
        }
        if tx
            .send(ChangeNotification::new(&args.building, &args.floor, layout))
            .is_err()
        {
            break;
        }
    }
    drop(tx);

    let committed = worker
        .join()
        .map_err(|_| "recompute worker panicked")?;
    info!(committed, "watch finished");
    Ok(ExitCode::SUCCESS)
}

fn run(args: &Args) -> Result<ExitCode, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default(),
    };
    let sink = ExportSink {
        path: args.export.clone(),
    };
    let controller = RecomputeController::new(config, sink)?;

    if args.watch {
        run_watch(args, controller)
    } else {
        run_once(args, &controller)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "evac-route failed");
            ExitCode::FAILURE
        }
    }
}
