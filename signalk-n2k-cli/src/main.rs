//! Signal K → NMEA 2000 CLI Application
//!
//! Reads Signal K delta messages (one JSON object per line) and writes the
//! NMEA 2000 messages produced by the signalk-n2k library as Actisense
//! serial log lines. Adds on top of the library:
//! - TOML configuration and command line overrides
//! - Delta parsing and self-vessel filtering
//! - A wall-clock driver for debounce and periodic timers

use anyhow::{Context, Result};
use clap::Parser;
use signalk_n2k::{Bridge, LineWriter};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

mod config;
mod delta;
mod runtime;

/// Signal K to NMEA 2000 - convert delta streams to Actisense serial lines
#[derive(Parser, Debug)]
#[command(name = "signalk-n2k-cli")]
#[command(about = "Convert Signal K deltas to NMEA 2000 Actisense serial lines", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Delta input file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for wire lines (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable 130306 Wind
    #[arg(long)]
    wind: bool,

    /// Enable 129025 Location
    #[arg(long)]
    gps_location: bool,

    /// Enable 126992 System Time
    #[arg(long)]
    system_time: bool,

    /// Enable 127250 Heading
    #[arg(long)]
    heading: bool,

    /// Enable 127508 Battery status for <signalk id>:<instance> (can be repeated)
    #[arg(long, value_name = "ID:INSTANCE")]
    battery: Vec<String>,

    /// Full context of the own vessel, also accepted besides vessels.self
    #[arg(long, value_name = "CONTEXT")]
    self_context: Option<String>,

    /// Keep emitting timer messages after the input ends
    #[arg(long)]
    keep_alive: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Signal K NMEA 2000 CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using bridge library v{}", signalk_n2k::VERSION);

    let app = build_config(&args)?;
    if app.bridge.is_empty() {
        log::warn!("No conversions enabled; use --help or a config file to select some");
    }

    let mut bridge = Bridge::new();
    bridge
        .start(&app.bridge, chrono::Utc::now())
        .context("Failed to start bridge")?;

    let input = match &app.input.file {
        Some(path) => {
            log::info!("Reading deltas from: {:?}", path);
            let file =
                File::open(path).with_context(|| format!("Failed to open input: {:?}", path))?;
            runtime::spawn_reader(BufReader::new(file))?
        }
        None => runtime::spawn_reader(BufReader::new(io::stdin()))?,
    };

    let writer: Box<dyn Write> = match &app.output.file {
        Some(path) => {
            log::info!("Writing wire lines to: {:?}", path);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open output: {:?}", path))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };
    let mut sink = LineWriter::new(writer);

    let filter = delta::ContextFilter::new(app.bridge.self_context.clone());
    let stats = runtime::run(
        &mut bridge,
        &filter,
        input,
        app.input.keep_alive,
        &mut sink,
    );

    log::info!(
        "Done: {} deltas ({} skipped), {} values, {} lines",
        stats.deltas,
        stats.skipped_deltas,
        stats.values,
        stats.lines
    );
    if sink.failed() > 0 {
        log::error!(
            "{} of {} lines could not be written",
            sink.failed(),
            sink.written() + sink.failed()
        );
    }
    Ok(())
}

/// Merge the config file (if any) with command line flags
fn build_config(args: &Args) -> Result<config::AppConfig> {
    let mut app = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let app = config::load_config(path)?;
            log::debug!("Configuration loaded successfully");
            app
        }
        None => config::AppConfig::default(),
    };

    let bridge = &mut app.bridge;
    bridge.wind |= args.wind;
    bridge.gps_location |= args.gps_location;
    bridge.system_time |= args.system_time;
    bridge.heading |= args.heading;
    for arg in &args.battery {
        let (id, instance) = config::parse_battery_arg(arg)?;
        bridge.battery_status.push(signalk_n2k::BatteryConfig::new(id, instance));
    }
    if let Some(context) = &args.self_context {
        bridge.self_context = Some(context.clone());
    }
    bridge.validate().context("Invalid configuration")?;

    if let Some(path) = &args.input {
        app.input.file = Some(path.clone());
    }
    if let Some(path) = &args.output {
        app.output.file = Some(path.clone());
    }
    app.input.keep_alive |= args.keep_alive;

    Ok(app)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    // Logs go to stderr; stdout carries the wire lines
    Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
