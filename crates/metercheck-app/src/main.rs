mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use metercheck_core::{FrameSource, PollLoop, ReplaySource, SerialSource, SourceError};
use metercheck_decode::units::{EXCITATIONS, UNITS};
use metercheck_decode::{Classification, Excitation, UnitInfo};
use serde::Serialize;
use settings::Settings;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Reads MT-1820 frames and prints Pass, Fail or Error for each one.
#[derive(Parser, Debug)]
#[command(name = "metercheck", version, author, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Serial port the meter is attached to
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (default: 2400)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Read timeout in milliseconds (default: 1000)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Replay hex-encoded frames from a file instead of a serial port
    #[arg(long, value_name = "FILE", conflicts_with_all = ["port", "baud", "timeout_ms"])]
    replay: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available serial ports
    Ports,
    /// Print the meter's unit and AC/DC status code tables as JSON
    Units,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match args.command {
        Some(Command::Ports) => list_ports(),
        Some(Command::Units) => print_units(),
        None => poll(&args),
    }
}

fn poll(args: &Args) -> Result<ExitCode> {
    let source = match open_source(args)? {
        Ok(source) => source,
        Err(e) => {
            println!("{}", Classification::Error);
            return Err(e).context("opening frame source");
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = PollLoop::new(source)
        .limit(args.count)
        .run(&mut out)
        .context("writing results")?;

    info!(
        "{} frames: {} pass, {} fail, {} error",
        summary.frames, summary.pass, summary.fail, summary.error
    );

    match summary.fatal {
        Some(reason) => {
            error!("polling stopped: {reason}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Outer error is configuration, inner is the source itself.
fn open_source(args: &Args) -> Result<Result<Box<dyn FrameSource>, SourceError>> {
    if let Some(path) = &args.replay {
        return Ok(ReplaySource::open(path).map(|s| Box::new(s) as Box<dyn FrameSource>));
    }

    let settings = Settings::load()?;
    let cfg = settings.serial_config(args.port.clone(), args.baud, args.timeout_ms);
    info!("polling {} ({} baud, {:?} timeout)", cfg.port_name, cfg.baud_rate, cfg.timeout);
    Ok(SerialSource::open(&cfg).map(|s| Box::new(s) as Box<dyn FrameSource>))
}

fn list_ports() -> Result<ExitCode> {
    let ports = SerialSource::list_ports();
    if ports.is_empty() {
        info!("no serial ports found");
    }
    for port in ports {
        println!("{}", port.describe());
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct UnitTables {
    units: &'static [UnitInfo],
    excitations: Vec<ExcitationEntry>,
}

#[derive(Serialize)]
struct ExcitationEntry {
    code: u16,
    mode: Excitation,
}

fn print_units() -> Result<ExitCode> {
    let tables = UnitTables {
        units: &UNITS,
        excitations: EXCITATIONS
            .iter()
            .map(|&(code, mode)| ExcitationEntry { code, mode })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&tables)?);
    Ok(ExitCode::SUCCESS)
}
