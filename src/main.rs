//! VTI Monitor - Main Entry Point
//!
//! Reads velocity frames (one decimal m/s value per line) from stdin, or from
//! the synthetic sensor with `--mock`, and prints each completed ejection
//! cycle with its VTI and stroke volume.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vti_monitor::{
    backend::{pump, LineSource, PumpStats, VelocitySource},
    config::{default_config_path, MonitorConfig},
    pipeline::{spawn_pipeline, PipelineCommand, SinkMessage, VesselRadius},
    types::MILLI_SCALE,
};

const DEFAULT_LOG_FILTER: &str = "info,vti_monitor=debug";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (.toml or .json). Defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vessel radius in millimetres, overriding the config file
    #[arg(long)]
    radius_mm: Option<f64>,

    /// Print a live snapshot every N kept samples
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Read from the synthetic sensor instead of stdin
    #[cfg(feature = "mock-sensor")]
    #[arg(long)]
    mock: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(radius_mm) = cli.radius_mm {
        config.vessel_radius_m = radius_mm / MILLI_SCALE;
    }
    config.validate()?;

    let _log_guard = init_logging(&config);
    tracing::info!("Starting VTI monitor");

    let radius = VesselRadius::new(config.vessel_radius_m)?;
    let prf_hz = config.pipeline.pulse_repetition_frequency_hz;
    let handle = spawn_pipeline(config.pipeline, radius, cli.snapshot_every)?;

    #[cfg(feature = "mock-sensor")]
    let use_mock = cli.mock;
    #[cfg(not(feature = "mock-sensor"))]
    let use_mock = false;

    let commands = handle.bridge.command_sender();
    let transport = std::thread::Builder::new()
        .name("vti-transport".to_string())
        .spawn(move || -> vti_monitor::Result<PumpStats> {
            let mut source = open_source(use_mock, prf_hz);
            let result = pump(source.as_mut(), &commands);
            // Queued behind the final Reset, so nothing is lost
            let _ = commands.send(PipelineCommand::RequestStats);
            let _ = commands.send(PipelineCommand::Shutdown);
            result
        })
        .context("Failed to spawn transport thread")?;

    for msg in handle.bridge.msg_rx.iter() {
        match msg {
            SinkMessage::CycleComplete(report) => println!("{}", report),
            SinkMessage::Snapshot(snapshot) => println!(
                "velocity {:.1} cm/s, VTI {:.1} cm, SV {:.1} ml, radius {:.1} mm, {}",
                snapshot.velocity_cm_s(),
                snapshot.vti_cm(),
                snapshot.stroke_volume_ml,
                snapshot.vessel_radius_mm(),
                snapshot.detector_state
            ),
            SinkMessage::Stats(stats) => tracing::info!(
                "{} samples ({:.1}% kept, {} rejected), {} cycles, {} degenerate, {} resets",
                stats.samples_received,
                stats.keep_rate(),
                stats.samples_rejected,
                stats.cycles_completed,
                stats.degenerate_cycles,
                stats.resets
            ),
            SinkMessage::DetectorTransition(state) => tracing::debug!("Detector -> {}", state),
            SinkMessage::SampleRejected { value, reason }
            | SinkMessage::RadiusRejected { value, reason } => {
                tracing::warn!("Rejected {}: {}", value, reason)
            }
            SinkMessage::Shutdown => break,
        }
    }

    let pumped = transport
        .join()
        .map_err(|_| anyhow::anyhow!("Transport thread panicked"))?;
    handle.shutdown()?;

    let stats = pumped.context("Transport failed")?;
    tracing::info!(
        "Done: {} frames, {} forwarded, {} skipped",
        stats.frames,
        stats.forwarded,
        stats.skipped
    );
    Ok(())
}

/// An explicit `--config` must load; the default location is optional.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MonitorConfig> {
    if let Some(path) = path {
        return MonitorConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }
    match default_config_path() {
        Some(path) if path.exists() => MonitorConfig::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        _ => Ok(MonitorConfig::default()),
    }
}

fn init_logging(config: &MonitorConfig) -> Option<WorkerGuard> {
    let directive = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "vti-monitor.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(feature = "mock-sensor")]
fn open_source(use_mock: bool, prf_hz: f64) -> Box<dyn VelocitySource> {
    if use_mock {
        tracing::info!("Using synthetic sensor at {} Hz", prf_hz);
        Box::new(
            vti_monitor::backend::MockSensor::new(prf_hz)
                .with_noise(0.02)
                .with_realtime(true),
        )
    } else {
        Box::new(LineSource::new(std::io::stdin().lock()))
    }
}

#[cfg(not(feature = "mock-sensor"))]
fn open_source(_use_mock: bool, _prf_hz: f64) -> Box<dyn VelocitySource> {
    Box::new(LineSource::new(std::io::stdin().lock()))
}
