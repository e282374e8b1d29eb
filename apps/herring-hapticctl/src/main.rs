mod cli;
mod devices;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use herring_haptic::command::TSPDRV_MAGIC_NUMBER;
use herring_haptic::{
    Command, HapticConfig, HapticError, HapticEvent, TimedVibrator, start_haptics_with_config,
};
use herring_haptic_core::SampleRecord;
use herring_haptic_core::record::{RECORD_HEADER_SIZE, max_samples_per_write};
use herring_param::ParamStore;
use herring_touchkey::{TouchkeyConfig, TouchkeyService};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, CliCommand};
use crate::devices::{LogMotor, LogSink, ScriptedBus};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        CliCommand::Play {
            config,
            actuator,
            samples,
            repeat,
            graceful_stop,
        } => run_play(config, actuator, &samples, repeat, graceful_stop).await,
        CliCommand::Buzz { millis, duty } => run_buzz(millis, duty).await,
        CliCommand::Keys {
            reports,
            backlight_off,
        } => run_keys(reports, backlight_off),
        CliCommand::Param { file, index, value } => run_param(&file, index, value),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to init tracing: {error}"))?;
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<HapticConfig> {
    match path {
        Some(path) => HapticConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(HapticConfig::default()),
    }
}

async fn run_play(
    config: Option<PathBuf>,
    actuator: u8,
    samples: &[i8],
    repeat: u32,
    graceful_stop: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let pattern: Vec<i8> = samples.repeat(repeat as usize);
    let writes = encode_pattern(&config, actuator, &pattern)?;
    let tick = config.tick_period();
    let sink = LogSink::new(config.num_actuators);
    let handle = start_haptics_with_config(Box::new(sink), config)
        .context("failed to start haptic engine")?;
    let mut events = handle.subscribe_events();

    let session = handle.open_session().await?;
    session.identify(TSPDRV_MAGIC_NUMBER).await?;

    for bytes in &writes {
        let sample_count = bytes.len() - RECORD_HEADER_SIZE;
        loop {
            match session.write(bytes).await {
                Ok(written) => {
                    info!(written, samples = sample_count, "record queued");
                    break;
                },
                Err(HapticError::NoFreeSlot { .. }) => {
                    // Both slots are full; wait for one to drain.
                    tokio::time::sleep(tick * sample_count as u32).await;
                },
                Err(error) => return Err(error).context("write failed"),
            }
        }
    }
    if graceful_stop {
        session.command(Command::StopKernelTimer).await?;
    }

    let budget = tick * (pattern.len() as u32 + 100) + Duration::from_secs(1);
    let stopped = tokio::time::timeout(budget, async {
        loop {
            match events.recv().await {
                Ok(HapticEvent::PlaybackStopped { reason }) => return Some(reason),
                Ok(event) => info!(?event, "haptic event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event receiver lagged"),
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .await;
    match stopped {
        Ok(Some(reason)) => info!(?reason, "playback stopped"),
        Ok(None) => warn!("event stream closed before playback stopped"),
        Err(_) => warn!(budget_ms = budget.as_millis() as u64, "playback did not stop in time"),
    }

    session.release().await?;
    handle.shutdown().await?;
    Ok(())
}

/// Splits a pattern into single-record writes the engine accepts.
fn encode_pattern(config: &HapticConfig, actuator: u8, pattern: &[i8]) -> Result<Vec<Vec<u8>>> {
    let chunk_len =
        max_samples_per_write(usize::from(config.num_actuators), config.max_samples_per_record);
    if chunk_len == 0 {
        bail!(
            "max_samples_per_record {} leaves no room for a single-record write",
            config.max_samples_per_record
        );
    }
    pattern
        .chunks(chunk_len)
        .map(|part| {
            SampleRecord::new(actuator, part.to_vec())
                .encode()
                .context("failed to encode record")
        })
        .collect()
}

async fn run_buzz(millis: u64, duty: Option<u32>) -> Result<()> {
    let vibrator = TimedVibrator::start(Box::new(LogMotor), &HapticConfig::default())?;
    if let Some(percent) = duty {
        vibrator.set_duty_percent(percent)?;
    }
    vibrator.enable(millis)?;
    loop {
        let remaining = vibrator.remaining()?;
        if remaining.is_zero() {
            break;
        }
        info!(remaining_ms = remaining.as_millis() as u64, "buzzing");
        tokio::time::sleep(remaining.min(Duration::from_millis(250))).await;
    }
    vibrator.shutdown()?;
    Ok(())
}

fn run_keys(reports: Vec<u8>, backlight_off: bool) -> Result<()> {
    let count = reports.len();
    let service = TouchkeyService::start(
        Box::new(ScriptedBus::new(reports)),
        TouchkeyConfig::default(),
    )?;
    if backlight_off {
        service.set_backlight(false)?;
    }
    for _ in 0..count {
        match service.interrupt() {
            Ok(key_events) => {
                for event in key_events {
                    println!("{event:?}");
                }
            },
            Err(error) => warn!("interrupt failed: {error}"),
        }
    }
    info!(state = ?service.state()?, "touchkey state");
    service.shutdown()?;
    Ok(())
}

fn run_param(file: &Path, index: Option<i32>, value: Option<i32>) -> Result<()> {
    let mut store = ParamStore::load(file)?;
    let Some(index) = index else {
        if value.is_some() {
            bail!("--value needs --index");
        }
        println!("{}", store.to_json_string()?);
        return Ok(());
    };

    if let Some(value) = value {
        store.set_raw(index, value)?;
        store.save(file)?;
    }
    match store.get_raw(index) {
        Some(current) => println!("{index} = {current}"),
        None => bail!("unknown param index {index}"),
    }
    Ok(())
}
