mod gamepad;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gamepad::{GamepadInput, InputAction};
use hand_synergy_controller::config::{log_level, ControllerConfig};
use hand_synergy_controller::dataset::Dataset;
use hand_synergy_controller::pose_sink::{HandRig, PoseSink};
use hand_synergy_controller::sample::SampleSource;
use hand_synergy_controller::sync_client::{ClientState, SyncClient};
use hand_synergy_controller::types::{ControlVector, Joint};
use log::*;
use nalgebra as na;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Streams glove control vectors to the pose predictor and applies the
/// returned joint angles to a hand rig.
#[derive(Parser, Debug)]
#[command(name = "hand_controller")]
struct Args {
    /// JSON config file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// CSV file of recorded control vectors
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Step to the next dataset sample on this period
    #[arg(long)]
    advance_every_ms: Option<u64>,
    /// Gesture to send until a sample or live input replaces it
    #[arg(long, value_enum)]
    preset: Option<Preset>,
    /// Exit after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    Open,
    Fist,
    Pinch,
    Point,
}

impl Preset {
    fn control(self) -> ControlVector {
        match self {
            Preset::Open => ControlVector::OPEN_HAND,
            Preset::Fist => ControlVector::FIST,
            Preset::Pinch => ControlVector::PINCH,
            Preset::Point => ControlVector::POINT,
        }
    }
}

/// `--preset` wins over the config file's initial control vector.
fn initial_control(args: &Args, config: &ControllerConfig) -> Option<ControlVector> {
    args.preset
        .map(Preset::control)
        .or(config.initial_control)
}

fn load_config(args: &Args) -> Result<ControllerConfig> {
    let mut config = match &args.config {
        Some(path) => ControllerConfig::load(path).context("Failed to load controller config")?,
        None => ControllerConfig::default(),
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    Ok(config)
}

fn advance(source: &mut SampleSource) {
    match source.advance() {
        Ok(control) => info!(
            "Sample {}/{}: thumb={:.2} index={:.2} middle={:.2} abduction={:.2}",
            (source.cursor() + source.dataset().len() - 1) % source.dataset().len() + 1,
            source.dataset().len(),
            control.thumb_closure,
            control.index_closure,
            control.middle_closure,
            control.thumb_abduction
        ),
        Err(e) => debug!("Not advancing: {}", e),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    TermLogger::init(
        log_level(args.verbose),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = load_config(&args)?;
    let mut source = SampleSource::new(Dataset::load_or_empty(&config.dataset_path));
    if let Some(control) = initial_control(&args, &config) {
        info!("Starting from {:?}", control);
        source.set(control);
    }
    let mut client = SyncClient::start(&config, source.input())
        .context("Failed to start predictor link")?;
    let mut rig = HandRig::with_all_joints(na::UnitQuaternion::identity());
    let mut gamepad = GamepadInput::new();

    let advance_every = args.advance_every_ms.map(Duration::from_millis);
    let mut last_advance = Instant::now();
    let mut reported_closed = false;
    let mut tick = 0u64;

    loop {
        sleep(config.tick());

        for action in gamepad.poll() {
            match action {
                InputAction::Advance => advance(&mut source),
                InputAction::Live(control) => source.set(control),
            }
        }
        if let Some(period) = advance_every {
            if last_advance.elapsed() >= period {
                advance(&mut source);
                last_advance = Instant::now();
            }
        }

        if let Some(pose) = client.poll() {
            rig.apply(&pose);
            if let Some(index) = rig.joint_euler_degrees(Joint::Index1) {
                trace!("Index1 at ({:.1}, {:.1}, {:.1})", index.x, index.y, index.z);
            }
        }

        // The rig keeps its last pose when the link is gone
        if !reported_closed && client.state() == ClientState::Closed {
            match client.take_fault() {
                Some(fault) => warn!("No further poses from {}: {}", client.endpoint(), fault),
                None => warn!("Link to {} closed", client.endpoint()),
            }
            reported_closed = true;
        }

        tick += 1;
        if args.ticks.map_or(false, |limit| tick >= limit) {
            break;
        }
    }

    client.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_overrides_config_control() {
        let config = ControllerConfig {
            initial_control: Some(ControlVector::FIST),
            ..ControllerConfig::default()
        };
        let args = Args::parse_from(["hand_controller", "--preset", "pinch"]);
        assert_eq!(initial_control(&args, &config), Some(ControlVector::PINCH));

        let args = Args::parse_from(["hand_controller"]);
        assert_eq!(initial_control(&args, &config), Some(ControlVector::FIST));
        assert_eq!(
            initial_control(&args, &ControllerConfig::default()),
            None
        );
    }

    #[test]
    fn every_preset_maps_to_its_gesture() {
        assert_eq!(Preset::Open.control(), ControlVector::OPEN_HAND);
        assert_eq!(Preset::Point.control(), ControlVector::POINT);
        let args = Args::parse_from(["hand_controller", "--preset", "point", "-vv"]);
        assert_eq!(args.preset, Some(Preset::Point));
        assert_eq!(args.verbose, 2);
    }
}
