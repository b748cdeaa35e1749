//! Development stand-in for the pose predictor.
//!
//! Speaks the same framing as the real predictor but answers with a
//! hand-made pose: each finger flexes in proportion to its closure and the
//! first thumb joint swings with the abduction value. Ring and pinky follow
//! the middle finger.

use anyhow::{Context, Result};
use clap::Parser;
use hand_synergy_controller::codec::{decode_control, encode_pose, CONTROL_FRAME_LEN};
use hand_synergy_controller::config::log_level;
use hand_synergy_controller::types::{ControlVector, Finger, Joint, PoseVector, POSE_LEN};
use log::*;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

#[derive(Parser, Debug)]
#[command(name = "mock_predictor")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 65432)]
    port: u16,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const THUMB_ABDUCTION_DEGREES: f32 = 40.0;

/// Full flexion per segment, knuckle first.
fn max_flexion(joint: Joint) -> f32 {
    match (joint.finger(), joint.segment()) {
        (Finger::Thumb, 1) => 30.0,
        (Finger::Thumb, _) => 60.0,
        (_, 1) => 80.0,
        (_, 2) => 100.0,
        _ => 70.0,
    }
}

fn synthesize_pose(control: &ControlVector) -> PoseVector {
    let mut values = [0f32; POSE_LEN];
    for joint in Joint::ALL.iter() {
        let closure = match joint.finger() {
            Finger::Thumb => control.thumb_closure,
            Finger::Index => control.index_closure,
            Finger::Middle => control.middle_closure,
            Finger::Ring => control.middle_closure * 0.9,
            Finger::Pinky => control.middle_closure * 0.8,
        };
        let start = joint.index() * 3;
        values[start] = closure * max_flexion(*joint);
        if *joint == Joint::Thumb1 {
            values[start + 2] = control.thumb_abduction * THUMB_ABDUCTION_DEGREES;
        }
    }
    PoseVector::new(values)
}

fn serve(mut stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|address| address.to_string())
        .unwrap_or_else(|_| String::from("unknown"));
    info!("Client {} connected", peer);
    let mut request = [0u8; CONTROL_FRAME_LEN];
    let mut served = 0u64;
    loop {
        if let Err(e) = stream.read_exact(&mut request) {
            info!("Client {} gone after {} requests: {}", peer, served, e);
            return;
        }
        let control = match decode_control(&request) {
            Ok(control) => control,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };
        trace!("Request from {}: {:?}", peer, control);
        if let Err(e) = stream.write_all(&encode_pose(&synthesize_pose(&control))) {
            warn!("Failed to answer {}: {}", peer, e);
            return;
        }
        served += 1;
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

    let listener = TcpListener::bind((args.host.as_str(), args.port))
        .with_context(|| format!("Failed to bind {}:{}", args.host, args.port))?;
    info!("Mock predictor listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::Builder::new()
                    .name("mock-client".to_string())
                    .spawn(move || serve(stream))?;
            }
            Err(e) => error!("Error accepting client connection: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn open_hand_is_flat() {
        assert_eq!(synthesize_pose(&ControlVector::OPEN_HAND), PoseVector::zeros());
    }

    #[test]
    fn pinch_leads_with_the_thumb() {
        let pose = synthesize_pose(&ControlVector::PINCH);
        assert_relative_eq!(pose.euler_degrees(Joint::Thumb2).x, 48.0, epsilon = 1e-4);
        assert_relative_eq!(pose.euler_degrees(Joint::Thumb1).z, 36.0, epsilon = 1e-4);
        assert!(pose.euler_degrees(Joint::Index1).x < pose.euler_degrees(Joint::Thumb2).x);
    }

    #[test]
    fn point_curls_index_and_middle_only() {
        let pose = synthesize_pose(&ControlVector::POINT);
        assert_eq!(pose.euler_degrees(Joint::Index1).x, 80.0);
        assert_eq!(pose.euler_degrees(Joint::Middle3).x, 70.0);
        assert!(pose.euler_degrees(Joint::Thumb3).x < 20.0);
    }

    #[test]
    fn fist_flexes_every_finger() {
        let pose = synthesize_pose(&ControlVector::FIST);
        for (joint, euler) in pose.joints() {
            assert!(euler.x > 0.0, "{:?} not flexed", joint);
        }
        assert_eq!(pose.euler_degrees(Joint::Thumb1).z, 20.0);
        assert_eq!(pose.euler_degrees(Joint::Index2).x, 100.0);
    }
}
