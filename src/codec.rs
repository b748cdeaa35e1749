//! Fixed size, header-less frames. Both ends agree on the shape up front so
//! the frame length is the only delimiter.
//!
//! ```text
//! request   16 bytes  4 × f32 LE  [thumb, index, middle, abduction]
//! response 180 bytes 45 × f32 LE  15 joints × (x, y, z) degrees
//! ```

use crate::error::{Error, Result};
use crate::types::{ControlVector, PoseVector, CONTROL_LEN, POSE_LEN};
use byteorder::{ByteOrder, LittleEndian};

pub const CONTROL_FRAME_LEN: usize = CONTROL_LEN * 4;
pub const POSE_FRAME_LEN: usize = POSE_LEN * 4;

pub fn encode_control(control: &ControlVector) -> [u8; CONTROL_FRAME_LEN] {
    let mut frame = [0u8; CONTROL_FRAME_LEN];
    LittleEndian::write_f32_into(&control.to_array(), &mut frame);
    frame
}

pub fn decode_control(frame: &[u8]) -> Result<ControlVector> {
    check_len(frame, CONTROL_FRAME_LEN)?;
    let mut values = [0f32; CONTROL_LEN];
    LittleEndian::read_f32_into(frame, &mut values);
    Ok(ControlVector::from_array(values))
}

pub fn encode_pose(pose: &PoseVector) -> [u8; POSE_FRAME_LEN] {
    let mut frame = [0u8; POSE_FRAME_LEN];
    LittleEndian::write_f32_into(pose.as_array(), &mut frame);
    frame
}

/// The caller is responsible for assembling exactly [`POSE_FRAME_LEN`] bytes.
pub fn decode_pose(frame: &[u8]) -> Result<PoseVector> {
    check_len(frame, POSE_FRAME_LEN)?;
    let mut values = [0f32; POSE_LEN];
    LittleEndian::read_f32_into(frame, &mut values);
    Ok(PoseVector::new(values))
}

fn check_len(frame: &[u8], expected: usize) -> Result<()> {
    if frame.len() != expected {
        return Err(Error::MalformedFrame {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_frame_layout() {
        let frame = encode_control(&ControlVector::new(1.0, -2.5, 0.0, 0.25));
        assert_eq!(frame.len(), CONTROL_FRAME_LEN);
        assert_eq!(&frame[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&frame[4..8], &(-2.5f32).to_le_bytes());
        assert_eq!(&frame[12..16], &0.25f32.to_le_bytes());
    }

    #[test]
    fn pose_decodes_what_was_encoded() {
        let mut values = [0f32; POSE_LEN];
        for (i, value) in values.iter_mut().enumerate() {
            *value = i as f32 * 1.5 - 30.0;
        }
        values[44] = f32::MAX;
        let pose = PoseVector::new(values);
        let decoded = decode_pose(&encode_pose(&pose)).unwrap();
        assert_eq!(decoded, pose);
    }

    #[test]
    fn pose_reads_little_endian_floats() {
        let mut frame = vec![0u8; POSE_FRAME_LEN];
        frame[4..8].copy_from_slice(&12.5f32.to_le_bytes());
        let pose = decode_pose(&frame).unwrap();
        assert_eq!(pose.as_array()[1], 12.5);
        assert_eq!(pose.as_array()[0], 0.0);
    }

    #[test]
    fn wrong_length_is_malformed() {
        for len in [0, 16, 179, 181, 360] {
            let frame = vec![0u8; len];
            match decode_pose(&frame) {
                Err(Error::MalformedFrame { expected, actual }) => {
                    assert_eq!(expected, POSE_FRAME_LEN);
                    assert_eq!(actual, len);
                }
                other => panic!("expected malformed frame for {} bytes, got {:?}", len, other),
            }
        }
        assert!(decode_control(&[0u8; 15]).is_err());
    }
}
