use nalgebra as na;
use serde::{Deserialize, Serialize};

pub const CONTROL_LEN: usize = 4;
pub const JOINT_COUNT: usize = 15;
pub const POSE_LEN: usize = JOINT_COUNT * 3;

/// Glove style control input. Values are typically 0.0 (open) to 1.0
/// (closed) but nothing enforces that here.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlVector {
    pub thumb_closure: f32,
    pub index_closure: f32,
    pub middle_closure: f32,
    pub thumb_abduction: f32,
}

impl ControlVector {
    pub const OPEN_HAND: ControlVector = ControlVector::new(0.0, 0.0, 0.0, 0.0);
    pub const FIST: ControlVector = ControlVector::new(1.0, 1.0, 1.0, 0.5);
    pub const PINCH: ControlVector = ControlVector::new(0.8, 0.2, 0.2, 0.9);
    pub const POINT: ControlVector = ControlVector::new(0.2, 1.0, 1.0, 0.2);

    pub const fn new(
        thumb_closure: f32,
        index_closure: f32,
        middle_closure: f32,
        thumb_abduction: f32,
    ) -> Self {
        Self {
            thumb_closure,
            index_closure,
            middle_closure,
            thumb_abduction,
        }
    }

    /// Wire order: thumb, index, middle, abduction.
    pub fn to_array(&self) -> [f32; CONTROL_LEN] {
        [
            self.thumb_closure,
            self.index_closure,
            self.middle_closure,
            self.thumb_abduction,
        ]
    }

    pub fn from_array(values: [f32; CONTROL_LEN]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

impl From<[f32; CONTROL_LEN]> for ControlVector {
    fn from(values: [f32; CONTROL_LEN]) -> Self {
        Self::from_array(values)
    }
}

/// 15 joints × (x, y, z) Euler angles in degrees, in [`Joint::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseVector([f32; POSE_LEN]);

impl PoseVector {
    pub fn new(values: [f32; POSE_LEN]) -> Self {
        Self(values)
    }

    pub fn zeros() -> Self {
        Self([0.0; POSE_LEN])
    }

    pub fn as_array(&self) -> &[f32; POSE_LEN] {
        &self.0
    }

    pub fn euler_degrees(&self, joint: Joint) -> na::Vector3<f32> {
        let start = joint.index() * 3;
        na::Vector3::new(self.0[start], self.0[start + 1], self.0[start + 2])
    }

    pub fn joints(&self) -> impl Iterator<Item = (Joint, na::Vector3<f32>)> + '_ {
        Joint::ALL
            .into_iter()
            .map(move |joint| (joint, self.euler_degrees(joint)))
    }
}

impl Default for PoseVector {
    fn default() -> Self {
        Self::zeros()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Thumb1,
    Thumb2,
    Thumb3,
    Index1,
    Index2,
    Index3,
    Middle1,
    Middle2,
    Middle3,
    Ring1,
    Ring2,
    Ring3,
    Pinky1,
    Pinky2,
    Pinky3,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Thumb1,
        Joint::Thumb2,
        Joint::Thumb3,
        Joint::Index1,
        Joint::Index2,
        Joint::Index3,
        Joint::Middle1,
        Joint::Middle2,
        Joint::Middle3,
        Joint::Ring1,
        Joint::Ring2,
        Joint::Ring3,
        Joint::Pinky1,
        Joint::Pinky2,
        Joint::Pinky3,
    ];

    /// Position in the wire order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn finger(self) -> Finger {
        match self {
            Joint::Thumb1 | Joint::Thumb2 | Joint::Thumb3 => Finger::Thumb,
            Joint::Index1 | Joint::Index2 | Joint::Index3 => Finger::Index,
            Joint::Middle1 | Joint::Middle2 | Joint::Middle3 => Finger::Middle,
            Joint::Ring1 | Joint::Ring2 | Joint::Ring3 => Finger::Ring,
            Joint::Pinky1 | Joint::Pinky2 | Joint::Pinky3 => Finger::Pinky,
        }
    }

    /// 1 is the knuckle, 3 the fingertip segment.
    pub fn segment(self) -> usize {
        self.index() % 3 + 1
    }

    /// Bone name in the right hand rig the predictor was trained against.
    pub fn rig_name(self) -> String {
        let finger = match self.finger() {
            Finger::Thumb => "thumb",
            Finger::Index => "f_index",
            Finger::Middle => "f_middle",
            Finger::Ring => "f_ring",
            Finger::Pinky => "f_pinky",
        };
        format!("DEF-{}.{:02}.R", finger, self.segment())
    }
}
