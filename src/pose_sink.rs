use crate::types::{Joint, PoseVector};
use nalgebra as na;
use std::collections::HashMap;

/// Consumer of decoded poses.
pub trait PoseSink {
    fn apply(&mut self, pose: &PoseVector);
}

/// Rotation for one joint's Euler angles in degrees. Applied Z first, then X,
/// then Y, matching the engine the hand rig was authored in.
pub fn euler_rotation(euler_degrees: &na::Vector3<f32>) -> na::UnitQuaternion<f32> {
    let radians = euler_degrees.map(f32::to_radians);
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), radians.y)
        * na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), radians.x)
        * na::UnitQuaternion::from_axis_angle(&na::Vector3::z_axis(), radians.z)
}

struct RigJoint {
    rotation: na::UnitQuaternion<f32>,
    euler_degrees: na::Vector3<f32>,
}

impl RigJoint {
    fn new(palm: na::UnitQuaternion<f32>) -> Self {
        Self {
            rotation: palm,
            euler_degrees: na::Vector3::zeros(),
        }
    }
}

/// World space joint orientations of a hand. Every joint hangs directly off
/// the palm orientation; the rig may be missing joints.
pub struct HandRig {
    palm: na::UnitQuaternion<f32>,
    joints: HashMap<Joint, RigJoint>,
}

impl HandRig {
    pub fn with_joints(
        palm: na::UnitQuaternion<f32>,
        joints: impl IntoIterator<Item = Joint>,
    ) -> Self {
        Self {
            palm,
            joints: joints
                .into_iter()
                .map(|joint| (joint, RigJoint::new(palm)))
                .collect(),
        }
    }

    pub fn with_all_joints(palm: na::UnitQuaternion<f32>) -> Self {
        Self::with_joints(palm, Joint::ALL.iter().copied())
    }

    /// Builds a rig from the bone names a skeleton actually has. Names that
    /// don't belong to a known finger joint are ignored.
    pub fn from_bone_names<'a>(
        palm: na::UnitQuaternion<f32>,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let by_name: HashMap<String, Joint> = Joint::ALL
            .iter()
            .map(|joint| (joint.rig_name(), *joint))
            .collect();
        let joints: Vec<Joint> = names
            .into_iter()
            .filter_map(|name| by_name.get(name).copied())
            .collect();
        Self::with_joints(palm, joints)
    }

    pub fn has_joint(&self, joint: Joint) -> bool {
        self.joints.contains_key(&joint)
    }

    pub fn joint_rotation(&self, joint: Joint) -> Option<na::UnitQuaternion<f32>> {
        self.joints.get(&joint).map(|rig_joint| rig_joint.rotation)
    }

    /// Angles last applied to `joint`, as received.
    pub fn joint_euler_degrees(&self, joint: Joint) -> Option<na::Vector3<f32>> {
        self.joints.get(&joint).map(|rig_joint| rig_joint.euler_degrees)
    }
}

impl PoseSink for HandRig {
    fn apply(&mut self, pose: &PoseVector) {
        for (joint, euler_degrees) in pose.joints() {
            if let Some(rig_joint) = self.joints.get_mut(&joint) {
                rig_joint.rotation = self.palm * euler_rotation(&euler_degrees);
                rig_joint.euler_degrees = euler_degrees;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::POSE_LEN;
    use approx::assert_relative_eq;

    fn pose_with(joint: Joint, euler: [f32; 3]) -> PoseVector {
        let mut values = [0f32; POSE_LEN];
        let start = joint.index() * 3;
        values[start..start + 3].copy_from_slice(&euler);
        PoseVector::new(values)
    }

    #[test]
    fn euler_order_is_z_then_x_then_y() {
        let rotated = euler_rotation(&na::Vector3::new(90.0, 0.0, 90.0)) * na::Vector3::x();
        assert_relative_eq!(rotated, na::Vector3::z(), epsilon = 1e-5);

        let yawed = euler_rotation(&na::Vector3::new(0.0, 90.0, 0.0)) * na::Vector3::x();
        assert_relative_eq!(yawed, -na::Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn zero_pose_leaves_joints_at_palm() {
        let palm = na::UnitQuaternion::from_euler_angles(0.3, -0.2, 1.0);
        let mut rig = HandRig::with_all_joints(palm);
        rig.apply(&pose_with(Joint::Ring2, [45.0, 0.0, 0.0]));
        rig.apply(&PoseVector::zeros());
        for joint in Joint::ALL.iter() {
            assert!(rig.joint_rotation(*joint).unwrap().angle_to(&palm) < 1e-5);
            assert_eq!(rig.joint_euler_degrees(*joint), Some(na::Vector3::zeros()));
        }
    }

    #[test]
    fn joint_is_rotated_relative_to_palm() {
        let palm = na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), 0.5);
        let mut rig = HandRig::with_all_joints(palm);
        rig.apply(&pose_with(Joint::Index2, [30.0, 0.0, 0.0]));

        let relative = palm.inverse() * rig.joint_rotation(Joint::Index2).unwrap();
        assert_relative_eq!(relative.angle(), 30f32.to_radians(), epsilon = 1e-5);
        assert!(rig.joint_rotation(Joint::Index1).unwrap().angle_to(&palm) < 1e-5);
        assert_eq!(
            rig.joint_euler_degrees(Joint::Index2),
            Some(na::Vector3::new(30.0, 0.0, 0.0))
        );
    }

    #[test]
    fn missing_joints_are_skipped() {
        let mut rig = HandRig::from_bone_names(
            na::UnitQuaternion::identity(),
            vec!["DEF-thumb.01.R", "DEF-f_pinky.03.R", "ORG-palm.01.R"],
        );
        assert!(rig.has_joint(Joint::Thumb1));
        assert!(rig.has_joint(Joint::Pinky3));
        assert!(!rig.has_joint(Joint::Middle1));

        let mut values = [10f32; POSE_LEN];
        values[0] = 20.0;
        rig.apply(&PoseVector::new(values));
        assert!(rig.joint_rotation(Joint::Middle1).is_none());
        assert_eq!(
            rig.joint_euler_degrees(Joint::Thumb1),
            Some(na::Vector3::new(20.0, 10.0, 10.0))
        );
    }
}
