use glam::{Mat4, Vec3};
use thiserror::Error;

use super::compose::{rotation, translation};

/// Pose of one joint: a rotation about a fixed axis placed at an offset from
/// the parent's frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JointPose {
    pub axis: Vec3,
    /// Degrees.
    pub angle: f32,
    pub offset: Vec3,
}

impl JointPose {
    pub fn new(axis: Vec3) -> Self {
        Self {
            axis,
            angle: 0.0,
            offset: Vec3::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// `translate(offset) * rotate(axis, angle)`.
    pub fn local(&self) -> Mat4 {
        translation(self.offset) * rotation(self.axis, self.angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,
    pub pose: JointPose,
    rest: JointPose,
}

impl Joint {
    /// Pose the joint was created with.
    pub fn rest_pose(&self) -> JointPose {
        self.rest
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("joint `{joint}` (index {index}) lists parent {parent}, which does not precede it")]
    ParentNotBefore {
        joint: String,
        index: usize,
        parent: usize,
    },

    #[error("unknown parent joint `{0}`")]
    UnknownParent(String),

    #[error("joint `{0}` declared twice")]
    DuplicateJoint(String),
}

/// Matrices of one joint for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JointTransform {
    /// Object → world.
    pub model: Mat4,
    /// `camera * model`.
    pub to_camera: Mat4,
    /// `projection * camera * model`.
    pub to_clip: Mat4,
}

/// Joints stored so that every parent precedes its children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    joints: Vec<Joint>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a joint under `parent` (by name) and returns its index.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        parent: Option<&str>,
        pose: JointPose,
    ) -> Result<usize, HierarchyError> {
        let parent = parent
            .map(|p| {
                self.index_of(p)
                    .ok_or_else(|| HierarchyError::UnknownParent(p.to_string()))
            })
            .transpose()?;
        self.push(name.into(), parent, pose)
    }

    /// Builds a hierarchy from `(name, parent index, pose)` entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, Option<usize>, JointPose)>,
    ) -> Result<Self, HierarchyError> {
        let mut hierarchy = Self::new();
        for (name, parent, pose) in entries {
            hierarchy.push(name, parent, pose)?;
        }
        Ok(hierarchy)
    }

    fn push(
        &mut self,
        name: String,
        parent: Option<usize>,
        pose: JointPose,
    ) -> Result<usize, HierarchyError> {
        let index = self.joints.len();
        if let Some(p) = parent {
            if p >= index {
                return Err(HierarchyError::ParentNotBefore {
                    joint: name,
                    index,
                    parent: p,
                });
            }
        }
        if self.index_of(&name).is_some() {
            return Err(HierarchyError::DuplicateJoint(name));
        }
        self.joints.push(Joint {
            name,
            parent,
            pose,
            rest: pose,
        });
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn pose(&self, index: usize) -> Option<&JointPose> {
        self.joints.get(index).map(|j| &j.pose)
    }

    pub fn pose_mut(&mut self, index: usize) -> Option<&mut JointPose> {
        self.joints.get_mut(index).map(|j| &mut j.pose)
    }

    /// Restores every joint to the pose it was created with.
    pub fn reset(&mut self) {
        for joint in &mut self.joints {
            joint.pose = joint.rest;
        }
    }

    /// Composes every joint in one pass.
    ///
    /// A joint's model matrix is its parent's model matrix followed by its own
    /// local factor; roots start from the identity.
    pub fn compose(&self, projection: &Mat4, camera: &Mat4) -> Vec<JointTransform> {
        let view_projection = *projection * *camera;
        let mut models: Vec<Mat4> = Vec::with_capacity(self.joints.len());
        let mut out = Vec::with_capacity(self.joints.len());

        for joint in &self.joints {
            let parent = joint.parent.map_or(Mat4::IDENTITY, |p| models[p]);
            let model = parent * joint.pose.local();
            models.push(model);
            out.push(JointTransform {
                model,
                to_camera: *camera * model,
                to_clip: view_projection * model,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compose::compose;

    const EPS: f32 = 1e-4;

    fn arm() -> Hierarchy {
        let mut h = Hierarchy::new();
        h.add("base", None, JointPose::new(Vec3::Y)).unwrap();
        h.add(
            "forearm",
            Some("base"),
            JointPose::new(Vec3::Z).with_offset(Vec3::new(0.0, 2.0, 0.0)),
        )
        .unwrap();
        h.add(
            "upperarm",
            Some("forearm"),
            JointPose::new(Vec3::Z).with_offset(Vec3::new(0.0, 8.0, 0.0)),
        )
        .unwrap();
        h
    }

    // ── local factors ─────────────────────────────────────────────────────

    #[test]
    fn zero_angle_local_is_pure_translation() {
        let pose = JointPose::new(Vec3::Z).with_offset(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(pose.local(), Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn child_inherits_parent_chain() {
        let mut h = arm();
        h.pose_mut(0).unwrap().angle = 30.0;
        h.pose_mut(1).unwrap().angle = 45.0;
        h.pose_mut(2).unwrap().angle = -20.0;

        let out = h.compose(&Mat4::IDENTITY, &Mat4::IDENTITY);
        let expected = compose(&[
            rotation(Vec3::Y, 30.0),
            translation(Vec3::new(0.0, 2.0, 0.0)),
            rotation(Vec3::Z, 45.0),
            translation(Vec3::new(0.0, 8.0, 0.0)),
            rotation(Vec3::Z, -20.0),
        ]);
        assert!(out[2].model.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn clip_is_projection_camera_model() {
        let mut h = arm();
        h.pose_mut(1).unwrap().angle = 10.0;
        let projection = Mat4::orthographic_rh(-13.0, 13.0, -8.0, 18.0, -15.0, 35.0);
        let camera = Mat4::look_at_rh(
            Vec3::new(0.0, 8.0, 16.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::Y,
        );

        for t in h.compose(&projection, &camera) {
            assert!(t.to_camera.abs_diff_eq(camera * t.model, EPS));
            assert!(t.to_clip.abs_diff_eq(projection * camera * t.model, EPS));
        }
    }

    #[test]
    fn rotating_base_moves_children_only_through_parent() {
        let mut h = arm();
        h.pose_mut(0).unwrap().angle = 90.0;
        let out = h.compose(&Mat4::IDENTITY, &Mat4::IDENTITY);

        // Yaw about Y keeps the joint column on the Y axis.
        let tip = out[2].model.transform_point3(Vec3::ZERO);
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), EPS));
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn rejects_parent_after_child() {
        let err = Hierarchy::from_entries([
            ("a".to_string(), Some(1), JointPose::new(Vec3::Z)),
            ("b".to_string(), None, JointPose::new(Vec3::Z)),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            HierarchyError::ParentNotBefore {
                joint: "a".into(),
                index: 0,
                parent: 1,
            }
        );
    }

    #[test]
    fn rejects_unknown_and_duplicate() {
        let mut h = arm();
        assert_eq!(
            h.add("x", Some("nope"), JointPose::new(Vec3::X)),
            Err(HierarchyError::UnknownParent("nope".into()))
        );
        assert_eq!(
            h.add("base", None, JointPose::new(Vec3::X)),
            Err(HierarchyError::DuplicateJoint("base".into()))
        );
    }

    #[test]
    fn reset_restores_rest_pose() {
        let mut h = arm();
        h.pose_mut(2).unwrap().angle = 70.0;
        h.reset();
        assert_eq!(h.pose(2).unwrap().angle, 0.0);
        assert_eq!(h.pose(2).unwrap().offset, Vec3::new(0.0, 8.0, 0.0));
    }
}
