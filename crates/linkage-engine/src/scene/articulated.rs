use glam::{Mat4, Vec3};

use crate::error::{InitError, SceneError};
use crate::geometry::primitives::names;
use crate::geometry::ModelCatalog;
use crate::gfx::RenderContext;
use crate::input::ControlEvent;
use crate::render::{Light, ShadingMode};
use crate::transform::{look_at, orthographic, Hierarchy, JointPose, JointTransform};

use super::{Scene, SceneCore, BACKGROUND};

/// One joint of an articulated scene and the model it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    /// Catalog key.
    pub model: String,
    /// Name of an earlier joint.
    pub parent: Option<String>,
    pub pose: JointPose,
}

impl JointSpec {
    pub fn new(name: impl Into<String>, model: impl Into<String>, pose: JointPose) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            parent: None,
            pose,
        }
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ArticulatedConfig {
    pub name: String,
    pub projection: Mat4,
    pub camera: Mat4,
    /// Parents before children.
    pub joints: Vec<JointSpec>,
    pub shading: ShadingMode,
    pub light: Light,
    pub animate: bool,
    /// Joint rotated by each animation tick.
    pub animate_joint: usize,
    /// Degrees per tick.
    pub animate_step: f32,
    pub clear_color: wgpu::Color,
}

impl ArticulatedConfig {
    /// Base yawing about Y, with a forearm and an upper arm pitching about Z.
    pub fn robot_arm() -> Self {
        Self {
            name: "robot".to_string(),
            projection: orthographic(-13.0, 13.0, -8.0, 18.0, -15.0, 35.0),
            camera: look_at(Vec3::new(0.0, 8.0, 16.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
            joints: vec![
                JointSpec::new("base", names::BASE, JointPose::new(Vec3::Y)),
                JointSpec::new(
                    "forearm",
                    names::FOREARM,
                    JointPose::new(Vec3::Z).with_offset(Vec3::new(0.0, 2.0, 0.0)),
                )
                .child_of("base"),
                JointSpec::new(
                    "upperarm",
                    names::UPPERARM,
                    JointPose::new(Vec3::Z).with_offset(Vec3::new(0.0, 8.0, 0.0)),
                )
                .child_of("forearm"),
            ],
            shading: ShadingMode::Flat,
            light: Light::default(),
            animate: true,
            animate_joint: 0,
            animate_step: 1.0,
            clear_color: BACKGROUND,
        }
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }
}

/// Parts attached to a joint hierarchy; every joint's model matrix is its
/// parent's followed by its own `translate(offset) * rotate(angle)`.
#[derive(Debug)]
pub struct ArticulatedScene {
    core: SceneCore,
    hierarchy: Hierarchy,
    /// Part index per joint.
    parts: Vec<usize>,
    projection: Mat4,
    camera: Mat4,
    animate_joint: usize,
    animate_step: f32,
    clear_color: wgpu::Color,
}

impl ArticulatedScene {
    pub fn new<C>(ctx: &mut C, catalog: &ModelCatalog, config: ArticulatedConfig) -> Result<Self, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let mut hierarchy = Hierarchy::new();
        for joint in &config.joints {
            hierarchy
                .add(joint.name.clone(), joint.parent.as_deref(), joint.pose)
                .map_err(InitError::from)?;
        }

        let (core, parts) = SceneCore::assemble(ctx, config.name, config.animate, |core, ctx| {
            config
                .joints
                .iter()
                .map(|joint| core.add_part(ctx, catalog, &joint.model, config.shading, config.light))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Self {
            core,
            hierarchy,
            parts,
            projection: config.projection,
            camera: config.camera,
            animate_joint: config.animate_joint,
            animate_step: config.animate_step,
            clear_color: config.clear_color,
        })
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Matrices every joint is drawn with under the current pose.
    pub fn joint_transforms(&self) -> Vec<JointTransform> {
        self.hierarchy.compose(&self.projection, &self.camera)
    }

    fn with_pose(&mut self, joint: usize, f: impl FnOnce(&mut JointPose)) {
        match self.hierarchy.pose_mut(joint) {
            Some(pose) => f(pose),
            None => log::debug!("scene `{}` has no joint {joint}", self.core.name()),
        }
    }
}

impl Scene for ArticulatedScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        self.core.ensure_live()?;
        for (part, t) in self.parts.iter().zip(self.joint_transforms()) {
            self.core.draw(ctx, *part, &t.to_clip, Some(&t.to_camera))?;
        }
        Ok(())
    }

    fn control(&mut self, event: &ControlEvent) {
        match *event {
            ControlEvent::SetJointAngle { joint, degrees } => {
                self.with_pose(joint, |p| p.angle = degrees)
            }
            ControlEvent::NudgeJoint { joint, degrees } => {
                self.with_pose(joint, |p| p.angle = wrap_degrees(p.angle + degrees))
            }
            ControlEvent::SetOffset { joint, offset } => self.with_pose(joint, |p| p.offset = offset),
            ControlEvent::Drag { dx, .. } => {
                let joint = self.animate_joint;
                self.with_pose(joint, |p| p.angle = wrap_degrees(p.angle + dx))
            }
            ControlEvent::Reset => self.hierarchy.reset(),
            _ => {}
        }
    }

    fn animate_step(&mut self) {
        let (joint, step) = (self.animate_joint, self.animate_step);
        self.with_pose(joint, |p| p.angle = wrap_degrees(p.angle + step));
    }

    fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MisuseError;
    use crate::geometry::primitives;
    use crate::gfx::{HeadlessContext, PrimitiveKind};
    use crate::transform::{compose, rotation, translation};

    const EPS: f32 = 1e-4;

    fn robot(ctx: &mut HeadlessContext) -> ArticulatedScene {
        ArticulatedScene::new(ctx, &primitives::standard_catalog(), ArticulatedConfig::robot_arm())
            .unwrap()
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn renders_each_part_in_hierarchy_order() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.render(&mut ctx).unwrap();

        // Three outlined boxes, three groups each.
        let draws = ctx.draws();
        assert_eq!(draws.len(), 9);
        let kinds: Vec<_> = draws[..3].iter().map(|d| d.kind).collect();
        assert_eq!(kinds, PrimitiveKind::DRAW_ORDER);

        let transforms = scene.joint_transforms();
        for (i, chunk) in draws.chunks(3).enumerate() {
            assert!(chunk.iter().all(|d| d.to_clip() == Some(transforms[i].to_clip)));
        }
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn upperarm_matrix_is_the_full_chain() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.apply(&ControlEvent::SetJointAngle { joint: 0, degrees: 30.0 });
        scene.apply(&ControlEvent::SetJointAngle { joint: 1, degrees: -45.0 });
        scene.apply(&ControlEvent::SetJointAngle { joint: 2, degrees: 60.0 });
        scene.render(&mut ctx).unwrap();

        let config = ArticulatedConfig::robot_arm();
        let expected = compose(&[
            config.projection,
            config.camera,
            rotation(Vec3::Y, 30.0),
            translation(Vec3::new(0.0, 2.0, 0.0)),
            rotation(Vec3::Z, -45.0),
            translation(Vec3::new(0.0, 8.0, 0.0)),
            rotation(Vec3::Z, 60.0),
        ]);
        let last = ctx.draws().last().unwrap();
        assert!(last.to_clip().unwrap().abs_diff_eq(expected, EPS));
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn rest_pose_is_pure_translation_chain() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        let t = scene.joint_transforms();
        assert_eq!(t[0].model, Mat4::IDENTITY);
        assert_eq!(t[2].model, Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)));
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn rest_forearm_clip_is_exact() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.render(&mut ctx).unwrap();

        let config = ArticulatedConfig::robot_arm();
        let expected = compose(&[
            config.projection,
            config.camera,
            Mat4::IDENTITY,
            translation(Vec3::new(0.0, 2.0, 0.0)),
        ]);
        // Forearm draws follow the base's three.
        assert_eq!(ctx.draws()[3].to_clip(), Some(expected));
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn unchanged_pose_renders_identical_frames() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.apply(&ControlEvent::SetJointAngle { joint: 0, degrees: 33.0 });
        scene.apply(&ControlEvent::SetJointAngle { joint: 2, degrees: -71.5 });

        scene.render(&mut ctx).unwrap();
        let first: Vec<_> = ctx.take_draws().iter().map(|d| d.to_clip()).collect();
        scene.render(&mut ctx).unwrap();
        let second: Vec<_> = ctx.draws().iter().map(|d| d.to_clip()).collect();

        assert_eq!(first.len(), 9);
        assert_eq!(first, second);
        scene.teardown(&mut ctx).unwrap();
    }

    // ── controls & animation ──────────────────────────────────────────────

    #[test]
    fn animation_turns_the_base_only() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        assert!(scene.animate_active());
        for _ in 0..5 {
            scene.animate_step();
        }
        assert_eq!(scene.hierarchy().pose(0).unwrap().angle, 5.0);
        assert_eq!(scene.hierarchy().pose(1).unwrap().angle, 0.0);

        scene.apply(&ControlEvent::Reset);
        assert_eq!(scene.hierarchy().pose(0).unwrap().angle, 0.0);
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn nudges_wrap_and_unknown_joints_are_ignored() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.apply(&ControlEvent::NudgeJoint { joint: 1, degrees: -10.0 });
        assert_eq!(scene.hierarchy().pose(1).unwrap().angle, 350.0);
        scene.apply(&ControlEvent::NudgeJoint { joint: 9, degrees: 10.0 });
        scene.apply(&ControlEvent::SetOffset {
            joint: 2,
            offset: Vec3::new(0.0, 6.0, 0.0),
        });
        let tip = scene.joint_transforms()[2].model.transform_point3(Vec3::ZERO);
        assert!((tip.y - (2.0 + 6.0 * 10f32.to_radians().cos())).abs() < EPS);
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn set_animate_false_stops_the_flag() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        scene.apply(&ControlEvent::SetAnimate(false));
        assert!(!scene.animate_active());
        scene.teardown(&mut ctx).unwrap();
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn teardown_then_render_is_misuse_and_frees_all() {
        let mut ctx = HeadlessContext::new();
        let mut scene = robot(&mut ctx);
        let created = ctx.stats().buffers_created;
        // Per outlined box: positions, normals, colors + two line + two point buffers.
        assert_eq!(created, 3 * 7);

        scene.teardown(&mut ctx).unwrap();
        assert_eq!(ctx.stats().buffers_deleted, created);
        assert!(!scene.animate_active());

        let err = scene.render(&mut ctx).unwrap_err();
        assert_eq!(
            err.as_misuse(),
            Some(&MisuseError::RenderAfterTeardown("robot".into()))
        );
        let err = scene.teardown(&mut ctx).unwrap_err();
        assert_eq!(err.as_misuse(), Some(&MisuseError::DoubleTeardown("robot".into())));
    }

    #[test]
    fn missing_model_leaves_nothing_allocated() {
        let mut ctx = HeadlessContext::new();
        let mut config = ArticulatedConfig::robot_arm();
        config.joints[2].model = "gripper".into();

        let err = ArticulatedScene::new(&mut ctx, &primitives::standard_catalog(), config)
            .unwrap_err();
        assert!(matches!(err, SceneError::Init(InitError::MissingModel(ref m)) if m == "gripper"));
        assert_eq!(ctx.live_buffer_count(), 0);
        assert_eq!(ctx.live_program_count(), 0);
    }

    #[test]
    fn bad_parent_order_fails_before_upload() {
        let mut ctx = HeadlessContext::new();
        let mut config = ArticulatedConfig::robot_arm();
        config.joints.swap(0, 1);

        let err = ArticulatedScene::new(&mut ctx, &primitives::standard_catalog(), config)
            .unwrap_err();
        assert!(matches!(err, SceneError::Init(InitError::InvalidHierarchy(_))));
        assert_eq!(ctx.stats().buffers_created, 0);
    }

    #[test]
    fn lit_arm_uploads_camera_matrices() {
        let mut ctx = HeadlessContext::new();
        let config = ArticulatedConfig::robot_arm().with_shading(ShadingMode::ColoredLight);
        let mut scene =
            ArticulatedScene::new(&mut ctx, &primitives::standard_catalog(), config).unwrap();
        scene.render(&mut ctx).unwrap();

        let t = scene.joint_transforms();
        let lit_draw = ctx
            .draws()
            .iter()
            .find(|d| d.kind == PrimitiveKind::Triangles)
            .unwrap();
        assert_eq!(lit_draw.matrix("to_camera_space"), Some(t[0].to_camera));
        scene.teardown(&mut ctx).unwrap();
    }
}
