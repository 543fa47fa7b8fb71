use glam::{Mat4, Vec3};

use crate::error::SceneError;
use crate::geometry::primitives::names;
use crate::geometry::ModelCatalog;
use crate::gfx::RenderContext;
use crate::input::ControlEvent;
use crate::render::{Light, ShadingMode};
use crate::transform::{look_at, orthographic, rotation, translation, TransformChain};

use super::{Scene, SceneCore, BACKGROUND};

#[derive(Debug, Clone)]
pub struct TransformLabConfig {
    pub name: String,
    pub models: Vec<String>,
    pub projection: Mat4,
    pub camera: Mat4,
    pub animate: bool,
    pub clear_color: wgpu::Color,
}

impl Default for TransformLabConfig {
    fn default() -> Self {
        Self {
            name: "transform".to_string(),
            models: vec![names::BOX.to_string(), names::AXES.to_string()],
            projection: orthographic(-4.0, 4.0, -4.0, 4.0, -8.0, 8.0),
            camera: look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y),
            animate: false,
            clear_color: BACKGROUND,
        }
    }
}

/// Shows the effect of translating and then rotating about x:
/// `P * C * Rx(angle_x) * Ry(angle_y) * T(translation) * Rx(x_angle)`.
///
/// The view rotation (`angle_x`, `angle_y`) follows drags and animation;
/// `x_angle` and the translation follow their own controls.
#[derive(Debug)]
pub struct TransformLabScene {
    core: SceneCore,
    parts: Vec<usize>,
    projection: Mat4,
    camera: Mat4,
    angle_x: f32,
    angle_y: f32,
    x_angle: f32,
    translation: Vec3,
    clear_color: wgpu::Color,
}

impl TransformLabScene {
    pub fn new<C>(
        ctx: &mut C,
        catalog: &ModelCatalog,
        config: TransformLabConfig,
    ) -> Result<Self, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let models = &config.models;
        let (core, parts) = SceneCore::assemble(ctx, config.name.clone(), config.animate, |core, ctx| {
            models
                .iter()
                .map(|m| core.add_part(ctx, catalog, m, ShadingMode::Flat, Light::default()))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Self {
            core,
            parts,
            projection: config.projection,
            camera: config.camera,
            angle_x: 0.0,
            angle_y: 0.0,
            x_angle: 0.0,
            translation: Vec3::ZERO,
            clear_color: config.clear_color,
        })
    }

    pub fn x_angle(&self) -> f32 {
        self.x_angle
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Factors of the current frame, projection first.
    pub fn chain(&self) -> TransformChain {
        TransformChain::new()
            .then(self.projection)
            .then(self.camera)
            .then(rotation(Vec3::X, self.angle_x))
            .then(rotation(Vec3::Y, self.angle_y))
            .then(translation(self.translation))
            .then(rotation(Vec3::X, self.x_angle))
    }
}

impl Scene for TransformLabScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        self.core.ensure_live()?;
        let to_clip = self.chain().compose();
        for part in &self.parts {
            self.core.draw(ctx, *part, &to_clip, None)?;
        }
        Ok(())
    }

    fn control(&mut self, event: &ControlEvent) {
        match *event {
            ControlEvent::Drag { dx, dy } => {
                self.angle_x -= dy;
                self.angle_y += dx;
            }
            ControlEvent::SetXAngle(degrees) => self.x_angle = degrees,
            ControlEvent::NudgeXAngle(degrees) => self.x_angle += degrees,
            ControlEvent::SetTranslation(t) => self.translation = t,
            ControlEvent::NudgeTranslation(dt) => self.translation += dt,
            ControlEvent::Reset => {
                self.angle_x = 0.0;
                self.angle_y = 0.0;
                self.x_angle = 0.0;
                self.translation = Vec3::ZERO;
            }
            _ => {}
        }
    }

    fn animate_step(&mut self) {
        self.angle_x -= 0.5;
        self.angle_y += 1.0;
    }

    fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use crate::gfx::HeadlessContext;

    const EPS: f32 = 1e-5;

    fn lab(ctx: &mut HeadlessContext) -> TransformLabScene {
        TransformLabScene::new(ctx, &primitives::standard_catalog(), TransformLabConfig::default())
            .unwrap()
    }

    #[test]
    fn translate_is_applied_after_the_x_rotation() {
        let mut ctx = HeadlessContext::new();
        let mut scene = lab(&mut ctx);
        scene.apply(&ControlEvent::SetXAngle(90.0));
        scene.apply(&ControlEvent::SetTranslation(Vec3::new(1.0, 0.0, 0.0)));

        // Strip projection and camera: the object-local part of the chain.
        let local = scene.chain().factors()[2..]
            .iter()
            .fold(Mat4::IDENTITY, |acc, f| acc * *f);
        let p = local.transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), EPS));
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn render_uses_the_composed_chain() {
        let mut ctx = HeadlessContext::new();
        let mut scene = lab(&mut ctx);
        scene.apply(&ControlEvent::NudgeTranslation(Vec3::new(0.0, 0.5, 0.0)));
        scene.apply(&ControlEvent::NudgeXAngle(15.0));
        scene.render(&mut ctx).unwrap();

        let expected = scene.chain().compose();
        assert!(!ctx.draws().is_empty());
        assert!(ctx.draws().iter().all(|d| d.to_clip() == Some(expected)));
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn reset_zeroes_every_control() {
        let mut ctx = HeadlessContext::new();
        let mut scene = lab(&mut ctx);
        scene.apply(&ControlEvent::Drag { dx: 3.0, dy: 4.0 });
        scene.apply(&ControlEvent::SetXAngle(33.0));
        scene.apply(&ControlEvent::SetTranslation(Vec3::ONE));
        scene.apply(&ControlEvent::Reset);

        assert_eq!(scene.x_angle(), 0.0);
        assert_eq!(scene.translation(), Vec3::ZERO);
        let config = TransformLabConfig::default();
        assert_eq!(scene.chain().compose(), config.projection * config.camera);
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn starts_paused() {
        let mut ctx = HeadlessContext::new();
        let mut scene = lab(&mut ctx);
        assert!(!scene.animate_active());
        scene.teardown(&mut ctx).unwrap();
    }
}
