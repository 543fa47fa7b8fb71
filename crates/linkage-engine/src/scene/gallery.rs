use glam::{Mat4, Vec3};

use crate::error::SceneError;
use crate::geometry::primitives::names;
use crate::geometry::ModelCatalog;
use crate::gfx::RenderContext;
use crate::input::ControlEvent;
use crate::render::{Light, ShadingMode};
use crate::transform::{compose, look_at, orthographic, rotation};

use super::{Scene, SceneCore, BACKGROUND};

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub name: String,
    /// Catalog keys, drawn in this order.
    pub models: Vec<String>,
    pub shading: ShadingMode,
    /// Fixed light for colored-light shading, in camera space.
    pub light: Light,
    pub projection: Mat4,
    pub camera: Mat4,
    pub animate: bool,
    pub clear_color: wgpu::Color,
}

impl GalleryConfig {
    pub fn new(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: "gallery".to_string(),
            models: models.into_iter().map(Into::into).collect(),
            shading: ShadingMode::Flat,
            light: Light {
                position: Vec3::new(3.0, 3.0, 5.0),
                color: Vec3::ONE,
            },
            projection: orthographic(-4.0, 4.0, -4.0, 4.0, -8.0, 8.0),
            camera: look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y),
            animate: true,
            clear_color: BACKGROUND,
        }
    }

    /// Box, axes and point grid together.
    pub fn showcase() -> Self {
        Self::new([names::BOX, names::AXES, names::GRID])
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }
}

/// Models spun together under `projection * camera * Rx(angle_x) * Ry(angle_y)`.
#[derive(Debug)]
pub struct GalleryScene {
    core: SceneCore,
    parts: Vec<usize>,
    projection: Mat4,
    camera: Mat4,
    /// Degrees.
    angle_x: f32,
    angle_y: f32,
    clear_color: wgpu::Color,
}

impl GalleryScene {
    pub fn new<C>(ctx: &mut C, catalog: &ModelCatalog, config: GalleryConfig) -> Result<Self, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let GalleryConfig {
            name,
            models,
            shading,
            light,
            projection,
            camera,
            animate,
            clear_color,
        } = config;

        let (core, parts) = SceneCore::assemble(ctx, name, animate, |core, ctx| {
            models
                .iter()
                .map(|model| core.add_part(ctx, catalog, model, shading, light))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Self {
            core,
            parts,
            projection,
            camera,
            angle_x: 0.0,
            angle_y: 0.0,
            clear_color,
        })
    }

    pub fn angles(&self) -> (f32, f32) {
        (self.angle_x, self.angle_y)
    }

    /// `Rx(angle_x) * Ry(angle_y)`.
    pub fn model_matrix(&self) -> Mat4 {
        rotation(Vec3::X, self.angle_x) * rotation(Vec3::Y, self.angle_y)
    }
}

impl Scene for GalleryScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        self.core.ensure_live()?;
        let model = self.model_matrix();
        let to_camera = self.camera * model;
        let to_clip = compose(&[self.projection, self.camera, model]);
        for part in &self.parts {
            self.core.draw(ctx, *part, &to_clip, Some(&to_camera))?;
        }
        Ok(())
    }

    fn control(&mut self, event: &ControlEvent) {
        match *event {
            ControlEvent::Drag { dx, dy } => {
                self.angle_x -= dy;
                self.angle_y += dx;
            }
            ControlEvent::Reset => {
                self.angle_x = 0.0;
                self.angle_y = 0.0;
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

    fn gallery(ctx: &mut HeadlessContext, config: GalleryConfig) -> GalleryScene {
        GalleryScene::new(ctx, &primitives::standard_catalog(), config).unwrap()
    }

    #[test]
    fn every_model_shares_one_matrix() {
        let mut ctx = HeadlessContext::new();
        let mut scene = gallery(&mut ctx, GalleryConfig::showcase());
        scene.apply(&ControlEvent::Drag { dx: 20.0, dy: 10.0 });
        scene.render(&mut ctx).unwrap();

        let config = GalleryConfig::showcase();
        let expected = config.projection
            * config.camera
            * Mat4::from_rotation_x((-10f32).to_radians())
            * Mat4::from_rotation_y(20f32.to_radians());

        // outlined box: three groups; axes: lines; grid: points
        assert_eq!(ctx.draws().len(), 5);
        for draw in ctx.draws() {
            assert!(draw.to_clip().unwrap().abs_diff_eq(expected, EPS));
        }
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn animation_step_matches_drag_convention() {
        let mut ctx = HeadlessContext::new();
        let mut scene = gallery(&mut ctx, GalleryConfig::showcase());
        scene.animate_step();
        scene.animate_step();
        assert_eq!(scene.angles(), (-1.0, 2.0));
        scene.apply(&ControlEvent::Reset);
        assert_eq!(scene.angles(), (0.0, 0.0));
        assert_eq!(scene.model_matrix(), Mat4::IDENTITY);
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn colored_light_gallery_sets_light_uniforms() {
        let mut ctx = HeadlessContext::new();
        let config = GalleryConfig::new([names::BOX]).with_shading(ShadingMode::ColoredLight);
        let light = config.light;
        let mut scene = gallery(&mut ctx, config);
        scene.render(&mut ctx).unwrap();

        let draw = &ctx.draws()[0];
        assert_eq!(draw.vector("light_position"), Some(light.position));
        assert_eq!(draw.vector("light_color"), Some(light.color));
        assert!(draw.matrix("to_camera_space").is_some());
        scene.teardown(&mut ctx).unwrap();
    }

    #[test]
    fn empty_gallery_renders_nothing() {
        let mut ctx = HeadlessContext::new();
        let mut scene = gallery(&mut ctx, GalleryConfig::new(Vec::<String>::new()));
        scene.render(&mut ctx).unwrap();
        assert!(ctx.draws().is_empty());
        scene.teardown(&mut ctx).unwrap();
        assert_eq!(ctx.stats().programs_compiled, 0);
    }
}
