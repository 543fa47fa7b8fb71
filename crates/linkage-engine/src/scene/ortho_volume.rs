use glam::{Mat4, Vec3};

use crate::error::SceneError;
use crate::geometry::primitives::names;
use crate::geometry::ModelCatalog;
use crate::gfx::RenderContext;
use crate::input::ControlEvent;
use crate::render::{Light, ShadingMode};
use crate::transform::{look_at, orbit, orthographic, translation, ViewVolume};

use super::{Scene, SceneCore, BACKGROUND};

/// What an `OrthoVolumeScene` shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OrthoView {
    /// The camera, its scene and the volume outline, seen from outside.
    #[default]
    Overview,
    /// The scene models as the visualized camera renders them.
    Preview,
}

impl OrthoView {
    pub fn toggled(self) -> Self {
        match self {
            OrthoView::Overview => OrthoView::Preview,
            OrthoView::Preview => OrthoView::Overview,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrthoVolumeConfig {
    pub name: String,
    /// Drawn at the origin of the overview.
    pub camera_models: Vec<String>,
    /// Drawn under the scene camera, once per placement.
    pub scene_models: Vec<String>,
    pub outline_model: String,
    /// Extra placements of the scene models besides the identity.
    pub placements: Vec<Vec3>,
    /// Camera whose orthographic volume is being visualized.
    pub scene_camera: Mat4,
    pub volume: ViewVolume,
    /// Projection of the overview camera.
    pub overview_projection: Mat4,
    pub overview_distance: f32,
    /// Radians.
    pub overview_angles: (f32, f32),
    pub view: OrthoView,
    pub clear_color: wgpu::Color,
}

impl Default for OrthoVolumeConfig {
    fn default() -> Self {
        Self {
            name: "ortho".to_string(),
            camera_models: vec![names::CAMERA.to_string()],
            scene_models: vec![names::BOX.to_string(), names::AXES.to_string()],
            outline_model: names::CUBE_OUTLINE.to_string(),
            placements: vec![Vec3::new(-2.0, -2.0, -4.0), Vec3::new(3.0, 3.0, 6.0)],
            scene_camera: look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y),
            volume: ViewVolume::default(),
            overview_projection: orthographic(-12.0, 12.0, -12.0, 12.0, -40.0, 40.0),
            overview_distance: 10.0,
            overview_angles: (20f32.to_radians(), 10f32.to_radians()),
            view: OrthoView::Overview,
            clear_color: BACKGROUND,
        }
    }
}

impl OrthoVolumeConfig {
    pub fn with_view(mut self, view: OrthoView) -> Self {
        self.view = view;
        self
    }
}

/// Overview of a camera and its orthographic view volume.
///
/// An orbiting overview camera shows the camera glyph at the origin, the
/// scene models placed in the camera's frame, and the outline of the view
/// volume. Models outside the outline are the ones the camera clips.
///
/// The preview view draws only the scene models, through the camera and its
/// current volume, which shows what survives the clipping.
#[derive(Debug)]
pub struct OrthoVolumeScene {
    core: SceneCore,
    camera_parts: Vec<usize>,
    scene_parts: Vec<usize>,
    outline: usize,
    placements: Vec<Mat4>,
    scene_camera: Mat4,
    volume: ViewVolume,
    initial_volume: ViewVolume,
    overview_projection: Mat4,
    overview_distance: f32,
    angles: (f32, f32),
    initial_angles: (f32, f32),
    view: OrthoView,
    clear_color: wgpu::Color,
}

struct Parts {
    camera: Vec<usize>,
    scene: Vec<usize>,
    outline: usize,
}

impl OrthoVolumeScene {
    pub fn new<C>(ctx: &mut C, catalog: &ModelCatalog, config: OrthoVolumeConfig) -> Result<Self, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let (core, parts) = SceneCore::assemble(ctx, config.name.clone(), false, |core, ctx| {
            let mut add = |model: &str| {
                core.add_part(ctx, catalog, model, ShadingMode::Flat, Light::default())
            };
            let camera = config
                .camera_models
                .iter()
                .map(|m| add(m))
                .collect::<Result<Vec<_>, _>>()?;
            let scene = config
                .scene_models
                .iter()
                .map(|m| add(m))
                .collect::<Result<Vec<_>, _>>()?;
            let outline = add(&config.outline_model)?;
            Ok(Parts {
                camera,
                scene,
                outline,
            })
        })?;

        let placements = std::iter::once(Mat4::IDENTITY)
            .chain(config.placements.iter().map(|p| translation(*p)))
            .collect();

        Ok(Self {
            core,
            camera_parts: parts.camera,
            scene_parts: parts.scene,
            outline: parts.outline,
            placements,
            scene_camera: config.scene_camera,
            volume: config.volume,
            initial_volume: config.volume,
            overview_projection: config.overview_projection,
            overview_distance: config.overview_distance,
            angles: config.overview_angles,
            initial_angles: config.overview_angles,
            view: config.view,
            clear_color: config.clear_color,
        })
    }

    pub fn volume(&self) -> ViewVolume {
        self.volume
    }

    /// Projection the visualized camera would render with.
    pub fn scene_projection(&self) -> Mat4 {
        self.volume.projection()
    }

    pub fn view(&self) -> OrthoView {
        self.view
    }

    /// `overview projection * overview camera`.
    pub fn overview(&self) -> Mat4 {
        let (ax, ay) = self.angles;
        self.overview_projection * orbit(ax, ay, self.overview_distance)
    }

    fn set_volume(&mut self, volume: ViewVolume) {
        if volume.is_valid() {
            self.volume = volume;
        } else {
            log::debug!("ignoring degenerate view volume {volume:?}");
        }
    }

    /// Scene models under `base`, once per placement.
    fn draw_placed(&self, ctx: &mut dyn RenderContext, base: &Mat4) -> Result<(), SceneError> {
        for placement in &self.placements {
            let to_clip = *base * *placement;
            for part in &self.scene_parts {
                self.core.draw(ctx, *part, &to_clip, None)?;
            }
        }
        Ok(())
    }
}

impl Scene for OrthoVolumeScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        self.core.ensure_live()?;
        if self.view == OrthoView::Preview {
            return self.draw_placed(ctx, &(self.scene_projection() * self.scene_camera));
        }

        let overview = self.overview();
        for part in &self.camera_parts {
            self.core.draw(ctx, *part, &overview, None)?;
        }
        self.draw_placed(ctx, &(overview * self.scene_camera))?;

        let outline = overview * self.volume.outline_transform();
        self.core.draw(ctx, self.outline, &outline, None)
    }

    fn control(&mut self, event: &ControlEvent) {
        match *event {
            ControlEvent::Drag { dx, dy } => {
                let limit = 89f32.to_radians();
                self.angles.0 += dx.to_radians();
                self.angles.1 = (self.angles.1 + dy.to_radians()).clamp(-limit, limit);
            }
            ControlEvent::SetViewVolume(volume) => self.set_volume(volume),
            ControlEvent::ScaleViewVolume(factor) => self.set_volume(self.volume.scaled(factor)),
            ControlEvent::ToggleView => {
                self.view = self.view.toggled();
                log::debug!("ortho view: {:?}", self.view);
            }
            ControlEvent::Reset => {
                self.volume = self.initial_volume;
                self.angles = self.initial_angles;
            }
            _ => {}
        }
    }

    /// Slowly orbits the overview camera.
    fn animate_step(&mut self) {
        self.angles.0 += 0.5f32.to_radians();
    }

    fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }
}
