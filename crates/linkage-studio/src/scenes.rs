use std::fmt;
use std::str::FromStr;

use linkage_engine::error::SceneError;
use linkage_engine::geometry::primitives;
use linkage_engine::gfx::RenderContext;
use linkage_engine::render::ShadingMode;
use linkage_engine::scene::{
    ArticulatedConfig, ArticulatedScene, GalleryConfig, GalleryScene, OrthoVolumeConfig,
    OrthoView, OrthoVolumeScene, Scene, TransformLabConfig, TransformLabScene,
};

/// Scenes the studio can open, selected by the first command-line argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SceneChoice {
    #[default]
    Robot,
    Gallery,
    Lit,
    Transform,
    Ortho,
    /// The ortho scene seen through its own camera volume.
    Preview,
}

impl SceneChoice {
    pub const ALL: [SceneChoice; 6] = [
        SceneChoice::Robot,
        SceneChoice::Gallery,
        SceneChoice::Lit,
        SceneChoice::Transform,
        SceneChoice::Ortho,
        SceneChoice::Preview,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            SceneChoice::Robot => "robot",
            SceneChoice::Gallery => "gallery",
            SceneChoice::Lit => "lit",
            SceneChoice::Transform => "transform",
            SceneChoice::Ortho => "ortho",
            SceneChoice::Preview => "preview",
        }
    }

    /// Builds the chosen scene on `ctx`.
    pub fn build<C>(self, ctx: &mut C) -> Result<Box<dyn Scene>, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let catalog = primitives::standard_catalog();
        let scene: Box<dyn Scene> = match self {
            SceneChoice::Robot => Box::new(ArticulatedScene::new(
                ctx,
                &catalog,
                ArticulatedConfig::robot_arm(),
            )?),
            SceneChoice::Gallery => {
                Box::new(GalleryScene::new(ctx, &catalog, GalleryConfig::showcase())?)
            }
            SceneChoice::Lit => Box::new(GalleryScene::new(
                ctx,
                &catalog,
                GalleryConfig::showcase().with_shading(ShadingMode::ColoredLight),
            )?),
            SceneChoice::Transform => Box::new(TransformLabScene::new(
                ctx,
                &catalog,
                TransformLabConfig::default(),
            )?),
            SceneChoice::Ortho => Box::new(OrthoVolumeScene::new(
                ctx,
                &catalog,
                OrthoVolumeConfig::default(),
            )?),
            SceneChoice::Preview => Box::new(OrthoVolumeScene::new(
                ctx,
                &catalog,
                OrthoVolumeConfig::default().with_view(OrthoView::Preview),
            )?),
        };
        Ok(scene)
    }
}

impl fmt::Display for SceneChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for SceneChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.keyword() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|c| c.keyword()).collect();
                anyhow::anyhow!("unknown scene `{s}` (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_engine::gfx::HeadlessContext;

    #[test]
    fn keywords_parse_back() {
        for choice in SceneChoice::ALL {
            assert_eq!(choice.keyword().parse::<SceneChoice>().unwrap(), choice);
        }
        assert_eq!(" Ortho ".parse::<SceneChoice>().unwrap(), SceneChoice::Ortho);
        assert!("teapot".parse::<SceneChoice>().is_err());
    }

    #[test]
    fn every_choice_builds_headless() {
        for choice in SceneChoice::ALL {
            let mut ctx = HeadlessContext::new();
            let mut scene = choice.build(&mut ctx).unwrap();
            scene.render(&mut ctx).unwrap();
            assert!(!ctx.draws().is_empty(), "{choice} drew nothing");
            scene.teardown(&mut ctx).unwrap();
            assert_eq!(ctx.live_buffer_count(), 0, "{choice} leaked buffers");
        }
    }

    #[test]
    fn preview_and_overview_share_the_ortho_scene() {
        let mut ctx = HeadlessContext::new();
        let mut overview = SceneChoice::Ortho.build(&mut ctx).unwrap();
        overview.render(&mut ctx).unwrap();
        let overview_draws = ctx.take_draws().len();
        overview.teardown(&mut ctx).unwrap();

        let mut preview = SceneChoice::Preview.build(&mut ctx).unwrap();
        preview.render(&mut ctx).unwrap();
        // No camera glyph (3 draws) and no outline (1 draw).
        assert_eq!(ctx.draws().len(), overview_draws - 4);
        preview.teardown(&mut ctx).unwrap();
    }
}
