//! Procedural models.
//!
//! Every builder returns a validated `Model`; the arrays are generated so the
//! attribute lengths always agree, which is why these do not return `Result`.

use glam::Vec3;

use super::model::{Model, ModelCatalog, PrimitiveGroup};

pub type Rgb = [f32; 3];

pub const RED: Rgb = [0.9, 0.2, 0.2];
pub const GREEN: Rgb = [0.2, 0.8, 0.3];
pub const BLUE: Rgb = [0.2, 0.35, 0.9];
pub const GRAY: Rgb = [0.55, 0.55, 0.6];
pub const ORANGE: Rgb = [0.95, 0.6, 0.15];
pub const BLACK: Rgb = [0.0, 0.0, 0.0];

/// Catalog keys of the bundled models.
pub mod names {
    pub const BASE: &str = "base";
    pub const FOREARM: &str = "forearm";
    pub const UPPERARM: &str = "upperarm";
    pub const BOX: &str = "box";
    pub const AXES: &str = "axes";
    pub const GRID: &str = "grid";
    pub const CUBE_OUTLINE: &str = "cube_outline";
    pub const CAMERA: &str = "camera";
}

// Corner indices of an axis-aligned box, bit 0 = x, bit 1 = y, bit 2 = z.
const BOX_FACES: [([usize; 4], [f32; 3]); 6] = [
    ([0, 2, 6, 4], [-1.0, 0.0, 0.0]),
    ([1, 5, 7, 3], [1.0, 0.0, 0.0]),
    ([0, 4, 5, 1], [0.0, -1.0, 0.0]),
    ([2, 3, 7, 6], [0.0, 1.0, 0.0]),
    ([0, 1, 3, 2], [0.0, 0.0, -1.0]),
    ([4, 6, 7, 5], [0.0, 0.0, 1.0]),
];

const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

fn corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    std::array::from_fn(|i| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    })
}

fn push(dst: &mut Vec<f32>, v: impl Into<[f32; 3]>) {
    dst.extend_from_slice(&v.into());
}

fn solid(name: &str, groups: impl IntoIterator<Item = PrimitiveGroup>) -> Model {
    match Model::new(name, groups) {
        Ok(model) => model,
        // Builders only produce parallel arrays.
        Err(err) => unreachable!("procedural model is malformed: {err}"),
    }
}

/// Solid axis-aligned box between `min` and `max`, with flat face normals.
pub fn box_model(name: &str, min: Vec3, max: Vec3, color: Rgb) -> Model {
    let c = corners(min, max);
    let mut positions = Vec::with_capacity(6 * 6 * 3);
    let mut normals = Vec::with_capacity(6 * 6 * 3);

    for (quad, normal) in BOX_FACES {
        for i in [0, 1, 2, 0, 2, 3] {
            push(&mut positions, c[quad[i]]);
            push(&mut normals, normal);
        }
    }
    let colors = color.repeat(positions.len() / 3);

    solid(
        name,
        [PrimitiveGroup::triangles(positions)
            .with_normals(normals)
            .with_colors(colors)],
    )
}

/// Box with its edges drawn as lines and its corners as points.
pub fn outlined_box_model(name: &str, min: Vec3, max: Vec3, color: Rgb, edge: Rgb) -> Model {
    let solid_box = box_model(name, min, max, color);
    let c = corners(min, max);

    let mut edges = Vec::with_capacity(BOX_EDGES.len() * 6);
    for (a, b) in BOX_EDGES {
        push(&mut edges, c[a]);
        push(&mut edges, c[b]);
    }
    let mut points = Vec::with_capacity(8 * 3);
    for corner in c {
        push(&mut points, corner);
    }

    let edge_colors = edge.repeat(edges.len() / 3);
    let point_colors = edge.repeat(8);
    let triangles = solid_box.groups().cloned();

    solid(
        name,
        triangles.chain([
            PrimitiveGroup::lines(edges).with_colors(edge_colors),
            PrimitiveGroup::points(points).with_colors(point_colors),
        ]),
    )
}

/// Three colored axis lines from the origin: x red, y green, z blue.
pub fn axes_model(name: &str, length: f32) -> Model {
    let mut positions = Vec::with_capacity(18);
    let mut colors = Vec::with_capacity(18);
    for (axis, color) in [(Vec3::X, RED), (Vec3::Y, GREEN), (Vec3::Z, BLUE)] {
        push(&mut positions, Vec3::ZERO);
        push(&mut positions, axis * length);
        colors.extend_from_slice(&color);
        colors.extend_from_slice(&color);
    }
    solid(name, [PrimitiveGroup::lines(positions).with_colors(colors)])
}

/// `n` x `n` points spaced `spacing` apart in the y = 0 plane, centered.
pub fn point_grid(name: &str, n: usize, spacing: f32, color: Rgb) -> Model {
    let half = (n.saturating_sub(1)) as f32 * spacing * 0.5;
    let mut positions = Vec::with_capacity(n * n * 3);
    for i in 0..n {
        for j in 0..n {
            push(
                &mut positions,
                Vec3::new(i as f32 * spacing - half, 0.0, j as f32 * spacing - half),
            );
        }
    }
    let colors = color.repeat(n * n);
    solid(name, [PrimitiveGroup::points(positions).with_colors(colors)])
}

/// Edges of the cube spanning -1..1 on every axis.
pub fn unit_cube_outline(name: &str, color: Rgb) -> Model {
    let c = corners(Vec3::NEG_ONE, Vec3::ONE);
    let mut positions = Vec::with_capacity(BOX_EDGES.len() * 6);
    for (a, b) in BOX_EDGES {
        push(&mut positions, c[a]);
        push(&mut positions, c[b]);
    }
    let colors = color.repeat(positions.len() / 3);
    solid(name, [PrimitiveGroup::lines(positions).with_colors(colors)])
}

/// Small camera glyph at the origin looking down -z: a body box, a lens
/// pyramid drawn as lines and a point at the eye.
pub fn camera_marker(name: &str) -> Model {
    let body = box_model(name, Vec3::new(-0.3, -0.2, 0.0), Vec3::new(0.3, 0.2, 0.6), GRAY);

    let apex = Vec3::ZERO;
    let rim = [
        Vec3::new(-0.25, -0.2, -0.5),
        Vec3::new(0.25, -0.2, -0.5),
        Vec3::new(0.25, 0.2, -0.5),
        Vec3::new(-0.25, 0.2, -0.5),
    ];
    let mut lines = Vec::with_capacity(8 * 6);
    for (i, corner) in rim.iter().enumerate() {
        push(&mut lines, apex);
        push(&mut lines, *corner);
        push(&mut lines, *corner);
        push(&mut lines, rim[(i + 1) % rim.len()]);
    }
    let line_colors = BLACK.repeat(lines.len() / 3);

    solid(
        name,
        body.groups().cloned().chain([
            PrimitiveGroup::lines(lines).with_colors(line_colors),
            PrimitiveGroup::points(apex.to_array().to_vec()).with_colors(ORANGE.to_vec()),
        ]),
    )
}

/// Robot arm base: 6 x 2 x 6 block resting on y = 0.
pub fn robot_base(name: &str) -> Model {
    outlined_box_model(name, Vec3::new(-3.0, 0.0, -3.0), Vec3::new(3.0, 2.0, 3.0), GRAY, BLACK)
}

/// Robot forearm: 8 units tall, pivoting at its bottom face.
pub fn robot_forearm(name: &str) -> Model {
    outlined_box_model(name, Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 8.0, 1.0), ORANGE, BLACK)
}

/// Robot upper arm: 6 units tall, pivoting at its bottom face.
pub fn robot_upperarm(name: &str) -> Model {
    outlined_box_model(
        name,
        Vec3::new(-0.75, 0.0, -0.75),
        Vec3::new(0.75, 6.0, 0.75),
        BLUE,
        BLACK,
    )
}

/// Catalog with every bundled model under the keys in [`names`].
pub fn standard_catalog() -> ModelCatalog {
    ModelCatalog::new()
        .with(robot_base(names::BASE))
        .with(robot_forearm(names::FOREARM))
        .with(robot_upperarm(names::UPPERARM))
        .with(outlined_box_model(names::BOX, Vec3::splat(-1.0), Vec3::splat(1.0), RED, BLACK))
        .with(axes_model(names::AXES, 3.0))
        .with(point_grid(names::GRID, 9, 0.5, BLUE))
        .with(unit_cube_outline(names::CUBE_OUTLINE, BLACK))
        .with(camera_marker(names::CAMERA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::PrimitiveKind;

    #[test]
    fn box_has_twelve_triangles_with_unit_normals() {
        let model = box_model("b", Vec3::ZERO, Vec3::ONE, RED);
        assert_eq!(model.element_count(PrimitiveKind::Triangles), 36);
        let normals = model.group(PrimitiveKind::Triangles).unwrap().normals().unwrap();
        for n in normals.chunks_exact(3) {
            assert!((Vec3::from_slice(n).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn outlined_box_has_all_three_groups() {
        let model = outlined_box_model("b", Vec3::ZERO, Vec3::ONE, RED, BLACK);
        assert_eq!(model.element_count(PrimitiveKind::Lines), 24);
        assert_eq!(model.element_count(PrimitiveKind::Points), 8);
        assert_eq!(model.groups().count(), 3);
    }

    #[test]
    fn cube_outline_spans_unit_cube() {
        let model = unit_cube_outline("c", BLACK);
        let pos = model.group(PrimitiveKind::Lines).unwrap().positions();
        assert!(pos.iter().all(|v| v.abs() == 1.0));
        assert_eq!(model.element_count(PrimitiveKind::Lines), 24);
    }

    #[test]
    fn grid_is_centered() {
        let model = point_grid("g", 3, 1.0, BLUE);
        let pos = model.group(PrimitiveKind::Points).unwrap().positions();
        assert_eq!(&pos[..3], &[-1.0, 0.0, -1.0]);
        assert_eq!(&pos[pos.len() - 3..], &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn standard_catalog_holds_robot_parts() {
        let catalog = standard_catalog();
        for key in [names::BASE, names::FOREARM, names::UPPERARM, names::CAMERA] {
            assert!(catalog.contains(key), "missing {key}");
        }
    }
}
