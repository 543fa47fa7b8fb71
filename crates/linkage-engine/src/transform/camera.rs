use glam::{Mat4, Vec3};

/// Right-handed view matrix looking from `eye` toward `center`.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, center, up)
}

/// Orthographic projection onto wgpu clip space (depth 0..1).
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh(left, right, bottom, top, near, far)
}

/// Camera on a sphere of `distance` around the origin, placed by a yaw
/// `angle_x` and pitch `angle_y` (radians), looking at the origin.
pub fn orbit(angle_x: f32, angle_y: f32, distance: f32) -> Mat4 {
    let dir = Vec3::new(angle_x.sin(), angle_y.sin(), angle_x.cos());
    let eye = dir.try_normalize().unwrap_or(Vec3::Z) * distance;
    look_at(eye, Vec3::ZERO, Vec3::Y)
}

/// Axis-aligned orthographic view volume in camera space.
///
/// The camera looks down -z, so the volume spans `-far..=-near` on z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewVolume {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
            top: 5.0,
            near: 0.0,
            far: 10.0,
        }
    }
}

impl ViewVolume {
    pub fn projection(&self) -> Mat4 {
        orthographic(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    /// Half-extents of the volume.
    pub fn half_size(&self) -> Vec3 {
        Vec3::new(
            (self.right - self.left) / 2.0,
            (self.top - self.bottom) / 2.0,
            (self.far - self.near) / 2.0,
        )
    }

    /// Maps the cube spanning -1..1 onto the volume (`translate * scale`).
    pub fn outline_transform(&self) -> Mat4 {
        let s = self.half_size();
        let t = Vec3::new(self.right - s.x, self.top - s.y, -(self.near + s.z));
        Mat4::from_translation(t) * Mat4::from_scale(s)
    }

    /// Scales every side by `factor` about the camera.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
            top: self.top * factor,
            near: self.near * factor,
            far: self.far * factor,
        }
    }

    /// True when every extent is non-degenerate.
    pub fn is_valid(&self) -> bool {
        self.right > self.left && self.top > self.bottom && self.far > self.near
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn look_at_puts_center_on_negative_z() {
        let view = look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), EPS));
    }

    #[test]
    fn orthographic_maps_corners_to_clip_bounds() {
        let p = orthographic(-13.0, 13.0, -8.0, 18.0, -15.0, 35.0);
        let near_corner = p.project_point3(Vec3::new(-13.0, -8.0, 15.0));
        let far_corner = p.project_point3(Vec3::new(13.0, 18.0, -35.0));
        assert!(near_corner.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), EPS));
        assert!(far_corner.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), EPS));
    }

    #[test]
    fn outline_spans_the_volume() {
        let v = ViewVolume::default();
        let m = v.outline_transform();
        let lo = m.transform_point3(Vec3::NEG_ONE);
        let hi = m.transform_point3(Vec3::ONE);
        assert!(lo.abs_diff_eq(Vec3::new(-5.0, -5.0, -10.0), EPS));
        assert!(hi.abs_diff_eq(Vec3::new(5.0, 5.0, 0.0), EPS));
    }

    #[test]
    fn outline_lands_in_the_projection_cube() {
        let v = ViewVolume {
            left: -2.0,
            right: 6.0,
            bottom: 1.0,
            top: 3.0,
            near: 1.0,
            far: 9.0,
        };
        let to_clip = v.projection() * v.outline_transform();
        let lo = to_clip.project_point3(Vec3::new(-1.0, -1.0, 1.0));
        let hi = to_clip.project_point3(Vec3::new(1.0, 1.0, -1.0));
        assert!(lo.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), EPS));
        assert!(hi.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), EPS));
    }

    #[test]
    fn orbit_keeps_distance() {
        let view = orbit(20f32.to_radians(), 10f32.to_radians(), 10.0);
        let eye = view.inverse().transform_point3(Vec3::ZERO);
        assert!((eye.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn scaled_volume_validity() {
        assert!(ViewVolume::default().scaled(2.0).is_valid());
        assert!(!ViewVolume::default().scaled(-1.0).is_valid());
    }
}
