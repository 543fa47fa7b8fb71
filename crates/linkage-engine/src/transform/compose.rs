use glam::{Mat4, Vec3};

/// Product of `factors` in order: `factors[0] * factors[1] * … * factors[n-1]`.
///
/// Projection goes first and object-local factors last, so the rightmost
/// factor is applied to a vertex first. An empty list yields the identity.
pub fn compose<'a>(factors: impl IntoIterator<Item = &'a Mat4>) -> Mat4 {
    factors
        .into_iter()
        .fold(Mat4::IDENTITY, |acc, factor| acc * *factor)
}

/// Rotation of `degrees` about `axis`.
///
/// A zero angle or zero axis yields the exact identity.
pub fn rotation(axis: Vec3, degrees: f32) -> Mat4 {
    if degrees == 0.0 {
        return Mat4::IDENTITY;
    }
    match axis.try_normalize() {
        Some(axis) => Mat4::from_axis_angle(axis, degrees.to_radians()),
        None => Mat4::IDENTITY,
    }
}

/// Translation by `offset`; a zero offset yields the exact identity.
pub fn translation(offset: Vec3) -> Mat4 {
    if offset == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_translation(offset)
}

/// Ordered matrix factors for one part, rebuilt every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChain {
    factors: Vec<Mat4>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a factor on the right (applied to vertices before the others).
    pub fn then(mut self, factor: Mat4) -> Self {
        self.factors.push(factor);
        self
    }

    pub fn push(&mut self, factor: Mat4) {
        self.factors.push(factor);
    }

    pub fn factors(&self) -> &[Mat4] {
        &self.factors
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn compose(&self) -> Mat4 {
        compose(&self.factors)
    }
}

impl FromIterator<Mat4> for TransformChain {
    fn from_iter<I: IntoIterator<Item = Mat4>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn empty_chain_is_identity() {
        assert_eq!(compose(&[]), Mat4::IDENTITY);
        assert_eq!(TransformChain::new().compose(), Mat4::IDENTITY);
    }

    #[test]
    fn single_factor_is_itself() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(compose([&m]), m);
    }

    #[test]
    fn product_is_left_to_right() {
        let t = translation(Vec3::new(1.0, 0.0, 0.0));
        let r = rotation(Vec3::Z, 90.0);

        // T * R: rotate first, then translate.
        let p = compose([&t, &r]).transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), EPS));

        // R * T: translate first, then rotate.
        let q = compose([&r, &t]).transform_point3(Vec3::X);
        assert!(q.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn zero_angle_and_offset_are_exact_identity() {
        assert_eq!(rotation(Vec3::Y, 0.0), Mat4::IDENTITY);
        assert_eq!(rotation(Vec3::ZERO, 45.0), Mat4::IDENTITY);
        assert_eq!(translation(Vec3::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn full_turn_is_identity() {
        let r = rotation(Vec3::new(1.0, 1.0, 0.0), 360.0);
        assert!(r.abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn chain_builder_matches_compose() {
        let chain = TransformChain::new()
            .then(Mat4::from_scale(Vec3::splat(2.0)))
            .then(translation(Vec3::Y));
        assert_eq!(chain.len(), 2);
        let p = chain.compose().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPS));
    }
}
