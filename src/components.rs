//=========================================================================
// Components
//=========================================================================
//
// Plain data shared by the render and visual systems.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Mat4, Vec2, Vec3, Vec4};

//=== Transform2D =========================================================

/// Position on the ground plane (X right, Y toward the viewer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    /// Radians, counter-clockwise around +Z.
    pub rotation: f32,
    pub scale: Vec2,
    /// Pivot in local units; rotation and scale happen around it.
    pub origin: Vec2,
}

impl Transform2D {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// The 2D affine transform embedded in a 4x4 matrix (Z untouched).
    pub fn matrix(&self) -> Mat4 {
        self.matrix_at_height(0.0)
    }

    /// Same as [`Transform2D::matrix`] with the translation lifted to `z`.
    pub fn matrix_at_height(&self, z: f32) -> Mat4 {
        Mat4::from_translation(self.position.extend(z))
            * Mat4::from_rotation_z(self.rotation)
            * Mat4::from_scale(self.scale.extend(1.0))
            * Mat4::from_translation(Vec3::new(-self.origin.x, -self.origin.y, 0.0))
    }

    /// Unit vector the transform faces (+Y rotated by `rotation`).
    pub fn forward(&self) -> Vec2 {
        Vec2::new(-self.rotation.sin(), self.rotation.cos())
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
        }
    }
}

//=== Sprite ==============================================================

/// Textured quad. `texture` names an asset; loading it is the renderer's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: String,
    pub size: Vec2,
    /// RGBA multiplier; alpha drives fades.
    pub tint: Vec4,
}

impl Sprite {
    pub fn new(texture: impl Into<String>, size: Vec2) -> Self {
        Self {
            texture: texture.into(),
            size,
            tint: Vec4::ONE,
        }
    }

    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint;
        self
    }

    pub fn alpha(&self) -> f32 {
        self.tint.w
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.tint.w = alpha.clamp(0.0, 1.0);
    }
}

//=== Text ================================================================

/// Screen-space label used by the menus.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    /// Pixels from the top-left corner.
    pub position: Vec2,
    pub size: f32,
    pub color: Vec4,
}

impl Text {
    pub const WHITE: Vec4 = Vec4::ONE;
    pub const HIGHLIGHT: Vec4 = Vec4::new(1.0, 0.8, 0.2, 1.0);

    pub fn new(content: impl Into<String>, position: Vec2, size: f32) -> Self {
        Self {
            content: content.into(),
            position,
            size,
            color: Self::WHITE,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn origin_is_the_pivot() {
        let transform = Transform2D::at(Vec2::new(10.0, 5.0))
            .with_origin(Vec2::new(1.0, 1.0))
            .with_rotation(FRAC_PI_2);

        // The pivot lands exactly on the position.
        let pivot = transform.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!(close(pivot, Vec3::new(10.0, 5.0, 0.0)));

        // One unit right of the pivot rotates to one unit up.
        let right = transform.matrix().transform_point3(Vec3::new(2.0, 1.0, 0.0));
        assert!(close(right, Vec3::new(10.0, 6.0, 0.0)));
    }

    #[test]
    fn scale_applies_before_translation() {
        let transform = Transform2D::at(Vec2::new(3.0, 0.0)).with_scale(Vec2::new(2.0, 4.0));
        let p = transform.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!(close(p, Vec3::new(5.0, 4.0, 0.0)));
    }

    #[test]
    fn height_only_moves_z() {
        let transform = Transform2D::at(Vec2::new(1.0, 2.0));
        let p = transform.matrix_at_height(3.0).transform_point3(Vec3::ZERO);
        assert!(close(p, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn forward_follows_rotation() {
        assert!((Transform2D::default().forward() - Vec2::Y).length() < 1e-6);
        let turned = Transform2D::default().with_rotation(FRAC_PI_2);
        assert!((turned.forward() - Vec2::new(-1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn alpha_is_clamped() {
        let mut sprite = Sprite::new("palm", Vec2::splat(2.0));
        sprite.set_alpha(1.7);
        assert_eq!(sprite.alpha(), 1.0);
        sprite.set_alpha(-0.2);
        assert_eq!(sprite.alpha(), 0.0);
    }
}
