use foundation::math::{Quat, Vec3};

/// Local transform: uniform scale, then rotation, then translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn translate(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn rotate(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.translation + self.rotation.rotate(p.scale(self.scale))
    }

    pub fn inverse_point(&self, p: Vec3) -> Vec3 {
        self.rotation
            .conjugate()
            .rotate(p - self.translation)
            .scale(1.0 / self.scale)
    }

    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(v).scale(1.0 / self.scale)
    }

    /// `self` applied after `child`: the world transform of a child node.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.apply_point(child.translation),
            rotation: self.rotation.mul(child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }
}
