//! Unit quaternions for camera orientation and node rotation.

use super::Vec3;

/// Quaternion stored as `[x, y, z, w]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle_rad: f64) -> Self {
        let Some(axis) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn from_rotation_y(angle_rad: f64) -> Self {
        Self::from_axis_angle(Vec3::Y, angle_rad)
    }

    /// Rotation taking unit vector `a` onto unit vector `b`.
    pub fn from_unit_vectors(a: Vec3, b: Vec3) -> Self {
        let dot = a.dot(b).clamp(-1.0, 1.0);

        // Nearly opposite: any orthogonal axis works.
        if dot < -0.999_999 {
            let mut axis = Vec3::X.cross(a);
            if axis.dot(axis) < 1e-12 {
                axis = Vec3::Y.cross(a);
            }
            let axis = axis.normalize_or_self();
            return Self::new(axis.x, axis.y, axis.z, 0.0);
        }
        if dot > 0.999_999 {
            return Self::IDENTITY;
        }

        let axis = a.cross(b);
        Self::new(axis.x, axis.y, axis.z, 1.0 + dot).normalize()
    }

    /// Hamilton product `self * other`.
    pub fn mul(self, b: Quat) -> Quat {
        let a = self;
        Quat::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    pub fn normalize(self) -> Quat {
        let n = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if n > 1e-10 {
            Quat::new(self.x / n, self.y / n, self.z / n, self.w / n)
        } else {
            Quat::IDENTITY
        }
    }

    /// Inverse for unit quaternions.
    pub fn conjugate(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v).scale(2.0);
        v + t.scale(self.w) + qv.cross(t)
    }

    /// Rotation angle in radians.
    pub fn angle(self) -> f64 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// Spherical interpolation along the shorter arc.
    pub fn slerp(self, other: Quat, t: f64) -> Quat {
        let a = self;
        let mut b = other;
        let mut dot = a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w;
        if dot < 0.0 {
            b = Quat::new(-b.x, -b.y, -b.z, -b.w);
            dot = -dot;
        }

        if dot > 0.9995 {
            return Quat::new(
                a.x + t * (b.x - a.x),
                a.y + t * (b.y - a.y),
                a.z + t * (b.z - a.z),
                a.w + t * (b.w - a.w),
            )
            .normalize();
        }

        let theta_0 = dot.clamp(-1.0, 1.0).acos();
        let theta = theta_0 * t;
        let s1 = theta.sin() / theta_0.sin();
        let s0 = theta.cos() - dot * s1;
        Quat::new(
            s0 * a.x + s1 * b.x,
            s0 * a.y + s1 * b.y,
            s0 * a.z + s1 * b.z,
            s0 * a.w + s1 * b.w,
        )
    }
}
