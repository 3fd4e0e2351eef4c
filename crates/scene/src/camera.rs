use foundation::bounds::ScreenRect;
use foundation::math::Vec3;

use crate::picking::Ray;

/// Right-handed perspective camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

/// A point projected into viewport pixels, with view-space depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    pub x_px: f64,
    pub y_px: f64,
    pub depth: f64,
}

impl PerspectiveCamera {
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov_y_rad: f64, near: f64, far: f64) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            near,
            far,
        }
    }

    /// Orthonormal (forward, right, up) basis.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or_self();
        let mut right = forward.cross(self.up);
        if right.dot(right) < 1e-12 {
            right = forward.cross(Vec3::Z);
        }
        let right = right.normalize_or_self();
        let up = right.cross(forward);
        (forward, right, up)
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: [f64; 2], aspect: f64) -> Ray {
        let (forward, right, up) = self.basis();
        let tan_half = (0.5 * self.fov_y_rad).tan();
        let dir = forward
            + right.scale(ndc[0] * tan_half * aspect)
            + up.scale(ndc[1] * tan_half);
        Ray::new(self.eye, dir.normalize_or_self())
    }

    /// Ray under a viewport pixel, using the surface's bounding rect.
    pub fn ray_from_viewport(&self, x_px: f64, y_px: f64, rect: &ScreenRect) -> Option<Ray> {
        let ndc = rect.to_ndc(x_px, y_px)?;
        Some(self.ray_from_ndc(ndc, rect.aspect()))
    }

    /// Projects a world point to pixels relative to the surface's top-left corner.
    ///
    /// Returns `None` for points outside the near/far range.
    pub fn project(&self, p: Vec3, width: f64, height: f64) -> Option<Projected> {
        let (forward, right, up) = self.basis();
        let v = p - self.eye;
        let depth = v.dot(forward);
        if depth < self.near || depth > self.far {
            return None;
        }
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        let tan_half = (0.5 * self.fov_y_rad).tan();
        let x_ndc = v.dot(right) / (depth * tan_half * aspect);
        let y_ndc = v.dot(up) / (depth * tan_half);
        Some(Projected {
            x_px: (x_ndc + 1.0) * 0.5 * width,
            y_px: (1.0 - y_ndc) * 0.5 * height,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::bounds::ScreenRect;
    use foundation::math::Vec3;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::look_at(
            Vec3::new(0.0, 0.0, 250.0),
            Vec3::ZERO,
            Vec3::Y,
            60f64.to_radians(),
            0.1,
            1000.0,
        )
    }

    #[test]
    fn centre_pixel_looks_at_target() {
        let rect = ScreenRect::new(0.0, 0.0, 800.0, 600.0);
        let ray = camera()
            .ray_from_viewport(400.0, 300.0, &rect)
            .expect("ray");
        assert!((ray.dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn project_inverts_ray_from_viewport() {
        let cam = camera();
        let rect = ScreenRect::new(0.0, 0.0, 800.0, 600.0);
        let ray = cam.ray_from_viewport(620.0, 140.0, &rect).expect("ray");
        let point = ray.origin + ray.dir.scale(200.0);
        let p = cam.project(point, 800.0, 600.0).expect("in front");
        assert!((p.x_px - 620.0).abs() < 1e-6);
        assert!((p.y_px - 140.0).abs() < 1e-6);
    }

    #[test]
    fn points_behind_camera_are_rejected() {
        assert!(camera().project(Vec3::new(0.0, 0.0, 300.0), 800.0, 600.0).is_none());
    }
}
