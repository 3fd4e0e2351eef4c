use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;
use scene::camera::PerspectiveCamera;
use scene::entity::EntityId;
use scene::world::World;
use tracing::trace;

/// One projected triangle, ready to be filled on a 2D surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenTriangle {
    pub entity: EntityId,
    /// Pixel positions relative to the surface's top-left corner.
    pub points: [[f64; 2]; 3],
    /// Mean view-space depth of the vertices.
    pub depth: f64,
    pub color: [f32; 4],
}

/// Triangles sorted back-to-front for painter's-order drawing.
#[derive(Debug, Default)]
pub struct RenderFrame {
    pub triangles: Vec<ScreenTriangle>,
    pub culled: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Renderer {
    horizon_center: Option<Vec3>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops triangles facing away from the camera on a sphere centred at `center`.
    pub fn with_horizon_cull(mut self, center: Vec3) -> Self {
        self.horizon_center = Some(center);
        self
    }

    pub fn collect(&self, world: &World, camera: &PerspectiveCamera, width: f64, height: f64) -> RenderFrame {
        let mut frame = RenderFrame::default();
        if width <= 0.0 || height <= 0.0 {
            return frame;
        }

        for (entity, mesh) in world.visible_meshes() {
            let transform = world.world_transform(entity);
            let color = world.material(entity).color;
            if color[3] <= 0.0 {
                continue;
            }

            for i in 0..mesh.triangles().len() {
                let Some(local) = mesh.triangle(i) else {
                    continue;
                };
                let corners = local.map(|p| transform.apply_point(p));
                if self.beyond_horizon(camera.eye, &corners) {
                    frame.culled += 1;
                    continue;
                }
                let projected = corners.map(|p| camera.project(p, width, height));
                let [Some(a), Some(b), Some(c)] = projected else {
                    frame.culled += 1;
                    continue;
                };
                frame.triangles.push(ScreenTriangle {
                    entity,
                    points: [[a.x_px, a.y_px], [b.x_px, b.y_px], [c.x_px, c.y_px]],
                    depth: (a.depth + b.depth + c.depth) / 3.0,
                    color,
                });
            }
        }

        // Stable sort keeps scene order for equal depths.
        frame
            .triangles
            .sort_by(|a, b| stable_total_cmp_f64(b.depth, a.depth));
        trace!(
            triangles = frame.triangles.len(),
            culled = frame.culled,
            "render list collected"
        );
        frame
    }

    fn beyond_horizon(&self, eye: Vec3, corners: &[Vec3; 3]) -> bool {
        let Some(center) = self.horizon_center else {
            return false;
        };
        let c = (corners[0] + corners[1] + corners[2]).scale(1.0 / 3.0) - center;
        let to_eye = eye - center;
        // Visible when in front of the tangent plane through the centroid.
        c.dot(to_eye) < c.dot(c) - 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use foundation::math::Vec3;
    use scene::camera::PerspectiveCamera;
    use scene::components::{Material, Mesh, Transform, Visibility};
    use scene::world::World;

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

    fn quad(z: f64) -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-10.0, -10.0, z),
                Vec3::new(10.0, -10.0, z),
                Vec3::new(10.0, 10.0, z),
                Vec3::new(-10.0, 10.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn sorts_back_to_front() {
        let mut world = World::new();
        let near = world.spawn();
        world.set_mesh(near, quad(50.0));
        world.set_material(near, Material::new([1.0, 0.0, 0.0, 1.0]));
        let far = world.spawn();
        world.set_mesh(far, quad(-50.0));

        let frame = Renderer::new().collect(&world, &camera(), 800.0, 600.0);
        assert_eq!(frame.triangles.len(), 4);
        assert_eq!(frame.triangles[0].entity, far);
        assert_eq!(frame.triangles[3].entity, near);
        assert_eq!(frame.triangles[3].color, [1.0, 0.0, 0.0, 1.0]);
        assert!(frame.triangles[0].depth > frame.triangles[3].depth);
    }

    #[test]
    fn applies_parent_transforms_and_visibility() {
        let mut world = World::new();
        let root = world.spawn();
        world.set_transform(root, Transform::translate(Vec3::new(0.0, 0.0, -100.0)));
        let child = world.spawn_child(root);
        world.set_mesh(child, quad(0.0));

        let frame = Renderer::new().collect(&world, &camera(), 800.0, 600.0);
        assert!((frame.triangles[0].depth - 350.0).abs() < 1e-6);

        world.set_visibility(root, Visibility::hidden());
        assert!(Renderer::new().collect(&world, &camera(), 800.0, 600.0).triangles.is_empty());
    }

    #[test]
    fn culls_far_side_of_the_globe() {
        let mut world = World::new();
        let globe = world.spawn();
        world.set_mesh(globe, Mesh::uv_sphere(100.0, 16, 8));

        let all = Renderer::new().collect(&world, &camera(), 800.0, 600.0);
        let front = Renderer::new()
            .with_horizon_cull(Vec3::ZERO)
            .collect(&world, &camera(), 800.0, 600.0);
        assert!(front.culled > 0);
        assert!(front.triangles.len() < all.triangles.len());
        assert!(front.triangles.iter().all(|t| t.depth < 250.0));
    }

    #[test]
    fn skips_points_behind_the_near_plane() {
        let mut world = World::new();
        let behind = world.spawn();
        world.set_mesh(behind, quad(300.0));
        let frame = Renderer::new().collect(&world, &camera(), 800.0, 600.0);
        assert!(frame.triangles.is_empty());
        assert_eq!(frame.culled, 2);
    }
}
