use foundation::bounds::Aabb3;
use foundation::math::Vec3;

/// Indexed triangle mesh in node-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Option<Aabb3>,
}

impl Mesh {
    /// Triangles referencing vertices past the end of `positions` are dropped.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let n = positions.len() as u32;
        let triangles: Vec<[u32; 3]> = triangles
            .into_iter()
            .filter(|t| t.iter().all(|&i| i < n))
            .collect();
        let bounds = Aabb3::from_points(positions.iter().map(|p| p.as_array()));
        Self {
            positions,
            triangles,
            bounds,
        }
    }

    /// Latitude/longitude sphere centred on the origin.
    pub fn uv_sphere(radius: f64, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut positions = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for r in 0..=rings {
            let phi = std::f64::consts::PI * r as f64 / rings as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for s in 0..=segments {
                let theta = std::f64::consts::TAU * s as f64 / segments as f64;
                let (sin_theta, cos_theta) = theta.sin_cos();
                positions.push(Vec3::new(
                    radius * sin_phi * sin_theta,
                    radius * cos_phi,
                    radius * sin_phi * cos_theta,
                ));
            }
        }

        let stride = segments + 1;
        let mut triangles = Vec::with_capacity((segments * rings * 2) as usize);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * stride + s;
                let b = a + stride;
                if r != 0 {
                    triangles.push([a, b, a + 1]);
                }
                if r != rings - 1 {
                    triangles.push([a + 1, b, b + 1]);
                }
            }
        }
        Self::new(positions, triangles)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle(&self, index: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = *self.triangles.get(index)?;
        Some([
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ])
    }

    pub fn bounds(&self) -> Option<Aabb3> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
