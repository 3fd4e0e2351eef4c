use earcutr::earcut;
use foundation::math::{LonLat, Vec3, lon_lat_to_unit};
use scene::components::Mesh;
use tracing::debug;

/// Longest edge, in degrees, kept before a triangle or wall segment is split.
/// Flat facets longer than this dip visibly below the globe surface.
pub const MAX_EDGE_DEG: f64 = 4.0;
const MAX_SPLIT_DEPTH: u32 = 8;

/// Triangulated outline of one country on the unit sphere, independent of altitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryShape {
    cap_directions: Vec<Vec3>,
    cap_triangles: Vec<[u32; 3]>,
    /// Densified rings for the side walls, closing point omitted.
    wall_rings: Vec<Vec<Vec3>>,
}

impl CountryShape {
    /// `polygons` holds rings per polygon, outer ring first.
    pub fn from_polygons(polygons: &[Vec<Vec<LonLat>>]) -> Self {
        let mut shape = Self::default();
        for rings in polygons {
            shape.add_polygon(rings);
        }
        shape
    }

    fn add_polygon(&mut self, rings: &[Vec<LonLat>]) {
        // Natural Earth splits polygons at the antimeridian, so the lon/lat
        // plane is a valid triangulation domain.
        let mut vertices: Vec<LonLat> = Vec::new();
        let mut coords: Vec<f64> = Vec::new();
        let mut holes: Vec<usize> = Vec::new();

        for (ring_i, ring) in rings.iter().enumerate() {
            let ring = open_ring(ring);
            if ring.len() < 3 {
                if ring_i == 0 {
                    return;
                }
                continue;
            }
            if ring_i > 0 {
                holes.push(vertices.len());
            }
            for p in ring {
                coords.push(p.lon_deg);
                coords.push(p.lat_deg);
                vertices.push(*p);
            }
            self.wall_rings.push(
                densify_ring(ring)
                    .into_iter()
                    .map(lon_lat_to_unit)
                    .collect(),
            );
        }

        let Ok(indices) = earcut(&coords, &holes, 2) else {
            debug!(vertices = vertices.len(), "polygon triangulation failed");
            return;
        };

        for tri in indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                vertices.get(tri[0]),
                vertices.get(tri[1]),
                vertices.get(tri[2]),
            ) else {
                continue;
            };
            self.push_subdivided([*a, *b, *c], 0);
        }
    }

    fn push_subdivided(&mut self, tri: [LonLat; 3], depth: u32) {
        let edges = [(0, 1), (1, 2), (2, 0)];
        let (longest, len) = edges
            .iter()
            .map(|&(i, j)| ((i, j), degree_distance(tri[i], tri[j])))
            .fold(((0, 1), 0.0), |acc, e| if e.1 > acc.1 { e } else { acc });

        if len <= MAX_EDGE_DEG || depth >= MAX_SPLIT_DEPTH {
            let base = self.cap_directions.len() as u32;
            self.cap_directions.extend(tri.iter().map(|p| lon_lat_to_unit(*p)));
            self.cap_triangles.push([base, base + 1, base + 2]);
            return;
        }

        let (i, j) = longest;
        let k = 3 - i - j;
        let mid = midpoint(tri[i], tri[j]);
        self.push_subdivided([tri[i], mid, tri[k]], depth + 1);
        self.push_subdivided([mid, tri[j], tri[k]], depth + 1);
    }

    pub fn is_empty(&self) -> bool {
        self.cap_triangles.is_empty()
    }

    pub fn cap_triangle_count(&self) -> usize {
        self.cap_triangles.len()
    }

    /// Top surface lifted to `radius * (1 + altitude)`.
    pub fn cap_mesh(&self, radius: f64, altitude: f64) -> Mesh {
        let r = radius * (1.0 + altitude);
        Mesh::new(
            self.cap_directions.iter().map(|d| d.scale(r)).collect(),
            self.cap_triangles.clone(),
        )
    }

    /// Walls joining the globe surface to the lifted outline.
    pub fn side_mesh(&self, radius: f64, altitude: f64) -> Mesh {
        let top = radius * (1.0 + altitude);
        let mut positions = Vec::new();
        let mut triangles = Vec::new();
        for ring in &self.wall_rings {
            let n = ring.len();
            for i in 0..n {
                let a = ring[i];
                let b = ring[(i + 1) % n];
                let base = positions.len() as u32;
                positions.extend([a.scale(radius), b.scale(radius), b.scale(top), a.scale(top)]);
                triangles.push([base, base + 1, base + 2]);
                triangles.push([base, base + 2, base + 3]);
            }
        }
        Mesh::new(positions, triangles)
    }
}

fn open_ring(ring: &[LonLat]) -> &[LonLat] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() >= 2 && same_point(*first, *last) => {
            &ring[..ring.len() - 1]
        }
        _ => ring,
    }
}

fn same_point(a: LonLat, b: LonLat) -> bool {
    (a.lon_deg - b.lon_deg).abs() < 1e-9 && (a.lat_deg - b.lat_deg).abs() < 1e-9
}

fn degree_distance(a: LonLat, b: LonLat) -> f64 {
    (a.lon_deg - b.lon_deg).hypot(a.lat_deg - b.lat_deg)
}

fn midpoint(a: LonLat, b: LonLat) -> LonLat {
    LonLat::new((a.lon_deg + b.lon_deg) * 0.5, (a.lat_deg + b.lat_deg) * 0.5)
}

fn densify_ring(ring: &[LonLat]) -> Vec<LonLat> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let steps = (degree_distance(a, b) / MAX_EDGE_DEG).ceil().max(1.0) as usize;
        for s in 0..steps {
            let f = s as f64 / steps as f64;
            out.push(LonLat::new(
                a.lon_deg + (b.lon_deg - a.lon_deg) * f,
                a.lat_deg + (b.lat_deg - a.lat_deg) * f,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{CountryShape, MAX_EDGE_DEG};
    use foundation::math::{LonLat, unit_to_lon_lat};

    fn square(lon: f64, lat: f64, size: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(lon, lat),
            LonLat::new(lon + size, lat),
            LonLat::new(lon + size, lat + size),
            LonLat::new(lon, lat + size),
            LonLat::new(lon, lat),
        ]
    }

    #[test]
    fn small_square_is_two_triangles() {
        let shape = CountryShape::from_polygons(&[vec![square(10.0, 50.0, 2.0)]]);
        assert_eq!(shape.cap_triangle_count(), 2);

        let cap = shape.cap_mesh(100.0, 0.01);
        for p in cap.positions() {
            assert!((p.length() - 101.0).abs() < 1e-9);
        }
    }

    #[test]
    fn large_polygons_are_subdivided() {
        let shape = CountryShape::from_polygons(&[vec![square(0.0, 0.0, 20.0)]]);
        assert!(shape.cap_triangle_count() > 2);

        let cap = shape.cap_mesh(1.0, 0.0);
        for i in 0..cap.triangles().len() {
            let [a, b, c] = cap.triangle(i).expect("triangle");
            for (p, q) in [(a, b), (b, c), (c, a)] {
                // Chord of MAX_EDGE_DEG along the diagonal plus slack.
                assert!((p - q).length() < (MAX_EDGE_DEG * 1.5).to_radians());
            }
        }
    }

    #[test]
    fn holes_are_left_open() {
        let mut hole = square(4.0, 4.0, 2.0);
        hole.reverse();
        let with_hole = CountryShape::from_polygons(&[vec![square(0.0, 0.0, 10.0), hole]]);
        assert!(!with_hole.is_empty());

        let cap = with_hole.cap_mesh(1.0, 0.0);
        for i in 0..cap.triangles().len() {
            let [a, b, c] = cap.triangle(i).expect("triangle");
            let centroid = unit_to_lon_lat((a + b + c).normalize_or_self());
            let inside = (4.2..5.8).contains(&centroid.lon_deg) && (4.2..5.8).contains(&centroid.lat_deg);
            assert!(!inside, "triangle {i} covers the hole");
        }

        let side = with_hole.side_mesh(100.0, 0.03);
        let bounds = side.bounds().expect("bounds");
        assert!(bounds.max[2] <= 103.0 + 1e-9);
    }

    #[test]
    fn side_walls_span_surface_to_cap() {
        let shape = CountryShape::from_polygons(&[vec![square(10.0, 50.0, 2.0)]]);
        let side = shape.side_mesh(100.0, 0.03);
        assert_eq!(side.triangles().len(), 8);
        let radii: Vec<f64> = side.positions().iter().map(|p| p.length()).collect();
        assert!(radii.iter().any(|r| (r - 100.0).abs() < 1e-9));
        assert!(radii.iter().any(|r| (r - 103.0).abs() < 1e-9));
    }

    #[test]
    fn degenerate_rings_produce_nothing() {
        let line = vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)];
        let shape = CountryShape::from_polygons(&[vec![line]]);
        assert!(shape.is_empty());
        assert!(shape.side_mesh(1.0, 0.0).is_empty());
        assert!(CountryShape::from_polygons(&[]).is_empty());
    }
}
