use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub triangle: usize,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

/// Nearest ray/triangle hit over every visible mesh in the world.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple entities are hit at the same distance, the lower `EntityId::index()` wins.
///
/// Meshes are tested in world space, i.e. with every ancestor transform applied.
/// World-space bounds are checked first and meshes are visited by box entry
/// distance, so the scan stops once no remaining box can beat the best hit.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.try_normalize()?;

    let mut candidates: Vec<(f64, EntityId)> = world
        .visible_meshes()
        .into_iter()
        .filter_map(|(entity, mesh)| {
            let local = mesh.bounds()?;
            let xf = world.world_transform(entity);
            let bounds = Aabb3::from_points(
                local.corners().map(|c| xf.apply_point(Vec3::from_array(c)).as_array()),
            )?;
            let t_enter = ray_box_entry(ray.origin, dir, &bounds, opts.max_distance)?;
            Some((t_enter, entity))
        })
        .collect();
    candidates.sort_by(|a, b| {
        stable_total_cmp_f64(a.0, b.0).then_with(|| a.1.index().cmp(&b.1.index()))
    });

    let mut best: Option<PickHit> = None;
    for (t_enter, entity) in candidates {
        if let Some(current) = &best
            && t_enter > current.distance
        {
            break;
        }
        let Some(mesh) = world.mesh(entity) else {
            continue;
        };

        // Intersect in mesh-local space; with uniform scale the ray parameter is unchanged.
        let xf = world.world_transform(entity);
        let local_origin = xf.inverse_point(ray.origin);
        let local_dir = xf.inverse_vector(dir);

        for tri_index in 0..mesh.triangles().len() {
            let Some(tri) = mesh.triangle(tri_index) else {
                continue;
            };
            let Some(t) = ray_triangle(local_origin, local_dir, tri) else {
                continue;
            };
            if t > opts.max_distance {
                continue;
            }
            let better = match &best {
                None => true,
                Some(current) => stable_total_cmp_f64(t, current.distance)
                    .then_with(|| entity.index().cmp(&current.entity.index()))
                    .is_lt(),
            };
            if better {
                best = Some(PickHit {
                    entity,
                    triangle: tri_index,
                    distance: t,
                    point: ray.origin + dir.scale(t),
                });
            }
        }
    }

    best
}

/// Slab test against a world box; returns the entry distance in `[0, t_max]`.
fn ray_box_entry(origin: Vec3, dir: Vec3, aabb: &Aabb3, t_max: f64) -> Option<f64> {
    let o = origin.as_array();
    let d = dir.as_array();
    let (mut near, mut far) = (0.0_f64, t_max);
    for axis in 0..3 {
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if d[axis].abs() < 1e-12 {
            if o[axis] < lo || o[axis] > hi {
                return None;
            }
            continue;
        }
        let a = (lo - o[axis]) / d[axis];
        let b = (hi - o[axis]) / d[axis];
        near = near.max(a.min(b));
        far = far.min(a.max(b));
        if far < near {
            return None;
        }
    }
    Some(near)
}

/// Möller–Trumbore, double sided. Returns the ray parameter of the hit.
fn ray_triangle(origin: Vec3, dir: Vec3, [v0, v1, v2]: [Vec3; 3]) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    if t < 0.0 { None } else { Some(t) }
}

/// Side table from rendered mesh entities to the records they display.
///
/// Filled when meshes are attached, so a hit resolves to its record without
/// inspecting the scene graph.
#[derive(Debug, Clone)]
pub struct PickTable<T> {
    entries: Vec<Option<T>>,
    len: usize,
}

impl<T> Default for PickTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
        }
    }
}

impl<T> PickTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        let idx = entity.index() as usize;
        if self.entries.len() <= idx {
            self.entries.resize_with(idx + 1, || None);
        }
        let previous = self.entries[idx].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.entries.get(entity.index() as usize).and_then(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up the record under the nearest hit. Hits on meshes without a
    /// record (occluders) resolve to `None`.
    pub fn resolve(&self, world: &World, ray: Ray, opts: PickOptions) -> Option<(&T, PickHit)> {
        let hit = pick_ray(world, ray, opts)?;
        self.get(hit.entity).map(|value| (value, hit))
    }
}
