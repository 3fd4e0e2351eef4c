use crate::World;
use crate::components::{Material, Mesh, Transform};
use crate::entity::EntityId;

/// Entities making up an empty globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlobeEntities {
    /// Group node; rotating it spins everything attached to the globe.
    pub root: EntityId,
    /// Opaque ocean sphere. It occludes the far side for picking and carries no record.
    pub ocean: EntityId,
}

pub fn spawn_globe(world: &mut World, radius: f64, ocean: Material) -> GlobeEntities {
    let root = world.spawn();
    world.set_transform(root, Transform::identity());

    let sphere = world.spawn_child(root);
    world.set_transform(sphere, Transform::identity());
    world.set_mesh(sphere, Mesh::uv_sphere(radius, 48, 24));
    world.set_material(sphere, ocean);

    GlobeEntities {
        root,
        ocean: sphere,
    }
}
