use crate::components::{Material, Mesh, Transform, Visibility};
use crate::entity::EntityId;
use foundation::handles::Handle;

/// Parent chains longer than this are treated as broken.
const MAX_DEPTH: usize = 64;

/// Scene graph: per-entity components stored densely by entity index.
///
/// Entities may have a parent; world transforms and visibility are inherited
/// down the chain.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    parents: Vec<Option<EntityId>>,
    transforms: Vec<Option<Transform>>,
    visibility: Vec<Option<Visibility>>,
    meshes: Vec<Option<Mesh>>,
    materials: Vec<Option<Material>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, 0));
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        id
    }

    pub fn spawn_child(&mut self, parent: EntityId) -> EntityId {
        let id = self.spawn();
        self.parents[id.index() as usize] = Some(parent);
        id
    }

    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Re-parents `entity`. Refuses links that would create a cycle.
    pub fn set_parent(&mut self, entity: EntityId, parent: Option<EntityId>) -> bool {
        if let Some(p) = parent
            && self.ancestors(p).any(|a| a == entity)
        {
            return false;
        }
        self.ensure_capacity(entity.index() as usize);
        self.parents[entity.index() as usize] = parent;
        true
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(entity.index() as usize).and_then(|p| *p)
    }

    /// `entity` followed by each ancestor up to the root.
    pub fn ancestors(&self, entity: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::successors(Some(entity), |e| self.parent(*e)).take(MAX_DEPTH)
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Transform {
        self.transforms
            .get(entity.index() as usize)
            .and_then(|t| *t)
            .unwrap_or_default()
    }

    /// Local transform composed with every ancestor's.
    pub fn world_transform(&self, entity: EntityId) -> Transform {
        let chain: Vec<EntityId> = self.ancestors(entity).collect();
        chain
            .iter()
            .rev()
            .fold(Transform::identity(), |acc, e| acc.then(&self.transform(*e)))
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        self.ensure_capacity(entity.index() as usize);
        self.visibility[entity.index() as usize] = Some(visibility);
    }

    /// Hidden if the entity or any ancestor is hidden.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.ancestors(entity).all(|e| {
            self.visibility
                .get(e.index() as usize)
                .and_then(|v| *v)
                .map(|v| v.visible)
                .unwrap_or(true)
        })
    }

    pub fn set_mesh(&mut self, entity: EntityId, mesh: Mesh) {
        self.ensure_capacity(entity.index() as usize);
        self.meshes[entity.index() as usize] = Some(mesh);
    }

    pub fn mesh(&self, entity: EntityId) -> Option<&Mesh> {
        self.meshes.get(entity.index() as usize).and_then(|m| m.as_ref())
    }

    pub fn set_material(&mut self, entity: EntityId, material: Material) {
        self.ensure_capacity(entity.index() as usize);
        self.materials[entity.index() as usize] = Some(material);
    }

    pub fn material(&self, entity: EntityId) -> Material {
        self.materials
            .get(entity.index() as usize)
            .and_then(|m| *m)
            .unwrap_or_default()
    }

    /// Visible entities carrying a non-empty mesh, in index order.
    pub fn visible_meshes(&self) -> Vec<(EntityId, &Mesh)> {
        let mut out = Vec::new();
        for (idx, mesh) in self.meshes.iter().enumerate() {
            let Some(mesh) = mesh else { continue };
            if mesh.is_empty() {
                continue;
            }
            let entity = EntityId(Handle::new(idx as u32, 0));
            if !self.is_visible(entity) {
                continue;
            }
            out.push((entity, mesh));
        }
        out
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.parents.resize(new_len, None);
            self.transforms.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.meshes.resize(new_len, None);
            self.materials.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{Mesh, Transform, Visibility};
    use foundation::math::{Quat, Vec3};

    fn triangle() -> Mesh {
        Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]])
    }

    #[test]
    fn spawn_and_collect_meshes() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_mesh(entity, triangle());

        let meshes = world.visible_meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].0, entity);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut world = World::new();
        let root = world.spawn();
        let child = world.spawn_child(root);
        world.set_mesh(child, triangle());
        world.set_visibility(root, Visibility::hidden());

        assert!(world.visible_meshes().is_empty());
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut world = World::new();
        let root = world.spawn();
        world.set_transform(
            root,
            Transform::rotate(Quat::from_rotation_y(std::f64::consts::FRAC_PI_2)),
        );
        let child = world.spawn_child(root);
        world.set_transform(child, Transform::translate(Vec3::new(0.0, 0.0, 1.0)));

        let p = world.world_transform(child).apply_point(Vec3::ZERO);
        assert!((p - Vec3::X).length() < 1e-9);
    }

    #[test]
    fn refuses_parent_cycles() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn_child(a);
        assert!(!world.set_parent(a, Some(b)));
        assert!(world.set_parent(b, None));
        assert_eq!(world.parent(b), None);
    }
}
