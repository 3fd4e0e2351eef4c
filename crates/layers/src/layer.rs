use scene::World;
use scene::components::{Material, Transform, Visibility};
use scene::entity::EntityId;
use scene::picking::PickTable;
use tracing::debug;

use crate::choropleth::YearColorFrame;
use crate::features::{FeatureId, GeoFeatureStore};
use crate::symbology::{ChoroplethStyle, LayerStyle};
use crate::vector::CountryShape;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// Scene entities of one country.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CountryEntities {
    pub group: EntityId,
    pub cap: EntityId,
    pub side: EntityId,
}

#[derive(Debug, Clone)]
struct CountrySlot {
    feature: FeatureId,
    shape: CountryShape,
    entities: CountryEntities,
    applied: LayerStyle,
}

/// Extruded country polygons attached under the globe root.
///
/// Both the cap and the side walls of a country are registered in the pick
/// table, so a hit on either resolves to the same feature.
#[derive(Debug, Clone)]
pub struct CountryLayer {
    id: LayerId,
    radius: f64,
    style: ChoroplethStyle,
    slots: Vec<CountrySlot>,
    pick_table: PickTable<FeatureId>,
}

impl Layer for CountryLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

impl CountryLayer {
    /// Spawns meshes for every areal feature in `store`, styled with the fallback look.
    pub fn attach(
        id: u64,
        world: &mut World,
        parent: EntityId,
        store: &GeoFeatureStore,
        radius: f64,
        style: ChoroplethStyle,
    ) -> Self {
        let mut layer = Self {
            id: LayerId(id),
            radius,
            style,
            slots: Vec::new(),
            pick_table: PickTable::new(),
        };

        for (feature, country) in store.iter() {
            let shape = CountryShape::from_polygons(&country.polygons);
            if shape.is_empty() {
                continue;
            }
            let group = world.spawn_child(parent);
            world.set_transform(group, Transform::identity());
            let cap = world.spawn_child(group);
            let side = world.spawn_child(group);
            world.set_material(side, style.side);

            layer.pick_table.insert(cap, feature);
            layer.pick_table.insert(side, feature);

            let mut slot = CountrySlot {
                feature,
                shape,
                entities: CountryEntities { group, cap, side },
                applied: LayerStyle::new(false, [0.0; 4], f64::NAN),
            };
            layer.write_style(world, &mut slot, style.fallback);
            layer.slots.push(slot);
        }

        debug!(
            countries = layer.slots.len(),
            pickable = layer.pick_table.len(),
            "country layer attached"
        );
        layer
    }

    /// Restyles every country from `frame`; countries missing from it get the fallback.
    pub fn apply_frame(&mut self, world: &mut World, store: &GeoFeatureStore, frame: &YearColorFrame) {
        let mut slots = std::mem::take(&mut self.slots);
        for slot in &mut slots {
            let visual = store
                .get(slot.feature)
                .and_then(|f| f.code.as_ref())
                .and_then(|code| frame.get(code));
            let style = match visual {
                Some(v) => LayerStyle::new(true, v.color.with_alpha(1.0).color, v.altitude),
                None => self.style.fallback,
            };
            self.write_style(world, slot, style);
        }
        self.slots = slots;
    }

    fn write_style(&self, world: &mut World, slot: &mut CountrySlot, style: LayerStyle) {
        let CountryEntities { group, cap, side } = slot.entities;
        if slot.applied.lift != style.lift {
            world.set_mesh(cap, slot.shape.cap_mesh(self.radius, style.lift));
            world.set_mesh(side, slot.shape.side_mesh(self.radius, style.lift));
        }
        if slot.applied.color != style.color {
            world.set_material(cap, Material::new(style.color));
        }
        if slot.applied.visible != style.visible {
            let visibility = if style.visible {
                Visibility::visible()
            } else {
                Visibility::hidden()
            };
            world.set_visibility(group, visibility);
        }
        slot.applied = style;
    }

    pub fn pick_table(&self) -> &PickTable<FeatureId> {
        &self.pick_table
    }

    pub fn entities(&self, feature: FeatureId) -> Option<CountryEntities> {
        self.slot(feature).map(|s| s.entities)
    }

    pub fn applied_style(&self, feature: FeatureId) -> Option<LayerStyle> {
        self.slot(feature).map(|s| s.applied)
    }

    fn slot(&self, feature: FeatureId) -> Option<&CountrySlot> {
        self.slots.iter().find(|s| s.feature == feature)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
