use foundation::bounds::ScreenRect;
use layers::FeatureId;
use scene::World;
use scene::camera::PerspectiveCamera;
use scene::picking::{PickOptions, PickTable};

/// Last known pointer position and the feature under it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct HoverState {
    /// Viewport pixels; `None` until the pointer enters the surface and after it leaves.
    pub pointer: Option<[f64; 2]>,
    pub active: Option<FeatureId>,
}

/// Resolves the pointer to the country under it, once per rendered frame.
#[derive(Debug, Clone, Default)]
pub struct InteractivePicker {
    state: HoverState,
}

impl InteractivePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn pointer(&self) -> Option<[f64; 2]> {
        self.state.pointer
    }

    pub fn active(&self) -> Option<FeatureId> {
        self.state.active
    }

    pub fn pointer_moved(&mut self, x_px: f64, y_px: f64) {
        self.state.pointer = Some([x_px, y_px]);
    }

    pub fn pointer_left(&mut self) {
        self.state = HoverState::default();
    }

    /// Casts a ray under the pointer and records the nearest feature, if any.
    pub fn resolve(
        &mut self,
        world: &World,
        camera: &PerspectiveCamera,
        surface: &ScreenRect,
        table: &PickTable<FeatureId>,
    ) -> Option<FeatureId> {
        let active = self.state.pointer.and_then(|[x, y]| {
            let ray = camera.ray_from_viewport(x, y, surface)?;
            let options = PickOptions {
                max_distance: camera.far,
            };
            table.resolve(world, ray, options).map(|(feature, _)| *feature)
        });
        self.state.active = active;
        active
    }
}
