use foundation::bounds::ScreenRect;
use foundation::math::{Quat, Vec3};
use formats::VectorChunkError;
use layers::{
    ChoroplethEngine, CountryLayer, FeatureId, GeoFeatureStore, IngestSummary, Layer, SeriesError,
    TimeSeriesIndex,
};
use render::{RenderFrame, Renderer};
use runtime::event_bus::{EventBus, Severity, kinds};
use runtime::frame::Frame;
use runtime::timeline::TimelineController;
use scene::World;
use scene::camera::PerspectiveCamera;
use scene::components::Transform;
use scene::navigation::OrbitController;
use scene::prefabs::{GlobeEntities, spawn_globe};
use tracing::info;

use crate::binding::ChoroplethBinding;
use crate::config::ViewerConfig;
use crate::hover::{HoverState, InteractivePicker};
use crate::tooltip::{TooltipContent, TooltipPresenter, TooltipSink};

const COUNTRY_LAYER_ID: u64 = 1;

#[derive(Debug)]
pub enum LoadError {
    /// Network failure or non-success status.
    Fetch(String),
    Boundaries(VectorChunkError),
    Series(SeriesError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(e) => write!(f, "fetch failed: {e}"),
            LoadError::Boundaries(e) => write!(f, "boundary dataset rejected: {e}"),
            LoadError::Series(e) => write!(f, "time series rejected: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<VectorChunkError> for LoadError {
    fn from(e: VectorChunkError) -> Self {
        LoadError::Boundaries(e)
    }
}

impl From<SeriesError> for LoadError {
    fn from(e: SeriesError) -> Self {
        LoadError::Series(e)
    }
}

/// Result of one animation frame.
#[derive(Debug, Default)]
pub struct FrameOutput {
    /// Set when the year timer advanced the selected year during this frame.
    pub year_changed: Option<i32>,
    pub hovered: Option<FeatureId>,
    pub render: RenderFrame,
}

/// Composes the globe scene, data, timeline and hover handling.
///
/// All methods run on the host's event loop; the host forwards input events
/// and calls [`GlobeViewer::render_frame`] once per display refresh.
pub struct GlobeViewer {
    config: ViewerConfig,
    world: World,
    globe: GlobeEntities,
    spin_rad: f64,
    orbit: OrbitController,
    renderer: Renderer,
    features: GeoFeatureStore,
    series: TimeSeriesIndex,
    engine: ChoroplethEngine,
    layer: Option<CountryLayer>,
    timeline: TimelineController,
    picker: InteractivePicker,
    tooltip: TooltipPresenter,
    events: EventBus,
    frame: Frame,
    surface: ScreenRect,
    viewport: [f64; 2],
    started: bool,
}

impl GlobeViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let style = config.choropleth_style();
        let mut world = World::new();
        let globe = spawn_globe(&mut world, config.globe_radius, style.ocean);
        let orbit = OrbitController::new(config.orbit_settings(), config.camera_distance);
        let timeline = TimelineController::new(
            config.year_range(),
            config.initial_year(),
            config.tick_period_s,
        );
        let tooltip = TooltipPresenter::new(
            config.tooltip_offset_px,
            config.tooltip_padding_px,
            config.value_prefix.clone(),
        );

        Self {
            world,
            globe,
            spin_rad: 0.0,
            orbit,
            renderer: Renderer::new().with_horizon_cull(Vec3::ZERO),
            features: GeoFeatureStore::default(),
            series: TimeSeriesIndex::new(),
            engine: ChoroplethEngine::new(style),
            layer: None,
            timeline,
            picker: InteractivePicker::new(),
            tooltip,
            events: EventBus::new(),
            frame: Frame::new(0, 0.0),
            surface: ScreenRect::new(0.0, 0.0, 1280.0, 720.0),
            viewport: [1280.0, 720.0],
            started: false,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn features(&self) -> &GeoFeatureStore {
        &self.features
    }

    pub fn series(&self) -> &TimeSeriesIndex {
        &self.series
    }

    pub fn layer(&self) -> Option<&CountryLayer> {
        self.layer.as_ref()
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn hover(&self) -> HoverState {
        self.picker.state()
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.orbit.camera()
    }

    pub fn globe_spin(&self) -> f64 {
        self.spin_rad
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Attaches country meshes to the globe. Only the first dataset is attached.
    pub fn attach_boundaries(&mut self, features: GeoFeatureStore) -> usize {
        if self.layer.is_some() {
            self.events.emit(
                self.frame,
                kinds::LOADED,
                Severity::Warn,
                "boundaries already attached; ignoring new dataset",
            );
            return 0;
        }
        let layer = CountryLayer::attach(
            COUNTRY_LAYER_ID,
            &mut self.world,
            self.globe.root,
            &features,
            self.config.globe_radius,
            *self.engine.style(),
        );
        let attached = layer.len();
        self.events.emit(
            self.frame,
            kinds::LOADED,
            Severity::Info,
            format!(
                "layer {:?}: {attached} of {} boundary features attached",
                layer.id(),
                features.len()
            ),
        );
        self.features = features;
        self.layer = Some(layer);
        if self.started {
            self.refresh_year();
        }
        attached
    }

    pub fn load_boundaries_json(&mut self, payload: &str) -> Result<usize, LoadError> {
        let features = GeoFeatureStore::from_geojson_str(payload)?;
        Ok(self.attach_boundaries(features))
    }

    /// Replaces the time series. The current year is reapplied once started.
    pub fn load_series_json(&mut self, payload: &str) -> Result<IngestSummary, LoadError> {
        let summary = self.series.load_json_str(payload)?;
        if summary.skipped_records > 0 || summary.dropped_entries > 0 {
            self.events.emit(
                self.frame,
                kinds::MALFORMED_RECORD,
                Severity::Debug,
                format!(
                    "dropped {} records and {} year entries",
                    summary.skipped_records, summary.dropped_entries
                ),
            );
        }
        self.events.emit(
            self.frame,
            kinds::LOADED,
            Severity::Info,
            format!("time series loaded for {} countries", summary.countries),
        );
        if self.started {
            self.refresh_year();
        }
        Ok(summary)
    }

    /// Single sink for load failures; the viewer keeps running with default visuals.
    pub fn report(&mut self, err: &LoadError) {
        self.events.emit(
            self.frame,
            kinds::FETCH_FAILURE,
            Severity::Warn,
            err.to_string(),
        );
    }

    /// Applies the initial year and, if configured, starts playback.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.refresh_year();
        if self.config.autoplay {
            self.timeline.play();
        }
        info!(
            year = self.timeline.current_year(),
            playing = self.timeline.is_playing(),
            "viewer started"
        );
    }

    fn binding(&mut self) -> (ChoroplethBinding<'_>, &mut TimelineController) {
        (
            ChoroplethBinding {
                engine: &mut self.engine,
                series: &self.series,
                features: &self.features,
                layer: self.layer.as_mut(),
                world: &mut self.world,
                applied: None,
            },
            &mut self.timeline,
        )
    }

    fn refresh_year(&mut self) {
        let (mut binding, timeline) = self.binding();
        timeline.refresh(&mut binding);
    }

    pub fn current_year(&self) -> i32 {
        self.timeline.current_year()
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.is_playing()
    }

    /// Flips play/pause; returns the new playing flag.
    pub fn toggle_play(&mut self) -> bool {
        let playing = self.timeline.toggle_play();
        self.events.emit(
            self.frame,
            kinds::TIMELINE,
            Severity::Debug,
            if playing { "playing" } else { "paused" },
        );
        playing
    }

    /// Selects a year from the slider or code; returns the clamped year.
    pub fn set_year(&mut self, year: i32) -> i32 {
        let (mut binding, timeline) = self.binding();
        timeline.set_year(year, &mut binding)
    }

    pub fn timeline_drag_begin(&mut self) {
        self.timeline.begin_drag();
    }

    pub fn timeline_drag_end(&mut self) {
        self.timeline.end_drag();
    }

    /// `surface` is the canvas rect in viewport pixels; `viewport` bounds the tooltip.
    pub fn resize(&mut self, surface: ScreenRect, viewport: [f64; 2]) {
        self.surface = surface;
        self.viewport = viewport;
        self.orbit.set_viewport(surface.width, surface.height);
    }

    pub fn pointer_moved(&mut self, x_px: f64, y_px: f64) {
        self.picker.pointer_moved(x_px, y_px);
    }

    /// The pointer left the surface: hide the tooltip and forget the position.
    pub fn pointer_left(&mut self, sink: &mut impl TooltipSink) {
        self.picker.pointer_left();
        self.tooltip.hide(sink);
    }

    pub fn orbit_begin(&mut self, x_px: f64, y_px: f64, now_s: f64) {
        self.orbit
            .on_pointer_down(self.surface_local(x_px, y_px), now_s);
    }

    pub fn orbit_move(&mut self, x_px: f64, y_px: f64, now_s: f64) {
        self.orbit
            .on_pointer_move(self.surface_local(x_px, y_px), now_s);
    }

    pub fn orbit_end(&mut self) {
        self.orbit.on_pointer_up();
    }

    pub fn zoom(&mut self, wheel_delta: f64) {
        self.orbit.on_wheel(wheel_delta);
    }

    fn surface_local(&self, x_px: f64, y_px: f64) -> [f64; 2] {
        [x_px - self.surface.left, y_px - self.surface.top]
    }

    /// Runs one animation frame.
    pub fn render_frame(&mut self, dt_s: f64, sink: &mut impl TooltipSink) -> FrameOutput {
        self.frame = self.frame.advance(dt_s);
        let dt = self.frame.dt_s;

        let year_changed = {
            let (mut binding, timeline) = self.binding();
            timeline.tick(dt, &mut binding)
        };
        if let Some(year) = year_changed {
            self.events
                .emit(self.frame, kinds::TIMELINE, Severity::Debug, format!("year {year}"));
        }

        if self.timeline.is_playing() && !self.timeline.is_dragging() && !self.orbit.is_dragging() {
            self.spin_rad = (self.spin_rad + self.config.auto_rotate_speed) % std::f64::consts::TAU;
            self.world.set_transform(
                self.globe.root,
                Transform::rotate(Quat::from_rotation_y(self.spin_rad)),
            );
        }

        self.orbit.update(dt);
        let camera = self.orbit.camera();

        let hovered = self.update_hover(&camera, sink);

        let render = self
            .renderer
            .collect(&self.world, &camera, self.surface.width, self.surface.height);

        FrameOutput {
            year_changed,
            hovered,
            render,
        }
    }

    fn update_hover(&mut self, camera: &PerspectiveCamera, sink: &mut impl TooltipSink) -> Option<FeatureId> {
        let hovered = match &self.layer {
            Some(layer) => {
                self.picker
                    .resolve(&self.world, camera, &self.surface, layer.pick_table())
            }
            None => None,
        };

        let feature = hovered.and_then(|id| self.features.get(id));
        match (feature, self.picker.pointer()) {
            (Some(feature), Some(pointer)) => {
                let year = self.timeline.current_year();
                let content = TooltipContent {
                    name: feature.name.clone(),
                    year,
                    value: feature
                        .code
                        .as_ref()
                        .and_then(|code| self.series.value(code, year)),
                };
                self.tooltip.show(sink, content, pointer, self.viewport);
            }
            _ => self.tooltip.hide(sink),
        }
        hovered
    }
}
