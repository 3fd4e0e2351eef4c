use foundation::bounds::ScreenRect;
use layers::{CountryCode, FeatureId};
use pretty_assertions::assert_eq;
use runtime::event_bus::kinds;
use viewer::tooltip::TooltipSink;
use viewer::{GlobeViewer, LoadError, ViewerConfig};

const BOUNDARIES: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "id": "SWE", "properties": {"ADMIN": "Sweden"},
     "geometry": {"type": "Polygon", "coordinates": [[[-6,-6],[6,-6],[6,6],[-6,6],[-6,-6]]]}},
    {"type": "Feature", "id": "FIN", "properties": {"ADMIN": "Finland"},
     "geometry": {"type": "Polygon", "coordinates": [[[20,-6],[30,-6],[30,6],[20,6],[20,-6]]]}},
    {"type": "Feature", "id": "NOR", "properties": {"ADMIN": "Norway"},
     "geometry": {"type": "Polygon", "coordinates": [[[-30,-6],[-20,-6],[-20,6],[-30,6],[-30,-6]]]}},
    {"type": "Feature", "properties": {"ADMIN": "Unclaimed", "ISO_A3": "-99"},
     "geometry": {"type": "Polygon", "coordinates": [[[-6,30],[6,30],[6,40],[-6,40],[-6,30]]]}}
]}"#;

const SERIES: &str = r#"[
    {"iso3": "swe", "name": "Sweden", "values": [{"year": 2020, "value": 60000}, {"year": 2021, "value": 61000}]},
    {"Iso3": "FIN", "Name": "Finland", "Values": [{"Year": 2020, "Value": 50000}, {"Year": 2021, "Value": null}]},
    {"iso3": "NOR", "name": "Norway", "values": [{"year": 2020, "value": 70000}]}
]"#;

#[derive(Debug, Default)]
struct Overlay {
    lines: Vec<String>,
    visible: bool,
    shows: usize,
    hides: usize,
}

impl TooltipSink for Overlay {
    fn set_lines(&mut self, lines: &[String]) {
        self.lines = lines.to_vec();
    }

    fn size(&self) -> [f64; 2] {
        [100.0, 50.0]
    }

    fn place(&mut self, _left: f64, _top: f64) {}

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.shows += 1;
        } else {
            self.hides += 1;
        }
    }
}

fn loaded_viewer(autoplay: bool) -> GlobeViewer {
    let config = ViewerConfig {
        year_min: 2019,
        year_max: 2021,
        initial_year: Some(2020),
        autoplay,
        ..ViewerConfig::default()
    };
    let mut viewer = GlobeViewer::new(config);
    viewer.resize(ScreenRect::new(0.0, 0.0, 800.0, 600.0), [800.0, 600.0]);
    viewer.load_boundaries_json(BOUNDARIES).expect("boundaries");
    viewer.load_series_json(SERIES).expect("series");
    viewer.start();
    viewer
}

#[test]
fn initial_year_colors_countries_by_rank() {
    let viewer = loaded_viewer(false);
    let layer = viewer.layer().expect("layer");

    let lift = |id: usize| layer.applied_style(FeatureId(id)).expect("style").lift;
    assert!(lift(1) < lift(0));
    assert!(lift(0) < lift(2));

    let unclaimed = layer.applied_style(FeatureId(3)).expect("style");
    assert_eq!(unclaimed, viewer.config().choropleth_style().fallback);
    assert!(viewer.features().get(FeatureId(3)).expect("feature").code.is_none());

    let fin = CountryCode::normalize("fin").expect("code");
    assert_eq!(viewer.series().value(&fin, 2021), None);
}

#[test]
fn hovering_on_and_off_a_country_toggles_the_tooltip_once() {
    let mut viewer = loaded_viewer(false);
    let mut overlay = Overlay::default();

    // Never entered: nothing resolves.
    let out = viewer.render_frame(1.0 / 60.0, &mut overlay);
    assert_eq!(out.hovered, None);

    viewer.pointer_moved(400.0, 300.0);
    for _ in 0..3 {
        let out = viewer.render_frame(1.0 / 60.0, &mut overlay);
        assert_eq!(out.hovered, Some(FeatureId(0)));
    }
    assert_eq!(overlay.lines, vec!["Sweden", "2020", "$60,000"]);

    // Open ocean south of the countries.
    viewer.pointer_moved(400.0, 420.0);
    for _ in 0..3 {
        let out = viewer.render_frame(1.0 / 60.0, &mut overlay);
        assert_eq!(out.hovered, None);
    }

    assert_eq!(overlay.shows, 1);
    assert_eq!(overlay.hides, 1);
    assert!(!overlay.visible);
}

#[test]
fn stationary_pointer_follows_the_rotating_globe() {
    let mut viewer = GlobeViewer::new(ViewerConfig {
        year_min: 2019,
        year_max: 2021,
        initial_year: Some(2020),
        autoplay: true,
        auto_rotate_speed: 0.02,
        ..ViewerConfig::default()
    });
    viewer.resize(ScreenRect::new(0.0, 0.0, 800.0, 600.0), [800.0, 600.0]);
    viewer.load_boundaries_json(BOUNDARIES).expect("boundaries");
    viewer.load_series_json(SERIES).expect("series");
    viewer.start();

    let mut overlay = Overlay::default();
    viewer.pointer_moved(400.0, 300.0);

    let mut transitions: Vec<Option<FeatureId>> = Vec::new();
    for _ in 0..60 {
        let hovered = viewer.render_frame(1.0 / 60.0, &mut overlay).hovered;
        if transitions.last() != Some(&hovered) {
            transitions.push(hovered);
        }
    }

    assert_eq!(transitions.first(), Some(&Some(FeatureId(0))));
    assert!(transitions.len() > 1, "hover never changed: {transitions:?}");
    assert!(transitions.contains(&Some(FeatureId(1))));

    let entered = transitions
        .iter()
        .enumerate()
        .filter(|(i, h)| h.is_some() && (*i == 0 || transitions[i - 1].is_none()))
        .count();
    let left = transitions
        .windows(2)
        .filter(|w| w[0].is_some() && w[1].is_none())
        .count();
    assert_eq!(overlay.shows, entered);
    assert_eq!(overlay.hides, left);
    assert_eq!(overlay.visible, transitions.last().is_some_and(|h| h.is_some()));
}

#[test]
fn dragging_the_slider_suspends_playback_until_release() {
    let mut viewer = loaded_viewer(true);
    let mut overlay = Overlay::default();

    viewer.timeline_drag_begin();
    assert_eq!(viewer.set_year(2019), 2019);
    let spin = viewer.globe_spin();
    for _ in 0..3 {
        assert_eq!(viewer.render_frame(1.0, &mut overlay).year_changed, None);
    }
    assert_eq!(viewer.globe_spin(), spin);

    viewer.timeline_drag_end();
    assert_eq!(viewer.render_frame(1.0, &mut overlay).year_changed, Some(2020));

    assert!(!viewer.toggle_play());
    viewer.timeline_drag_begin();
    viewer.timeline_drag_end();
    assert_eq!(viewer.render_frame(1.0, &mut overlay).year_changed, None);
}

#[test]
fn orbiting_pauses_auto_rotation() {
    let mut viewer = loaded_viewer(true);
    let mut overlay = Overlay::default();

    viewer.render_frame(1.0 / 60.0, &mut overlay);
    let spin = viewer.globe_spin();
    assert!(spin > 0.0);

    viewer.orbit_begin(400.0, 300.0, 0.0);
    viewer.orbit_move(420.0, 300.0, 0.016);
    viewer.render_frame(1.0 / 60.0, &mut overlay);
    assert_eq!(viewer.globe_spin(), spin);

    viewer.orbit_end();
    viewer.render_frame(1.0 / 60.0, &mut overlay);
    assert!(viewer.globe_spin() > spin);
}

#[test]
fn failed_series_fetch_leaves_no_data_visuals() {
    let mut viewer = GlobeViewer::new(ViewerConfig::default());
    viewer.load_boundaries_json(BOUNDARIES).expect("boundaries");
    viewer.report(&LoadError::Fetch("HTTP 500".to_string()));
    viewer.start();

    let layer = viewer.layer().expect("layer");
    let fallback = viewer.config().choropleth_style().fallback;
    for id in 0..4 {
        assert_eq!(layer.applied_style(FeatureId(id)), Some(fallback));
    }
    assert_eq!(viewer.events().count_kind(kinds::FETCH_FAILURE), 1);
}
