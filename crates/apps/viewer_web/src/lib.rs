use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use viewer::{GlobeViewer, LoadError, ViewerConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod canvas;
mod dom;

use dom::{Anchors, DomTooltip, InitError};

/// Frame delta assumed for the first frame and after long stalls.
const DEFAULT_DT_S: f64 = 1.0 / 60.0;

#[derive(Default)]
struct HostState {
    viewer: Option<GlobeViewer>,
    anchors: Option<Anchors>,
    tooltip: Option<DomTooltip>,
    last_timestamp_ms: Option<f64>,
}

thread_local! {
    static STATE: RefCell<HostState> = RefCell::new(HostState::default());
}

/// TLS access that returns a default during teardown instead of panicking.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<HostState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Host-side failure sink: console plus the viewer's diagnostics trail.
fn report(err: &LoadError) {
    web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.report(err);
        }
    });
}

fn backend_base_url() -> Option<String> {
    let window = web_sys::window()?;
    let val = js_sys::Reflect::get(&window, &JsValue::from_str("__globeApiBaseUrl")).ok()?;
    let s = val.as_string().unwrap_or_default();
    let s = s.trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Builds the viewer inside the page and starts loading data.
///
/// `config_json` is an optional partial [`ViewerConfig`] in camelCase.
#[wasm_bindgen]
pub fn start_viewer(config_json: &str) -> Result<(), JsValue> {
    let mut config =
        ViewerConfig::from_json_str(config_json).map_err(|e| InitError::Config(e.to_string()))?;
    if config.api_base_url.is_none() {
        config.api_base_url = backend_base_url();
    }

    let document = dom::document()?;
    let anchors = Anchors::locate(&document)?;
    let tooltip = DomTooltip::create(&document)?;
    anchors.configure_slider(config.year_min, config.year_max);

    let boundaries_url = config.boundaries_url.clone();
    let series_url = config.series_url();
    let viewer = GlobeViewer::new(config);
    anchors.show_year(viewer.current_year());
    anchors.show_playing(viewer.is_playing());

    with_state(|state| {
        let mut s = state.borrow_mut();
        s.viewer = Some(viewer);
        s.anchors = Some(anchors);
        s.tooltip = Some(tooltip);
        s.last_timestamp_ms = None;
    });
    resize();

    spawn_local(async move {
        load_and_start(boundaries_url, series_url).await;
    });
    Ok(())
}

async fn load_and_start(boundaries_url: String, series_url: String) {
    match fetch_text(&boundaries_url).await {
        Ok(text) => {
            let attached = with_state(|state| {
                state
                    .borrow_mut()
                    .viewer
                    .as_mut()
                    .map(|v| v.load_boundaries_json(&text))
            });
            match attached {
                Some(Ok(n)) => log(&format!("Attached {n} country polygons")),
                Some(Err(err)) => report(&err),
                None => {}
            }
        }
        Err(err) => report(&err),
    }

    match fetch_text(&series_url).await {
        Ok(text) => {
            let loaded = with_state(|state| {
                state
                    .borrow_mut()
                    .viewer
                    .as_mut()
                    .map(|v| v.load_series_json(&text))
            });
            match loaded {
                Some(Ok(summary)) => log(&format!(
                    "Loaded series for {} countries ({} entries dropped)",
                    summary.countries, summary.dropped_entries
                )),
                Some(Err(err)) => report(&err),
                None => {}
            }
        }
        Err(err) => report(&err),
    }

    with_state(|state| {
        let mut s = state.borrow_mut();
        let HostState {
            viewer, anchors, ..
        } = &mut *s;
        if let (Some(viewer), Some(anchors)) = (viewer.as_mut(), anchors.as_ref()) {
            viewer.start();
            anchors.show_year(viewer.current_year());
            anchors.show_playing(viewer.is_playing());
        }
    });
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Fetch(format!("{url}: {e}")))?;
    if !resp.ok() {
        return Err(LoadError::Fetch(format!(
            "{url}: HTTP {} {}",
            resp.status(),
            resp.status_text()
        )));
    }
    resp.text()
        .await
        .map_err(|e| LoadError::Fetch(format!("{url}: {e}")))
}

/// Matches the canvas to its container and the window size.
#[wasm_bindgen]
pub fn resize() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1280.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(720.0);

    with_state(|state| {
        let mut s = state.borrow_mut();
        let HostState {
            viewer, anchors, ..
        } = &mut *s;
        if let (Some(viewer), Some(anchors)) = (viewer.as_mut(), anchors.as_ref()) {
            anchors.canvas.set_width(width as u32);
            anchors.canvas.set_height(height as u32);
            viewer.resize(anchors.surface_rect(), [width, height]);
        }
    });
}

#[wasm_bindgen]
pub fn pointer_move(client_x: f64, client_y: f64) {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.pointer_moved(client_x, client_y);
        }
    });
}

#[wasm_bindgen]
pub fn pointer_leave() {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let HostState {
            viewer, tooltip, ..
        } = &mut *s;
        if let (Some(viewer), Some(tooltip)) = (viewer.as_mut(), tooltip.as_mut()) {
            viewer.pointer_left(tooltip);
        }
    });
}

#[wasm_bindgen]
pub fn orbit_begin(client_x: f64, client_y: f64, timestamp_ms: f64) {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.orbit_begin(client_x, client_y, timestamp_ms / 1000.0);
        }
    });
}

#[wasm_bindgen]
pub fn orbit_move(client_x: f64, client_y: f64, timestamp_ms: f64) {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.orbit_move(client_x, client_y, timestamp_ms / 1000.0);
        }
    });
}

#[wasm_bindgen]
pub fn orbit_end() {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.orbit_end();
        }
    });
}

/// Intended usage: call with wheel deltaY.
#[wasm_bindgen]
pub fn zoom(wheel_delta_y: f64) {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.zoom(wheel_delta_y);
        }
    });
}

/// Play/pause button handler. Returns the new playing flag.
#[wasm_bindgen]
pub fn toggle_play() -> bool {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let HostState {
            viewer, anchors, ..
        } = &mut *s;
        let (Some(viewer), Some(anchors)) = (viewer.as_mut(), anchors.as_ref()) else {
            return false;
        };
        let playing = viewer.toggle_play();
        anchors.show_playing(playing);
        playing
    })
}

#[wasm_bindgen]
pub fn timeline_drag_begin() {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.timeline_drag_begin();
        }
    });
}

#[wasm_bindgen]
pub fn timeline_drag_end() {
    with_state(|state| {
        if let Some(viewer) = state.borrow_mut().viewer.as_mut() {
            viewer.timeline_drag_end();
        }
    });
}

/// Slider `input` handler. Returns the year actually selected.
#[wasm_bindgen]
pub fn timeline_input(year: i32) -> i32 {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let HostState {
            viewer, anchors, ..
        } = &mut *s;
        let (Some(viewer), Some(anchors)) = (viewer.as_mut(), anchors.as_ref()) else {
            return year;
        };
        let year = viewer.set_year(year);
        anchors.show_year(year);
        year
    })
}

/// Runs one animation frame; call from `requestAnimationFrame` with its timestamp.
#[wasm_bindgen]
pub fn advance_frame(timestamp_ms: f64) -> Result<(), JsValue> {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let dt_s = match s.last_timestamp_ms {
            Some(prev) if timestamp_ms > prev => ((timestamp_ms - prev) / 1000.0).min(1.0),
            _ => DEFAULT_DT_S,
        };
        s.last_timestamp_ms = Some(timestamp_ms);

        let HostState {
            viewer,
            anchors,
            tooltip,
            ..
        } = &mut *s;
        let (Some(viewer), Some(anchors), Some(tooltip)) =
            (viewer.as_mut(), anchors.as_ref(), tooltip.as_mut())
        else {
            return;
        };

        let out = viewer.render_frame(dt_s, tooltip);
        if let Some(year) = out.year_changed {
            anchors.show_year(year);
        }
        let width = anchors.canvas.width() as f64;
        let height = anchors.canvas.height() as f64;
        canvas::paint(&anchors.context, width, height, &out.render);
    });
    Ok(())
}
