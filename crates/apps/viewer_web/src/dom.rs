use foundation::bounds::ScreenRect;
use viewer::tooltip::TooltipSink;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement,
};

pub const GLOBE_CONTAINER_ID: &str = "globe";
pub const YEAR_SLIDER_ID: &str = "year-slider";
pub const YEAR_LABEL_ID: &str = "year-label";
pub const PLAY_BUTTON_ID: &str = "play-pause-button";

#[derive(Debug)]
pub enum InitError {
    /// A required page element is absent.
    MissingContainer(&'static str),
    Canvas(String),
    Config(String),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::MissingContainer(id) => write!(f, "missing #{id} element"),
            InitError::Canvas(e) => write!(f, "canvas setup failed: {e}"),
            InitError::Config(e) => write!(f, "invalid viewer config: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

impl From<InitError> for JsValue {
    fn from(e: InitError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

pub fn document() -> Result<Document, InitError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(InitError::MissingContainer("document"))
}

fn require(document: &Document, id: &'static str) -> Result<Element, InitError> {
    document
        .get_element_by_id(id)
        .ok_or(InitError::MissingContainer(id))
}

fn require_as<T: JsCast>(document: &Document, id: &'static str) -> Result<T, InitError> {
    require(document, id)?
        .dyn_into::<T>()
        .map_err(|_| InitError::MissingContainer(id))
}

/// Page elements the viewer draws into and mirrors state onto.
#[derive(Debug, Clone)]
pub struct Anchors {
    pub canvas: HtmlCanvasElement,
    pub context: CanvasRenderingContext2d,
    pub slider: HtmlInputElement,
    pub year_label: Element,
    pub play_button: Element,
}

impl Anchors {
    /// Looks up the required elements and appends a canvas to the globe container.
    pub fn locate(document: &Document) -> Result<Self, InitError> {
        let container = require(document, GLOBE_CONTAINER_ID)?;
        let slider = require_as::<HtmlInputElement>(document, YEAR_SLIDER_ID)?;
        let year_label = require(document, YEAR_LABEL_ID)?;
        let play_button = require(document, PLAY_BUTTON_ID)?;

        let canvas = document
            .create_element("canvas")
            .map_err(|e| InitError::Canvas(format!("{e:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| InitError::Canvas("created element is not a canvas".to_string()))?;
        container
            .append_child(&canvas)
            .map_err(|e| InitError::Canvas(format!("{e:?}")))?;
        let context = canvas
            .get_context("2d")
            .map_err(|e| InitError::Canvas(format!("{e:?}")))?
            .ok_or_else(|| InitError::Canvas("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| InitError::Canvas("unexpected context type".to_string()))?;

        Ok(Self {
            canvas,
            context,
            slider,
            year_label,
            play_button,
        })
    }

    pub fn surface_rect(&self) -> ScreenRect {
        let r = self.canvas.get_bounding_client_rect();
        ScreenRect::new(r.left(), r.top(), r.width(), r.height())
    }

    pub fn configure_slider(&self, min: i32, max: i32) {
        self.slider.set_min(&min.to_string());
        self.slider.set_max(&max.to_string());
    }

    pub fn show_year(&self, year: i32) {
        self.slider.set_value(&year.to_string());
        self.year_label.set_text_content(Some(&year.to_string()));
    }

    pub fn show_playing(&self, playing: bool) {
        let (text, label) = if playing {
            ("❚❚", "Pause animation")
        } else {
            ("▶", "Play animation")
        };
        self.play_button.set_text_content(Some(text));
        let _ = self.play_button.set_attribute("aria-label", label);
    }
}

/// Absolutely positioned tooltip element appended to the page body.
#[derive(Debug, Clone)]
pub struct DomTooltip {
    element: HtmlElement,
}

impl DomTooltip {
    pub fn create(document: &Document) -> Result<Self, InitError> {
        let element = document
            .create_element("div")
            .map_err(|e| InitError::Canvas(format!("{e:?}")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| InitError::Canvas("tooltip is not an HTML element".to_string()))?;
        element.set_class_name("globe-tooltip");
        let style = element.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("display", "none");
        let body = document.body().ok_or(InitError::MissingContainer("body"))?;
        body.append_child(&element)
            .map_err(|e| InitError::Canvas(format!("{e:?}")))?;
        Ok(Self { element })
    }
}

impl TooltipSink for DomTooltip {
    fn set_lines(&mut self, lines: &[String]) {
        let html: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
        self.element.set_inner_html(&html.join("<br/>"));
    }

    fn size(&self) -> [f64; 2] {
        let r = self.element.get_bounding_client_rect();
        [r.width(), r.height()]
    }

    fn place(&mut self, left: f64, top: f64) {
        let style = self.element.style();
        let _ = style.set_property("left", &format!("{left}px"));
        let _ = style.set_property("top", &format!("{top}px"));
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        let _ = self.element.style().set_property("display", display);
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
