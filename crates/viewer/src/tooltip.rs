//! Hover tooltip: text, placement and show/hide transitions.
//!
//! The presenter drives any [`TooltipSink`]; the web host implements it with
//! a positioned DOM element, tests with a recorder.

pub const NO_DATA: &str = "No data";

/// Formats `value` with en-US digit grouping and no fraction digits.
pub fn format_value(value: f64, prefix: &str) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{prefix}{sign}{grouped}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub name: String,
    pub year: i32,
    pub value: Option<f64>,
}

impl TooltipContent {
    /// Name, year and value, one per line.
    pub fn lines(&self, prefix: &str) -> [String; 3] {
        let value = match self.value {
            Some(v) => format_value(v, prefix),
            None => NO_DATA.to_string(),
        };
        [self.name.clone(), self.year.to_string(), value]
    }
}

/// Top-left corner for a box of `size` near `pointer`, kept inside `viewport`.
///
/// The box sits `offset` pixels below-right of the pointer and flips to the
/// other side when it would come within `padding` of the right or bottom edge.
pub fn place(pointer: [f64; 2], size: [f64; 2], viewport: [f64; 2], offset: f64, padding: f64) -> [f64; 2] {
    let mut x = pointer[0] + offset;
    let mut y = pointer[1] + offset;
    if x + size[0] + padding > viewport[0] {
        x = pointer[0] - size[0] - offset;
    }
    if y + size[1] + padding > viewport[1] {
        y = pointer[1] - size[1] - offset;
    }
    [x, y]
}

/// Output side of the tooltip.
pub trait TooltipSink {
    fn set_lines(&mut self, lines: &[String]);
    /// Rendered box size in pixels, after the latest `set_lines`.
    fn size(&self) -> [f64; 2];
    fn place(&mut self, left: f64, top: f64);
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone)]
pub struct TooltipPresenter {
    offset: f64,
    padding: f64,
    prefix: String,
    visible: bool,
    content: Option<TooltipContent>,
}

impl TooltipPresenter {
    pub fn new(offset: f64, padding: f64, prefix: impl Into<String>) -> Self {
        Self {
            offset,
            padding,
            prefix: prefix.into(),
            visible: false,
            content: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    /// Shows `content` next to `pointer`. Text is rewritten only when it changes.
    pub fn show(
        &mut self,
        sink: &mut impl TooltipSink,
        content: TooltipContent,
        pointer: [f64; 2],
        viewport: [f64; 2],
    ) {
        if self.content.as_ref() != Some(&content) {
            sink.set_lines(&content.lines(&self.prefix));
            self.content = Some(content);
        }
        if !self.visible {
            sink.set_visible(true);
            self.visible = true;
        }
        let [left, top] = place(pointer, sink.size(), viewport, self.offset, self.padding);
        sink.place(left, top);
    }

    pub fn hide(&mut self, sink: &mut impl TooltipSink) {
        if self.visible {
            sink.set_visible(false);
            self.visible = false;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{TooltipContent, TooltipPresenter, TooltipSink, format_value, place};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub lines: Vec<String>,
        pub position: Option<[f64; 2]>,
        pub visible: bool,
        pub shows: usize,
        pub hides: usize,
        pub text_writes: usize,
    }

    impl TooltipSink for RecordingSink {
        fn set_lines(&mut self, lines: &[String]) {
            self.lines = lines.to_vec();
            self.text_writes += 1;
        }

        fn size(&self) -> [f64; 2] {
            [120.0, 60.0]
        }

        fn place(&mut self, left: f64, top: f64) {
            self.position = Some([left, top]);
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
            if visible {
                self.shows += 1;
            } else {
                self.hides += 1;
            }
        }
    }

    #[test]
    fn formats_like_en_us() {
        assert_eq!(format_value(52341.4, "$"), "$52,341");
        assert_eq!(format_value(999.5, "$"), "$1,000");
        assert_eq!(format_value(1234567.0, ""), "1,234,567");
        assert_eq!(format_value(12.0, "$"), "$12");
        assert_eq!(format_value(-4321.0, "$"), "$-4,321");
        assert_eq!(format_value(-0.2, "$"), "$0");
    }

    #[test]
    fn lines_fall_back_to_no_data() {
        let content = TooltipContent {
            name: "Sweden".to_string(),
            year: 2020,
            value: None,
        };
        assert_eq!(content.lines("$"), ["Sweden".to_string(), "2020".to_string(), "No data".to_string()]);
    }

    #[test]
    fn placement_flips_near_edges() {
        let viewport = [800.0, 600.0];
        assert_eq!(place([100.0, 100.0], [120.0, 60.0], viewport, 12.0, 10.0), [112.0, 112.0]);
        assert_eq!(place([700.0, 100.0], [120.0, 60.0], viewport, 12.0, 10.0), [568.0, 112.0]);
        assert_eq!(place([100.0, 560.0], [120.0, 60.0], viewport, 12.0, 10.0), [112.0, 488.0]);
    }

    #[test]
    fn visibility_changes_once_per_transition() {
        let mut sink = RecordingSink::default();
        let mut presenter = TooltipPresenter::new(12.0, 10.0, "$");
        let content = TooltipContent {
            name: "Finland".to_string(),
            year: 2020,
            value: Some(50000.0),
        };

        presenter.hide(&mut sink);
        for _ in 0..3 {
            presenter.show(&mut sink, content.clone(), [50.0, 50.0], [800.0, 600.0]);
        }
        presenter.hide(&mut sink);
        presenter.hide(&mut sink);

        assert_eq!(sink.shows, 1);
        assert_eq!(sink.hides, 1);
        assert_eq!(sink.text_writes, 1);
        assert_eq!(sink.lines[2], "$50,000");
        assert_eq!(sink.position, Some([62.0, 62.0]));
        assert!(!presenter.is_visible());
    }
}
