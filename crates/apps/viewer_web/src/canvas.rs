use render::RenderFrame;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

pub const BACKGROUND: &str = "#000000";

/// CSS color for a linear RGBA material color.
pub fn rgba_css(c: [f32; 4]) -> String {
    let r = (c[0].clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (c[1].clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (c[2].clamp(0.0, 1.0) * 255.0).round() as u32;
    let a = c[3].clamp(0.0, 1.0);
    format!("rgba({r},{g},{b},{a})")
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(value),
    );
}

/// Clears the surface and fills every triangle in painter's order.
pub fn paint(ctx: &CanvasRenderingContext2d, width: f64, height: f64, frame: &RenderFrame) {
    ctx_set_fill_style(ctx, BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width, height);

    let mut current = String::new();
    for tri in &frame.triangles {
        let style = rgba_css(tri.color);
        if style != current {
            ctx_set_fill_style(ctx, &style);
            current = style;
        }
        let [a, b, c] = tri.points;
        ctx.begin_path();
        ctx.move_to(a[0], a[1]);
        ctx.line_to(b[0], b[1]);
        ctx.line_to(c[0], c[1]);
        ctx.close_path();
        ctx.fill();
    }
}
