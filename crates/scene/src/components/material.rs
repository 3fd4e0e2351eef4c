/// Flat surface color, linear RGBA in `0..=1`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
}

impl Material {
    pub const fn new(color: [f32; 4]) -> Self {
        Self { color }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::new([
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            alpha.clamp(0.0, 1.0),
        ])
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0, 1.0])
    }
}
