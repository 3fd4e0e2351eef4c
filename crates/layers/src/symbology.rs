use scene::components::Material;

/// 8-bit sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, alpha: f32) -> Material {
        Material::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

pub const RAMP_LOW: Rgb = Rgb::new(255, 0, 0);
pub const RAMP_MID: Rgb = Rgb::new(255, 255, 0);
pub const RAMP_HIGH: Rgb = Rgb::new(0, 128, 0);

/// Red → yellow → dark green, linear per channel within each half.
pub fn ramp_color(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    if t <= 0.5 {
        lerp_rgb(RAMP_LOW, RAMP_MID, t / 0.5)
    } else {
        lerp_rgb(RAMP_MID, RAMP_HIGH, (t - 0.5) / 0.5)
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, s: f64) -> Rgb {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * s).round() as u8;
    Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
}

/// Applied appearance of one rendered feature.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    pub color: [f32; 4],
    /// Extrusion height as a fraction of the globe radius.
    pub lift: f64,
}

impl LayerStyle {
    pub const fn new(visible: bool, color: [f32; 4], lift: f64) -> Self {
        Self {
            visible,
            color,
            lift,
        }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            color: [1.0, 1.0, 1.0, 1.0],
            lift: 0.0,
        }
    }
}

/// Fixed parameters of the choropleth look.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChoroplethStyle {
    pub min_altitude: f64,
    pub max_altitude: f64,
    /// Shared by countries without data and countries without a code.
    pub fallback: LayerStyle,
    pub side: Material,
    pub ocean: Material,
}

impl ChoroplethStyle {
    pub fn altitude_for(&self, t: f64) -> f64 {
        self.min_altitude + t * (self.max_altitude - self.min_altitude)
    }
}

impl Default for ChoroplethStyle {
    fn default() -> Self {
        Self {
            min_altitude: 0.003,
            max_altitude: 0.03,
            fallback: LayerStyle::new(
                true,
                Rgb::new(100, 100, 100).with_alpha(0.6).color,
                0.003,
            ),
            side: Material::from_rgba8(0, 0, 0, 0.2),
            ocean: Material::from_rgba8(10, 26, 51, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChoroplethStyle, RAMP_HIGH, RAMP_LOW, RAMP_MID, Rgb, ramp_color};

    #[test]
    fn ramp_hits_its_stops() {
        assert_eq!(ramp_color(0.0), RAMP_LOW);
        assert_eq!(ramp_color(0.5), RAMP_MID);
        assert_eq!(ramp_color(1.0), RAMP_HIGH);
    }

    #[test]
    fn ramp_interpolates_each_half() {
        assert_eq!(ramp_color(0.25), Rgb::new(255, 128, 0));
        assert_eq!(ramp_color(0.75), Rgb::new(128, 192, 0));
        assert_eq!(ramp_color(-1.0), RAMP_LOW);
        assert_eq!(ramp_color(f64::NAN), RAMP_LOW);
    }

    #[test]
    fn altitude_is_linear_in_rank() {
        let style = ChoroplethStyle::default();
        assert!((style.altitude_for(0.0) - 0.003).abs() < 1e-12);
        assert!((style.altitude_for(1.0) - 0.03).abs() < 1e-12);
        assert!((style.altitude_for(0.5) - 0.0165).abs() < 1e-12);
    }
}
