/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 3]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Aabb3::new(first, first);
        for p in iter {
            out.include(p);
        }
        Some(out)
    }

    pub fn include(&mut self, p: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }
}

/// Screen-space rectangle in CSS pixels (as returned by a bounding client rect).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }

    /// Viewport pixel coordinates to normalized device coordinates (y up).
    pub fn to_ndc(&self, x_px: f64, y_px: f64) -> Option<[f64; 2]> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = ((x_px - self.left) / self.width) * 2.0 - 1.0;
        let y = -((y_px - self.top) / self.height) * 2.0 + 1.0;
        Some([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb3, ScreenRect};

    #[test]
    fn from_points_spans_all_corners() {
        let a = Aabb3::from_points([[0.0, 0.0, 0.0], [1.0, 2.0, -1.0]]).expect("non-empty");
        assert_eq!(a.min, [0.0, 0.0, -1.0]);
        assert_eq!(a.max, [1.0, 2.0, 0.0]);
        assert_eq!(Aabb3::from_points(a.corners()), Some(a));
        assert!(Aabb3::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn ndc_uses_rect_offset() {
        let rect = ScreenRect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.to_ndc(200.0, 100.0), Some([0.0, 0.0]));
        assert_eq!(rect.to_ndc(100.0, 50.0), Some([-1.0, 1.0]));
        assert_eq!(rect.to_ndc(300.0, 150.0), Some([1.0, -1.0]));
        assert_eq!(ScreenRect::new(0.0, 0.0, 0.0, 10.0).to_ndc(1.0, 1.0), None);
    }
}
