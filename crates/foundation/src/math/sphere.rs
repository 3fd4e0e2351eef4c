use super::Vec3;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Unit-sphere direction for a geographic position.
///
/// Scene convention: +Y is the north pole, (lon 0, lat 0) faces +Z and
/// longitude increases towards +X.
pub fn lon_lat_to_unit(p: LonLat) -> Vec3 {
    let phi = (90.0 - p.lat_deg).to_radians();
    let theta = (90.0 - p.lon_deg).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin())
}

pub fn unit_to_lon_lat(v: Vec3) -> LonLat {
    let v = v.normalize_or_self();
    let lat = v.y.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.x.atan2(v.z).to_degrees();
    LonLat::new(lon, lat)
}

/// Tangent-plane basis (east, north) at a unit-sphere direction.
pub fn tangent_basis(up: Vec3) -> (Vec3, Vec3) {
    let reference = if up.y.abs() < 0.99 { Vec3::Y } else { Vec3::Z };
    let east = reference.cross(up).normalize_or_self();
    let north = up.cross(east);
    (east, north)
}

#[cfg(test)]
mod tests {
    use super::{LonLat, lon_lat_to_unit, tangent_basis, unit_to_lon_lat};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn axes_follow_scene_convention() {
        let front = lon_lat_to_unit(LonLat::new(0.0, 0.0));
        assert_close(front.z, 1.0);
        let east = lon_lat_to_unit(LonLat::new(90.0, 0.0));
        assert_close(east.x, 1.0);
        let north = lon_lat_to_unit(LonLat::new(0.0, 90.0));
        assert_close(north.y, 1.0);
    }

    #[test]
    fn lon_lat_round_trip() {
        let p = LonLat::new(18.07, 59.33);
        let back = unit_to_lon_lat(lon_lat_to_unit(p));
        assert_close(back.lon_deg, p.lon_deg);
        assert_close(back.lat_deg, p.lat_deg);
    }

    #[test]
    fn tangent_basis_is_orthonormal() {
        let up = lon_lat_to_unit(LonLat::new(30.0, 45.0));
        let (east, north) = tangent_basis(up);
        assert_close(east.dot(up), 0.0);
        assert_close(north.dot(up), 0.0);
        assert_close(east.dot(north), 0.0);
        assert_close(east.length(), 1.0);
        // East points towards increasing longitude.
        let step = lon_lat_to_unit(LonLat::new(30.1, 45.0)) - up;
        assert!(step.dot(east) > 0.0);
    }
}
