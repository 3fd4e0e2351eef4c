//! Deterministic float ordering.
//!
//! Pick hits and painter's-order triangles are sorted through
//! [`stable_total_cmp_f64`] so that equal keys resolve the same way every run.

use core::cmp::Ordering;

/// Total order over floats with `-0.0 == 0.0` and a single NaN class sorted last.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    let canon = |v: f64| {
        if v == 0.0 {
            0.0
        } else if v.is_nan() {
            f64::NAN
        } else {
            v
        }
    };
    canon(a).total_cmp(&canon(b))
}
