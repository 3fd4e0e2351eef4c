use foundation::time::Time;

/// Per-frame metadata.
///
/// `new` builds a fixed-step frame (replayable); `advance` follows the host's
/// measured frame delta, as the browser animation loop does.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time of this frame (seconds).
    pub dt_s: f64,
    /// Engine time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Next frame with a host-measured delta. Negative or non-finite deltas count as zero.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: Time(self.time.0 + self.dt_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn advance_accumulates_variable_deltas() {
        let f = Frame::new(0, 0.25).advance(0.5).advance(f64::NAN);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time(0.75));
        assert_eq!(f.dt_s, 0.0);
    }
}
