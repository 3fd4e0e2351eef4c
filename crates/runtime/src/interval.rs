/// Cancelable periodic timer driven by frame deltas.
///
/// Starting an already running timer restarts it from zero, so at most one
/// schedule is ever active. Fires at most once per `advance`; time beyond a
/// second period is discarded rather than replayed as a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    period_s: f64,
    elapsed_s: f64,
    running: bool,
}

impl IntervalTimer {
    pub fn new(period_s: f64) -> Self {
        let period_s = if period_s.is_finite() && period_s > 0.0 {
            period_s
        } else {
            1.0
        };
        Self {
            period_s,
            elapsed_s: 0.0,
            running: false,
        }
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.cancel();
        self.running = true;
    }

    pub fn cancel(&mut self) {
        self.running = false;
        self.elapsed_s = 0.0;
    }

    /// Returns true when the period elapsed during this step.
    pub fn advance(&mut self, dt_s: f64) -> bool {
        if !self.running || !dt_s.is_finite() || dt_s <= 0.0 {
            return false;
        }
        self.elapsed_s += dt_s;
        if self.elapsed_s < self.period_s {
            return false;
        }
        self.elapsed_s = (self.elapsed_s - self.period_s) % self.period_s;
        true
    }
}
