//! Year selection and playback.
//!
//! The controller owns the selected year and the play/drag flags. Every year
//! change goes through [`YearObserver::year_changed`], which is the only path
//! by which year-dependent visuals are updated.

use foundation::time::YearRange;

use crate::interval::IntervalTimer;

/// Receives the selected year whenever it changes.
pub trait YearObserver {
    fn year_changed(&mut self, year: i32);
}

impl<F: FnMut(i32)> YearObserver for F {
    fn year_changed(&mut self, year: i32) {
        self(year)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
    /// The year slider is held; `resume` records whether play was on.
    Dragging { resume: bool },
}

/// Snapshot of the controller's state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimelineState {
    pub current_year: i32,
    pub is_playing: bool,
    pub is_dragging: bool,
}

#[derive(Debug, Clone)]
pub struct TimelineController {
    range: YearRange,
    current_year: i32,
    playing: bool,
    dragging: bool,
    timer: IntervalTimer,
}

impl TimelineController {
    /// Starts paused at `initial_year` (clamped into `range`).
    pub fn new(range: YearRange, initial_year: i32, tick_period_s: f64) -> Self {
        Self {
            range,
            current_year: range.clamp(initial_year),
            playing: false,
            dragging: false,
            timer: IntervalTimer::new(tick_period_s),
        }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn state(&self) -> TimelineState {
        TimelineState {
            current_year: self.current_year,
            is_playing: self.playing,
            is_dragging: self.dragging,
        }
    }

    pub fn playback(&self) -> PlaybackState {
        match (self.dragging, self.playing) {
            (true, resume) => PlaybackState::Dragging { resume },
            (false, true) => PlaybackState::Playing,
            (false, false) => PlaybackState::Paused,
        }
    }

    /// Pushes the current year to the observer unconditionally.
    ///
    /// Used for the first frame and after the underlying data is replaced.
    pub fn refresh(&self, observer: &mut impl YearObserver) {
        observer.year_changed(self.current_year);
    }

    /// Selects a year (clamped). Notifies only when the year actually changes.
    pub fn set_year(&mut self, year: i32, observer: &mut impl YearObserver) -> i32 {
        let year = self.range.clamp(year);
        if year != self.current_year {
            self.current_year = year;
            observer.year_changed(year);
        }
        self.current_year
    }

    /// Advances one year, wrapping from the last year back to the first.
    pub fn step(&mut self, observer: &mut impl YearObserver) -> i32 {
        let next = self.range.next_wrapping(self.current_year);
        self.set_year(next, observer)
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.sync_timer();
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.sync_timer();
    }

    /// Flips play/pause and returns the new playing flag.
    pub fn toggle_play(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.sync_timer();
    }

    /// Ends a slider drag; the timer resumes only if play was on.
    pub fn end_drag(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.sync_timer();
    }

    /// Feeds a frame delta to the year timer.
    pub fn tick(&mut self, dt_s: f64, observer: &mut impl YearObserver) -> Option<i32> {
        if self.timer.advance(dt_s) {
            Some(self.step(observer))
        } else {
            None
        }
    }

    fn sync_timer(&mut self) {
        let should_run = self.playing && !self.dragging;
        // Always cancel before (re)starting so two schedules never overlap.
        self.timer.cancel();
        if should_run {
            self.timer.start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlaybackState, TimelineController, TimelineState};
    use foundation::time::YearRange;
    use pretty_assertions::assert_eq;

    fn controller() -> TimelineController {
        TimelineController::new(YearRange::new(2000, 2002), 2000, 1.0)
    }

    #[test]
    fn playing_advances_once_per_tick_and_wraps() {
        let mut seen = Vec::new();
        let mut observer = |y: i32| seen.push(y);
        let mut tl = controller();
        tl.play();
        for _ in 0..4 {
            tl.tick(1.0, &mut observer);
        }
        assert_eq!(seen, vec![2001, 2002, 2000, 2001]);
    }

    #[test]
    fn paused_does_not_advance() {
        let mut calls = 0;
        let mut observer = |_: i32| calls += 1;
        let mut tl = controller();
        assert_eq!(tl.tick(5.0, &mut observer), None);
        assert_eq!(calls, 0);
        assert_eq!(tl.playback(), PlaybackState::Paused);
    }

    #[test]
    fn drag_suspends_and_resumes_only_if_playing() {
        let mut noop = |_: i32| {};
        let mut tl = controller();
        tl.play();
        tl.begin_drag();
        assert_eq!(tl.playback(), PlaybackState::Dragging { resume: true });
        assert!(!tl.timer_running());
        assert_eq!(tl.tick(3.0, &mut noop), None);
        tl.end_drag();
        assert_eq!(tl.playback(), PlaybackState::Playing);
        assert!(tl.timer_running());

        tl.pause();
        tl.begin_drag();
        tl.end_drag();
        assert_eq!(tl.playback(), PlaybackState::Paused);
        assert!(!tl.timer_running());
    }

    #[test]
    fn slider_input_during_drag_notifies_and_clamps() {
        let mut seen = Vec::new();
        let mut observer = |y: i32| seen.push(y);
        let mut tl = controller();
        tl.begin_drag();
        tl.set_year(2001, &mut observer);
        tl.set_year(2001, &mut observer);
        tl.set_year(1900, &mut observer);
        assert_eq!(seen, vec![2001, 2000]);
        assert_eq!(
            tl.state(),
            TimelineState {
                current_year: 2000,
                is_playing: false,
                is_dragging: true,
            }
        );
    }

    #[test]
    fn toggle_restarts_timer_from_zero() {
        let mut seen = Vec::new();
        let mut observer = |y: i32| seen.push(y);
        let mut tl = controller();
        assert!(tl.toggle_play());
        tl.tick(0.9, &mut observer);
        assert!(!tl.toggle_play());
        assert!(tl.toggle_play());
        assert_eq!(tl.tick(0.5, &mut observer), None);
        assert_eq!(tl.tick(0.5, &mut observer), Some(2001));
        assert_eq!(seen, vec![2001]);
    }

    #[test]
    fn refresh_always_notifies() {
        let mut seen = Vec::new();
        let mut observer = |y: i32| seen.push(y);
        let tl = controller();
        tl.refresh(&mut observer);
        assert_eq!(seen, vec![2000]);
    }
}
