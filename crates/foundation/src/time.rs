/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Time(pub f64); // seconds

/// Inclusive range of whole years the timeline may select.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Builds a range; bounds given in reverse order are swapped.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    /// The year after `year`, wrapping past `max` back to `min`.
    pub fn next_wrapping(&self, year: i32) -> i32 {
        if year >= self.max || year < self.min {
            self.min
        } else {
            year + 1
        }
    }
}
