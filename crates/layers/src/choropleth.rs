use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::country::CountryCode;
use crate::series::TimeSeriesIndex;
use crate::symbology::{ChoroplethStyle, Rgb, ramp_color};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CountryVisual {
    pub color: Rgb,
    /// Fraction of the globe radius.
    pub altitude: f64,
    /// Log-scaled position of the value among the year's values, in `[0, 1]`.
    pub rank: f64,
}

/// Visual attributes of every country with plottable data in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearColorFrame {
    year: i32,
    entries: BTreeMap<CountryCode, CountryVisual>,
}

impl YearColorFrame {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn get(&self, code: &CountryCode) -> Option<&CountryVisual> {
        self.entries.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CountryCode, &CountryVisual)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compute(index: &TimeSeriesIndex, year: i32, style: &ChoroplethStyle) -> Self {
        // ln is undefined at zero; non-positive values are not plottable.
        let logs: Vec<(CountryCode, f64)> = index
            .year_values(year)
            .filter(|(_, v)| *v > 0.0)
            .map(|(code, v)| (code.clone(), v.ln()))
            .collect();

        let (min, max) = logs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, l)| {
                (lo.min(*l), hi.max(*l))
            });
        let range = if max > min { max - min } else { 1.0 };

        let entries = logs
            .into_iter()
            .map(|(code, l)| {
                let rank = ((l - min) / range).clamp(0.0, 1.0);
                let visual = CountryVisual {
                    color: ramp_color(rank),
                    altitude: style.altitude_for(rank),
                    rank,
                };
                (code, visual)
            })
            .collect();

        Self { year, entries }
    }
}

/// Lazily computes and memoizes one [`YearColorFrame`] per year.
///
/// The cache belongs to one generation of the series index; frames are dropped
/// automatically when a different generation is passed in.
#[derive(Debug, Clone, Default)]
pub struct ChoroplethEngine {
    style: ChoroplethStyle,
    cache: HashMap<i32, YearColorFrame>,
    generation: Option<u64>,
}

impl ChoroplethEngine {
    pub fn new(style: ChoroplethStyle) -> Self {
        Self {
            style,
            cache: HashMap::new(),
            generation: None,
        }
    }

    pub fn style(&self) -> &ChoroplethStyle {
        &self.style
    }

    pub fn map_for_year(&mut self, index: &TimeSeriesIndex, year: i32) -> &YearColorFrame {
        if self.generation != Some(index.generation()) {
            self.reset();
            self.generation = Some(index.generation());
        }
        let style = &self.style;
        self.cache.entry(year).or_insert_with(|| {
            let frame = YearColorFrame::compute(index, year, style);
            debug!(year, countries = frame.len(), "color frame computed");
            frame
        })
    }

    pub fn reset(&mut self) {
        self.cache.clear();
        self.generation = None;
    }

    pub fn cached_years(&self) -> usize {
        self.cache.len()
    }
}
