use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_START_YEAR: i32 = 1800;
pub const DEFAULT_END_YEAR: i32 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// One country's series as stored on disk and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryValues {
    #[serde(default)]
    pub iso2: String,
    pub iso3: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<YearValue>,
}

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "read failed: {e}"),
            DatasetError::Json(e) => write!(f, "invalid dataset json: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Inclusive year span requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

impl Default for YearSpan {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_YEAR,
            end: DEFAULT_END_YEAR,
        }
    }
}

impl YearSpan {
    /// Reads `startYear`/`endYear` with case-insensitive keys. Values that do
    /// not parse as integers keep the defaults; an inverted span is swapped.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let lookup = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.trim().parse::<i32>().ok())
        };

        let mut span = YearSpan::default();
        if let Some(start) = lookup("startYear") {
            span.start = start;
        }
        if let Some(end) = lookup("endYear") {
            span.end = end;
        }
        if span.start > span.end {
            warn!(
                start = span.start,
                end = span.end,
                "startYear greater than endYear; swapping"
            );
            std::mem::swap(&mut span.start, &mut span.end);
        }
        span
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    countries: Vec<CountryValues>,
}

impl Dataset {
    pub fn new(countries: Vec<CountryValues>) -> Self {
        Self { countries }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, DatasetError> {
        let countries = serde_json::from_str(payload).map_err(DatasetError::Json)?;
        Ok(Self::new(countries))
    }

    pub async fn load(path: &Path) -> Result<Self, DatasetError> {
        let payload = tokio::fs::read_to_string(path)
            .await
            .map_err(DatasetError::Io)?;
        Self::from_json_str(&payload)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Every country, with values restricted to `span` and ordered by year.
    /// Countries without values in the span are still listed.
    pub fn filtered(&self, span: YearSpan) -> Vec<CountryValues> {
        self.countries
            .iter()
            .map(|c| {
                let mut values: Vec<YearValue> = c
                    .values
                    .iter()
                    .copied()
                    .filter(|v| span.contains(v.year))
                    .collect();
                values.sort_by_key(|v| v.year);
                CountryValues {
                    iso2: c.iso2.clone(),
                    iso3: c.iso3.clone(),
                    name: c.name.clone(),
                    values,
                }
            })
            .collect()
    }
}
