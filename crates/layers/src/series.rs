use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::country::CountryCode;

const CODE_KEYS: [&str; 5] = ["iso3", "Iso3", "ISO3", "countryCode", "CountryCode"];
const NAME_KEYS: [&str; 2] = ["name", "Name"];
const VALUES_KEYS: [&str; 2] = ["values", "Values"];
const YEAR_KEYS: [&str; 2] = ["year", "Year"];
const VALUE_KEYS: [&str; 2] = ["value", "Value"];

#[derive(Debug)]
pub enum SeriesError {
    Json(String),
    NotAnArray,
}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesError::Json(e) => write!(f, "series JSON parse error: {e}"),
            SeriesError::NotAnArray => write!(f, "series payload must be an array of records"),
        }
    }
}

impl std::error::Error for SeriesError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    MissingCode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub code: CountryCode,
    pub name: Option<String>,
    pub values: BTreeMap<i32, f64>,
    /// Year/value entries dropped because a field was missing or mistyped.
    pub dropped_entries: usize,
}

/// One backend record after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    WellFormed(SeriesRecord),
    Skipped(SkipReason),
}

impl DecodedRecord {
    pub fn decode(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return DecodedRecord::Skipped(SkipReason::NotAnObject);
        };
        let Some(code) = field(obj, &CODE_KEYS)
            .and_then(Value::as_str)
            .and_then(CountryCode::normalize)
        else {
            return DecodedRecord::Skipped(SkipReason::MissingCode);
        };
        let name = field(obj, &NAME_KEYS)
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut values = BTreeMap::new();
        let mut dropped_entries = 0;
        if let Some(entries) = field(obj, &VALUES_KEYS).and_then(Value::as_array) {
            for entry in entries {
                match decode_entry(entry) {
                    Some((year, v)) => {
                        values.insert(year, v);
                    }
                    None => dropped_entries += 1,
                }
            }
        }

        DecodedRecord::WellFormed(SeriesRecord {
            code,
            name,
            values,
            dropped_entries,
        })
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn decode_entry(entry: &Value) -> Option<(i32, f64)> {
    let obj = entry.as_object()?;
    let year = field(obj, &YEAR_KEYS)?;
    let year = match year.as_i64() {
        Some(y) => y,
        None => {
            let y = year.as_f64()?;
            if y.fract() != 0.0 {
                return None;
            }
            y as i64
        }
    };
    let year = i32::try_from(year).ok()?;
    let value = field(obj, &VALUE_KEYS)?.as_f64()?;
    value.is_finite().then_some((year, value))
}

/// Totals for one ingest.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub countries: usize,
    pub records: usize,
    pub skipped_records: usize,
    pub dropped_entries: usize,
}

/// Sparse `country -> year -> value` lookup.
///
/// Loading replaces the whole table and bumps [`TimeSeriesIndex::generation`],
/// which lets derived caches notice the change.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesIndex {
    series: BTreeMap<CountryCode, BTreeMap<i32, f64>>,
    names: BTreeMap<CountryCode, String>,
    generation: u64,
}

impl TimeSeriesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table with the records in `payload`. On error the table is left as it was.
    pub fn load_json_str(&mut self, payload: &str) -> Result<IngestSummary, SeriesError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| SeriesError::Json(e.to_string()))?;
        let records = value.as_array().ok_or(SeriesError::NotAnArray)?;
        Ok(self.load_records(records.iter().map(DecodedRecord::decode)))
    }

    pub fn load_records(&mut self, records: impl IntoIterator<Item = DecodedRecord>) -> IngestSummary {
        let mut series: BTreeMap<CountryCode, BTreeMap<i32, f64>> = BTreeMap::new();
        let mut names = BTreeMap::new();
        let mut summary = IngestSummary::default();

        for record in records {
            summary.records += 1;
            let record = match record {
                DecodedRecord::WellFormed(record) => record,
                DecodedRecord::Skipped(reason) => {
                    debug!(?reason, "series record skipped");
                    summary.skipped_records += 1;
                    continue;
                }
            };
            summary.dropped_entries += record.dropped_entries;
            if let Some(name) = record.name {
                names.insert(record.code.clone(), name);
            }
            // Repeated codes merge; later entries win per year.
            series.entry(record.code).or_default().extend(record.values);
        }

        summary.countries = series.len();
        self.series = series;
        self.names = names;
        self.generation += 1;
        debug!(
            countries = summary.countries,
            skipped = summary.skipped_records,
            dropped = summary.dropped_entries,
            "series loaded"
        );
        summary
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.names.clear();
        self.generation += 1;
    }

    pub fn value(&self, code: &CountryCode, year: i32) -> Option<f64> {
        self.series.get(code)?.get(&year).copied()
    }

    pub fn years(&self, code: &CountryCode) -> Option<&BTreeMap<i32, f64>> {
        self.series.get(code)
    }

    pub fn name(&self, code: &CountryCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.series.contains_key(code)
    }

    /// Every country with an entry for `year`, in code order.
    pub fn year_values(&self, year: i32) -> impl Iterator<Item = (&CountryCode, f64)> {
        self.series
            .iter()
            .filter_map(move |(code, years)| years.get(&year).map(|v| (code, *v)))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodedRecord, IngestSummary, SeriesError, SkipReason, TimeSeriesIndex};
    use crate::country::CountryCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn code(raw: &str) -> CountryCode {
        CountryCode::normalize(raw).expect("code")
    }

    #[test]
    fn accepts_both_field_casings() {
        let mut index = TimeSeriesIndex::new();
        let payload = r#"[
            {"iso3": "swe", "name": "Sweden", "values": [{"year": 2020, "value": 60000.5}]},
            {"CountryCode": "FIN", "Name": "Finland", "Values": [{"Year": 2020, "Value": 50000}]}
        ]"#;
        let summary = index.load_json_str(payload).expect("load");
        assert_eq!(summary.countries, 2);
        assert_eq!(index.value(&code("SWE"), 2020), Some(60000.5));
        assert_eq!(index.value(&code("fin"), 2020), Some(50000.0));
        assert_eq!(index.name(&code("FIN")), Some("Finland"));
        assert_eq!(index.value(&code("SWE"), 2019), None);
    }

    #[test]
    fn drops_malformed_entries_only() {
        let mut index = TimeSeriesIndex::new();
        let payload = r#"[
            {"iso3": "NOR", "values": [
                {"year": 2019, "value": 1.0},
                {"year": "2020", "value": 2.0},
                {"year": 2021.5, "value": 3.0},
                {"year": 2022, "value": null},
                {"value": 4.0},
                {"year": 2023.0, "value": 5.0}
            ]},
            {"name": "Nowhere", "values": []},
            "garbage"
        ]"#;
        let summary = index.load_json_str(payload).expect("load");
        assert_eq!(
            summary,
            IngestSummary {
                countries: 1,
                records: 3,
                skipped_records: 2,
                dropped_entries: 4,
            }
        );
        let years: Vec<(i32, f64)> = index
            .years(&code("NOR"))
            .expect("years")
            .iter()
            .map(|(y, v)| (*y, *v))
            .collect();
        assert_eq!(years, vec![(2019, 1.0), (2023, 5.0)]);
    }

    #[test]
    fn record_without_values_is_present_and_empty() {
        let mut index = TimeSeriesIndex::new();
        index
            .load_json_str(r#"[{"iso3": "DNK", "name": "Denmark"}]"#)
            .expect("load");
        assert!(index.contains(&code("DNK")));
        assert!(index.years(&code("DNK")).expect("years").is_empty());
    }

    #[test]
    fn duplicate_records_merge() {
        let mut index = TimeSeriesIndex::new();
        index
            .load_json_str(
                r#"[
                {"iso3": "ISL", "values": [{"year": 2000, "value": 1}, {"year": 2001, "value": 2}]},
                {"iso3": "isl", "values": [{"year": 2001, "value": 3}]}
            ]"#,
            )
            .expect("load");
        assert_eq!(index.len(), 1);
        assert_eq!(index.value(&code("ISL"), 2000), Some(1.0));
        assert_eq!(index.value(&code("ISL"), 2001), Some(3.0));
    }

    #[test]
    fn rejects_non_arrays_and_keeps_previous_table() {
        let mut index = TimeSeriesIndex::new();
        index
            .load_json_str(r#"[{"iso3": "SWE", "values": [{"year": 2020, "value": 1}]}]"#)
            .expect("load");
        let generation = index.generation();

        assert!(matches!(
            index.load_json_str(r#"{"iso3": "SWE"}"#),
            Err(SeriesError::NotAnArray)
        ));
        assert!(matches!(index.load_json_str("[{"), Err(SeriesError::Json(_))));
        assert_eq!(index.generation(), generation);
        assert_eq!(index.value(&code("SWE"), 2020), Some(1.0));
    }

    #[test]
    fn decode_reports_skip_reasons() {
        assert_eq!(
            DecodedRecord::decode(&json!(42)),
            DecodedRecord::Skipped(SkipReason::NotAnObject)
        );
        assert_eq!(
            DecodedRecord::decode(&json!({"iso3": "  "})),
            DecodedRecord::Skipped(SkipReason::MissingCode)
        );
    }

    #[test]
    fn year_values_and_clear() {
        let mut index = TimeSeriesIndex::new();
        index
            .load_json_str(
                r#"[
                {"iso3": "SWE", "values": [{"year": 2020, "value": 3}]},
                {"iso3": "FIN", "values": [{"year": 2020, "value": 2}, {"year": 2021, "value": 9}]}
            ]"#,
            )
            .expect("load");
        let year: Vec<(String, f64)> = index
            .year_values(2020)
            .map(|(c, v)| (c.to_string(), v))
            .collect();
        assert_eq!(year, vec![("FIN".to_string(), 2.0), ("SWE".to_string(), 3.0)]);

        let generation = index.generation();
        index.clear();
        assert!(index.is_empty());
        assert!(index.generation() > generation);
    }
}
