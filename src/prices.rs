//! Price history loading.
//!
//! History lives in a CSV file with a header row and `date,price` records.
//! The date column holds either an ISO date (`2024-05-01`) or a Unix
//! timestamp in milliseconds, as exported by most market data APIs. Lines
//! starting with `#` are comments.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate, TimeZone};
use memmap2::MmapOptions;
use tracing::{error, info};

use crate::date_utils::day_before;
use crate::events::Sample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

impl From<PricePoint> for Sample<f64> {
    fn from(point: PricePoint) -> Self {
        Sample::new(point.date, point.price)
    }
}

/// Wrap price points as samples for event extraction
pub fn to_samples(points: &[PricePoint]) -> Vec<Sample<f64>> {
    points.iter().copied().map(Sample::from).collect()
}

// Error handling for price history loading
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("Failed to open price file {path}: {source}")]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Memory mapping failed: {0}")]
    MmapError(std::io::Error),

    #[error("Price file {0} is empty")]
    Empty(PathBuf),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Row {row}: expected date and price columns")]
    MissingField { row: usize },

    #[error("Row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: invalid price '{value}'")]
    InvalidPrice { row: usize, value: String },
}

/// Collaborator that supplies an ascending price history
pub trait PriceSource {
    /// Points dated within `lookback_days` before `as_of`, empty on failure
    fn fetch(&self, as_of: NaiveDate, lookback_days: u32) -> Vec<PricePoint>;
}

/// Price history backed by a memory-mapped CSV file
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch(&self, as_of: NaiveDate, lookback_days: u32) -> Vec<PricePoint> {
        let start = Instant::now();
        match load_prices(&self.path, as_of, lookback_days) {
            Ok(points) => {
                info!(
                    target: "price_loading",
                    "Loaded {} price points from {} in {}µs",
                    points.len(),
                    self.path.display(),
                    start.elapsed().as_micros()
                );
                points
            }
            Err(e) => {
                error!(
                    target: "price_loading",
                    "Failed to load price history from {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Load and window a CSV price history file
pub fn load_prices(
    path: &Path,
    as_of: NaiveDate,
    lookback_days: u32,
) -> Result<Vec<PricePoint>, PriceError> {
    let file = File::open(path).map_err(|source| PriceError::FileError {
        path: path.to_path_buf(),
        source,
    })?;

    let len = file
        .metadata()
        .map_err(|source| PriceError::FileError {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if len == 0 {
        return Err(PriceError::Empty(path.to_path_buf()));
    }

    // Read-only map, the file is not modified while we parse it
    let mmap = unsafe { MmapOptions::new().map(&file).map_err(PriceError::MmapError)? };

    parse_prices(&mmap[..], as_of, lookback_days)
}

/// Parse CSV bytes into ascending price points within the lookback window
pub fn parse_prices(
    bytes: &[u8],
    as_of: NaiveDate,
    lookback_days: u32,
) -> Result<Vec<PricePoint>, PriceError> {
    let earliest = day_before(as_of, lookback_days);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(bytes);

    let mut points = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based line of the record in the file
        let row = record
            .position()
            .map_or(index + 2, |position| position.line() as usize);

        let (date_field, price_field) = match (record.get(0), record.get(1)) {
            (Some(date), Some(price)) => (date, price),
            _ => return Err(PriceError::MissingField { row }),
        };

        let date = parse_date(date_field).ok_or_else(|| PriceError::InvalidDate {
            row,
            value: date_field.to_string(),
        })?;
        let price = price_field
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| PriceError::InvalidPrice {
                row,
                value: price_field.to_string(),
            })?;

        let too_old = earliest.map_or(false, |earliest| date < earliest);
        if too_old || date > as_of {
            continue;
        }
        points.push(PricePoint::new(date, price));
    }

    points.sort_by_key(|point| point.date);
    Ok(points)
}

// ISO date, or Unix milliseconds read as a local civil date
fn parse_date(field: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(field, "%Y-%m-%d") {
        return Some(date);
    }
    let millis = field.parse::<i64>().ok()?;
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|datetime| datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_dates_and_sorts() {
        let csv = b"date,price\n2024-01-03,103.5\n2024-01-01,101\n2024-01-02, 102.25 \n";
        let points = parse_prices(csv, ymd(2024, 1, 10), 365).unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint::new(ymd(2024, 1, 1), 101.0),
                PricePoint::new(ymd(2024, 1, 2), 102.25),
                PricePoint::new(ymd(2024, 1, 3), 103.5),
            ]
        );
    }

    #[test]
    fn parses_millisecond_timestamps() {
        // Midday UTC keeps the civil date stable across local offsets up to twelve hours
        let millis = 1_704_110_400_000_i64; // 2024-01-01T12:00:00Z
        let csv = format!("timestamp,price\n{},42000.5\n", millis);
        let points = parse_prices(csv.as_bytes(), ymd(2024, 2, 1), 365).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 42000.5);
        let expected = Local
            .timestamp_millis_opt(millis)
            .single()
            .unwrap()
            .date_naive();
        assert_eq!(points[0].date, expected);
    }

    #[test]
    fn applies_lookback_window() {
        let csv = b"date,price\n2023-12-01,1\n2024-01-05,2\n2024-01-10,3\n2024-01-11,4\n";
        let points = parse_prices(csv, ymd(2024, 1, 10), 7).unwrap();
        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 10)]);
    }

    #[test]
    fn rejects_bad_rows() {
        let bad_date = b"date,price\nyesterday,1\n";
        assert!(matches!(
            parse_prices(bad_date, ymd(2024, 1, 1), 30),
            Err(PriceError::InvalidDate { row: 2, .. })
        ));

        let bad_price = b"date,price\n2024-01-01,1\n2024-01-02,n/a\n";
        assert!(matches!(
            parse_prices(bad_price, ymd(2024, 1, 5), 30),
            Err(PriceError::InvalidPrice { row: 3, .. })
        ));

        let nan_price = b"date,price\n2024-01-01,NaN\n";
        assert!(matches!(
            parse_prices(nan_price, ymd(2024, 1, 5), 30),
            Err(PriceError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn skips_comment_lines() {
        let csv = b"# sample history\ndate,price\n2024-01-01,1\n# gap\n2024-01-03,3\n";
        let points = parse_prices(csv, ymd(2024, 1, 10), 30).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].price, 3.0);

        let bad = b"# sample history\ndate,price\n2024-01-01,oops\n";
        assert!(matches!(
            parse_prices(bad, ymd(2024, 1, 10), 30),
            Err(PriceError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn header_only_is_empty_history() {
        let points = parse_prices(b"date,price\n", ymd(2024, 1, 1), 30).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn samples_carry_prices() {
        let points = [PricePoint::new(ymd(2024, 1, 1), 10.0)];
        let samples = to_samples(&points);
        assert_eq!(samples[0].date, ymd(2024, 1, 1));
        assert_eq!(samples[0].payload, 10.0);
    }
}
