//! Price file loading (CSV or JSON).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use volrange::RawPriceRecord;

/// Errors raised while reading a price file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(&'static str),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Parse `YYYY-MM-DD`, ignoring any time-of-day suffix.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_price(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Read records from CSV with `date`, `close` and optional `adj_close` columns.
///
/// Header matching ignores case, so `Date`, `Close` and `Adj Close` work.
pub fn read_csv<R: Read>(reader: R) -> LoadResult<Vec<RawPriceRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let date_idx = find(&["date", "datetime"]).ok_or(LoadError::MissingColumn("date"))?;
    let close_idx = find(&["close"]);
    let adj_idx = find(&["adj_close", "adjclose"]);
    if close_idx.is_none() && adj_idx.is_none() {
        return Err(LoadError::MissingColumn("close"));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(parse_price);
        records.push(
            RawPriceRecord::new(row.get(date_idx).and_then(parse_date), field(close_idx)).with_adj_close(field(adj_idx)),
        );
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default, alias = "Date")]
    date: Option<String>,
    #[serde(default, alias = "Close")]
    close: Option<f64>,
    #[serde(default, alias = "adjClose", alias = "Adj Close")]
    adj_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Records(Vec<JsonRecord>),
    Wrapped {
        #[serde(alias = "data")]
        history: Vec<JsonRecord>,
    },
}

/// Read records from a JSON array of `{date, close}` objects.
///
/// An object wrapping the array under `history` or `data` is also accepted.
pub fn read_json<R: Read>(reader: R) -> LoadResult<Vec<RawPriceRecord>> {
    let document: JsonDocument = serde_json::from_reader(reader)?;
    let records = match document {
        JsonDocument::Records(records) => records,
        JsonDocument::Wrapped { history } => history,
    };
    Ok(records
        .into_iter()
        .map(|r| RawPriceRecord::new(r.date.as_deref().and_then(parse_date), r.close).with_adj_close(r.adj_close))
        .collect())
}

fn open(path: &Path) -> LoadResult<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load records from a file, choosing the format by extension.
///
/// Unknown extensions try CSV first, then JSON.
pub fn load_records(path: &Path) -> LoadResult<Vec<RawPriceRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let records = match ext.as_str() {
        "csv" => read_csv(open(path)?)?,
        "json" => read_json(open(path)?)?,
        _ => match read_csv(open(path)?) {
            Ok(records) => records,
            Err(csv_err) => {
                debug!(error = %csv_err, "not CSV, trying JSON");
                read_json(open(path)?)?
            }
        },
    };
    debug!(path = %path.display(), records = records.len(), "loaded price file");
    Ok(records)
}
