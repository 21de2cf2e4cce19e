use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde_json::{Map, Value as JsonValue};

use super::model::{BookingRecord, Dataset, PersonId};
use crate::error::LoadError;

/// Columns every booking sheet must carry (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 4] = ["Id_Person", "FirstName", "Class_Name", "Start_Date_time"];

/// Extensions handed to the spreadsheet decoder.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a booking sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`  – header row first
/// * `.json` – records (`[{ "Id_Person": .., .. }, ..]`) or split
///   (`{ "columns": [..], "data": [[..], ..] }`) orientation
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    match ext.as_str() {
        e if SPREADSHEET_EXTENSIONS.contains(&e) => load_bytes(&bytes),
        "csv" => load_csv(&bytes),
        "json" => load_json(&bytes),
        other => Err(LoadError::Unsupported(other.to_string())),
    }
}

/// Decode a spreadsheet payload (format detected from content) and read its
/// first worksheet.
pub fn load_bytes(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Decode(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Decode("workbook has no worksheets".into()))?
        .map_err(|e| LoadError::Decode(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| cell_text(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let cols = ColumnIndex::locate(&headers)?;

    let mut builder = DatasetBuilder::default();
    for row in rows {
        let cell = |idx: usize| row.get(idx).unwrap_or(&Data::Empty);
        let start = cell(cols.start);
        builder.push(RawRow {
            id: cell_text(cell(cols.id)),
            name: cell_text(cell(cols.name)),
            class: cell_text(cell(cols.class)),
            start: cell_timestamp(start),
            has_start: !start.is_empty(),
        });
    }
    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// Column lookup and row assembly shared by every format
// ---------------------------------------------------------------------------

struct ColumnIndex {
    id: usize,
    name: usize,
    class: usize,
    start: usize,
}

impl ColumnIndex {
    fn locate<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let found = REQUIRED_COLUMNS.map(|c| headers.iter().position(|h| h.as_ref() == c));

        match found {
            [Some(id), Some(name), Some(class), Some(start)] => Ok(ColumnIndex {
                id,
                name,
                class,
                start,
            }),
            _ => Err(LoadError::MissingColumns(
                REQUIRED_COLUMNS
                    .iter()
                    .zip(found)
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(c, _)| c.to_string())
                    .collect(),
            )),
        }
    }
}

/// One row as extracted by a format-specific reader, before validation.
struct RawRow {
    id: Option<String>,
    name: Option<String>,
    class: Option<String>,
    start: Option<NaiveDateTime>,
    /// The timestamp cell held something, parsable or not.
    has_start: bool,
}

impl RawRow {
    fn is_blank(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.class.is_none() && !self.has_start
    }
}

#[derive(Default)]
struct DatasetBuilder {
    records: Vec<BookingRecord>,
    skipped: usize,
}

impl DatasetBuilder {
    fn push(&mut self, row: RawRow) {
        if row.is_blank() {
            return;
        }
        let Some(person_id) = row.id.as_deref().and_then(PersonId::new) else {
            self.skipped += 1;
            return;
        };
        self.records.push(BookingRecord {
            person_id,
            person_name: row.name.unwrap_or_default(),
            class_name: row.class,
            start_time: row.start,
        });
    }

    fn finish(self) -> Dataset {
        let dataset = Dataset::from_records(self.records, self.skipped);
        if dataset.skipped_rows > 0 {
            warn!("Skipped {} row(s) without Id_Person", dataset.skipped_rows);
        }
        if dataset.invalid_timestamps > 0 {
            warn!(
                "{} row(s) have an unparsable Start_Date_time and will never match a period",
                dataset.invalid_timestamps
            );
        }
        info!(
            "Loaded {} bookings across {} period(s)",
            dataset.len(),
            dataset.periods.len()
        );
        dataset
    }
}

// ---------------------------------------------------------------------------
// Cell conversion
// ---------------------------------------------------------------------------

/// Text content of a cell; whole floats lose their `.0` so numeric ids read
/// the same as typed.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => non_blank(s),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        other => non_blank(&other.to_string()),
    }
}

fn cell_timestamp(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => parse_timestamp(s),
        Data::Float(_) | Data::Int(_) | Data::DateTime(_) => cell.as_datetime(),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the textual timestamp layouts booking exports are seen with.
/// Anything else is `None`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        // Slash dates read month first; day first only when that fails.
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Decode(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let cols = ColumnIndex::locate(&headers)?;

    let mut builder = DatasetBuilder::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Decode(format!("CSV row {row_no}: {e}")))?;
        let field = |idx: usize| record.get(idx).and_then(non_blank);
        let start = field(cols.start);
        builder.push(RawRow {
            id: field(cols.id),
            name: field(cols.name),
            class: field(cols.class),
            start: start.as_deref().and_then(parse_timestamp),
            has_start: start.is_some(),
        });
    }
    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema, either records-oriented:
///
/// ```json
/// [
///   { "Id_Person": 101, "FirstName": "Ann", "Class_Name": "Yoga",
///     "Start_Date_time": "2024-02-15T10:00:00" },
///   ...
/// ]
/// ```
///
/// or split-oriented (`{"columns": [...], "data": [[...], ...]}`).
/// Numeric timestamps are epoch milliseconds.
fn load_json(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let root: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| LoadError::Decode(format!("parsing JSON: {e}")))?;

    match root {
        JsonValue::Array(records) => load_json_records(&records),
        JsonValue::Object(obj) if obj.contains_key("columns") && obj.contains_key("data") => {
            load_json_split(&obj)
        }
        _ => Err(LoadError::Decode(
            "expected a JSON array of records or a split-oriented object".into(),
        )),
    }
}

fn load_json_records(records: &[JsonValue]) -> Result<Dataset, LoadError> {
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Decode(format!("row {i} is not a JSON object")))?;
        objects.push(obj);
    }

    // A column exists if any record carries it.
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !objects.iter().any(|o| o.contains_key(**c)))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut builder = DatasetBuilder::default();
    for obj in objects {
        let [id, name, class, start] = REQUIRED_COLUMNS.map(|c| obj.get(c).unwrap_or(&JsonValue::Null));
        builder.push(json_row(id, name, class, start));
    }
    Ok(builder.finish())
}

fn load_json_split(obj: &Map<String, JsonValue>) -> Result<Dataset, LoadError> {
    let headers: Vec<String> = obj["columns"]
        .as_array()
        .ok_or_else(|| LoadError::Decode("'columns' is not an array".into()))?
        .iter()
        .map(|c| c.as_str().map(String::from).unwrap_or_else(|| c.to_string()))
        .collect();
    let cols = ColumnIndex::locate(&headers)?;
    let rows = obj["data"]
        .as_array()
        .ok_or_else(|| LoadError::Decode("'data' is not an array".into()))?;

    let mut builder = DatasetBuilder::default();
    for (i, row) in rows.iter().enumerate() {
        let row = row
            .as_array()
            .ok_or_else(|| LoadError::Decode(format!("data row {i} is not an array")))?;
        let cell = |idx: usize| row.get(idx).unwrap_or(&JsonValue::Null);
        builder.push(json_row(
            cell(cols.id),
            cell(cols.name),
            cell(cols.class),
            cell(cols.start),
        ));
    }
    Ok(builder.finish())
}

fn json_row(id: &JsonValue, name: &JsonValue, class: &JsonValue, start: &JsonValue) -> RawRow {
    RawRow {
        id: json_text(id),
        name: json_text(name),
        class: json_text(class),
        start: json_timestamp(start),
        has_start: !start.is_null(),
    }
}

fn json_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => non_blank(s),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn json_timestamp(val: &JsonValue) -> Option<NaiveDateTime> {
    match val {
        JsonValue::String(s) => parse_timestamp(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}
