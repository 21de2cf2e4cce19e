use std::io::Write;
use std::path::Path;

use log::{info, warn};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::analysis::{Bucket, FrequencyBucket, FrequencyReport, FrequencyTable};
use crate::error::ExportError;

pub const DEFAULT_FILE_NAME: &str = "booking_frequency.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Frequency Analysis";

/// Column headers, in table order.
pub const HEADERS: [&str; 5] = ["Freq", "#Students", "Cum 1->", "Cum ->End", "Details"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Xlsx, ExportFormat::Csv, ExportFormat::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "Excel (XLSX)",
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }
}

/// One exported table row; field names double as CSV headers.
#[derive(Serialize)]
struct ExportRow {
    #[serde(rename = "Freq")]
    freq: String,
    #[serde(rename = "#Students")]
    students: usize,
    #[serde(rename = "Cum 1->")]
    cum_from_start: usize,
    #[serde(rename = "Cum ->End")]
    cum_to_end: usize,
    #[serde(rename = "Details")]
    details: String,
}

fn rows(table: &FrequencyTable) -> impl Iterator<Item = ExportRow> + '_ {
    table.buckets.iter().map(|b| ExportRow {
        freq: b.bucket.to_string(),
        students: b.student_count,
        cum_from_start: b.cumulative_from_start,
        cum_to_end: b.cumulative_to_end,
        details: b.details(),
    })
}

/// Write the report in `format`; the sheet name only applies to XLSX.
pub fn export_report(
    path: &Path,
    format: ExportFormat,
    report: &FrequencyReport,
    sheet_name: &str,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Xlsx => export_xlsx(path, &report.table, sheet_name)?,
        ExportFormat::Csv => export_csv(path, &report.table)?,
        ExportFormat::Json => export_json(path, report)?,
    }
    info!("Exported {} rows to {}", report.table.buckets.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// Longest text an xlsx cell can hold, in characters.
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

const CLIPPED_SUFFIX: &str = ", …";

/// The bucket's details, cut after the last whole `"name : id"` entry that
/// fits in one xlsx cell and marked with a trailing `…`.
fn xlsx_details(bucket: &FrequencyBucket) -> String {
    let details = bucket.details();
    if details.chars().count() <= XLSX_MAX_CELL_CHARS {
        return details;
    }

    let budget = XLSX_MAX_CELL_CHARS - CLIPPED_SUFFIX.chars().count();
    let mut out = String::new();
    let mut used = 0;
    let mut kept = 0;
    for person in &bucket.people {
        let entry = person.to_string();
        let sep = if kept == 0 { 0 } else { 2 };
        let len = entry.chars().count();
        if used + sep + len > budget {
            break;
        }
        if sep > 0 {
            out.push_str(", ");
        }
        out.push_str(&entry);
        used += sep + len;
        kept += 1;
    }
    if kept == 0 {
        out.push('…');
    } else {
        out.push_str(CLIPPED_SUFFIX);
    }

    warn!(
        "Details for bucket {} list {} people; the xlsx cell keeps the first {kept}",
        bucket.bucket,
        bucket.people.len()
    );
    out
}

fn build_workbook(table: &FrequencyTable, sheet_name: &str) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    let bold = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, b) in table.buckets.iter().enumerate() {
        let row = i as u32 + 1;
        match b.bucket {
            Bucket::Count(n) => sheet.write_number(row, 0, n)?,
            Bucket::Overflow { .. } => sheet.write_string(row, 0, b.bucket.to_string())?,
        };
        sheet.write_number(row, 1, b.student_count as f64)?;
        sheet.write_number(row, 2, b.cumulative_from_start as f64)?;
        sheet.write_number(row, 3, b.cumulative_to_end as f64)?;
        sheet.write_string(row, 4, xlsx_details(b))?;
    }

    sheet.set_column_width(1, 11)?;
    sheet.set_column_width(4, 80)?;
    sheet.set_freeze_panes(1, 0)?;
    Ok(workbook)
}

pub fn export_xlsx(path: &Path, table: &FrequencyTable, sheet_name: &str) -> Result<(), ExportError> {
    build_workbook(table, sheet_name)?.save(path)?;
    Ok(())
}

/// The workbook as bytes, for hosts that hand the file out themselves.
pub fn export_xlsx_to_buffer(table: &FrequencyTable, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    Ok(build_workbook(table, sheet_name)?.save_to_buffer()?)
}

// ---------------------------------------------------------------------------
// CSV / JSON
// ---------------------------------------------------------------------------

pub fn write_csv<W: Write>(writer: W, table: &FrequencyTable) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows(table) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, table: &FrequencyTable) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, table)
}

pub fn export_json(path: &Path, report: &FrequencyReport) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::data::filter::AnalysisWindow;
    use crate::data::model::{BookingRecord, Dataset, PersonId};
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn report() -> FrequencyReport {
        let mut records = Vec::new();
        let mut push = |id: &str, name: &str, day: u32| {
            records.push(BookingRecord {
                person_id: PersonId::new(id).unwrap(),
                person_name: name.into(),
                class_name: Some("Yoga".into()),
                start_time: NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(9, 0, 0),
            });
        };
        for day in [3, 10, 17] {
            push("P1", "Ann", day);
            push("P2", "Bob", day);
        }
        push("P3", "Cy", 20);
        let ds = Dataset::from_records(records, 0);
        let window = AnalysisWindow::month("2024-01".parse().unwrap());
        analyze(&ds, Some(&window), 2).unwrap().unwrap()
    }

    #[test]
    fn xlsx_round_trip_keeps_columns_and_order() {
        let report = report();
        let bytes = export_xlsx_to_buffer(&report.table, DEFAULT_SHEET_NAME).unwrap();

        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec![DEFAULT_SHEET_NAME.to_string()]);
        let range = wb.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();

        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, HEADERS);
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[2][0], Data::Float(2.0));
        assert_eq!(rows[3][0], Data::String(">2".into()));

        let col = |c: usize| -> Vec<f64> {
            rows[1..]
                .iter()
                .map(|r| match &r[c] {
                    Data::Float(f) => *f,
                    Data::Int(i) => *i as f64,
                    other => panic!("unexpected cell {other:?}"),
                })
                .collect()
        };
        assert_eq!(col(1), [1.0, 0.0, 2.0]);
        assert_eq!(col(2), [1.0, 1.0, 3.0]);
        assert_eq!(col(3), [2.0, 2.0, 2.0]);

        assert_eq!(rows[1][4], Data::String("Cy : P3".into()));
        assert!(matches!(&rows[2][4], Data::Empty) || rows[2][4] == Data::String(String::new()));
        assert_eq!(rows[3][4], Data::String("Ann : P1, Bob : P2".into()));
    }

    #[test]
    fn csv_has_headers_and_quotes_details() {
        let mut out = Vec::new();
        write_csv(&mut out, &report().table).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Freq,#Students,Cum 1->,Cum ->End,Details");
        assert_eq!(lines[1], "1,1,1,2,Cy : P3");
        assert_eq!(lines[2], "2,0,1,2,");
        assert_eq!(lines[3], ">2,2,3,2,\"Ann : P1, Bob : P2\"");
    }

    #[test]
    fn json_export_carries_window_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_report(&path, ExportFormat::Json, &report(), DEFAULT_SHEET_NAME).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["window"]["kind"], "month");
        assert_eq!(value["window"]["period"], "2024-01");
        assert_eq!(value["table"]["buckets"][2]["bucket"], ">2");
        assert_eq!(value["summary"]["sample_size"], 3);
    }

    fn crowded_report(people: usize) -> FrequencyReport {
        let records = (0..people)
            .map(|i| BookingRecord {
                person_id: PersonId::new(format!("ID{i:05}")).unwrap(),
                person_name: format!("Person {i}"),
                class_name: Some("Yoga".into()),
                start_time: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(9, 0, 0),
            })
            .collect();
        let ds = Dataset::from_records(records, 0);
        let window = AnalysisWindow::month("2024-01".parse().unwrap());
        analyze(&ds, Some(&window), 15).unwrap().unwrap()
    }

    #[test]
    fn oversized_details_are_clipped_to_whole_entries() {
        let report = crowded_report(3_000);
        let full = report.table.buckets[0].details();
        assert!(full.chars().count() > XLSX_MAX_CELL_CHARS);

        let bytes = export_xlsx_to_buffer(&report.table, DEFAULT_SHEET_NAME).unwrap();
        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = wb.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
        let cell = match range.get((1, 4)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("unexpected cell {other:?}"),
        };

        assert!(cell.chars().count() <= XLSX_MAX_CELL_CHARS);
        let kept = cell.strip_suffix(", …").expect("clipped cell ends with an ellipsis");
        let entries: Vec<&str> = kept.split(", ").collect();
        assert!(entries.len() > 1_000);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(*entry, format!("Person {i} : ID{i:05}"));
        }
        assert!(full.starts_with(kept));

        // Counts are untouched.
        assert_eq!(range.get((1, 1)), Some(&Data::Float(3_000.0)));
    }

    #[test]
    fn csv_keeps_full_details() {
        let report = crowded_report(3_000);
        let mut out = Vec::new();
        write_csv(&mut out, &report.table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&report.table.buckets[0].details()));
    }

    #[test]
    fn invalid_sheet_name_is_an_xlsx_error() {
        let err = export_xlsx_to_buffer(&report().table, "bad/name?").unwrap_err();
        assert!(matches!(err, ExportError::Xlsx(_)));
    }
}
