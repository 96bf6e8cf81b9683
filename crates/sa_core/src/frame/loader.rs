//! Tabular loader collaborator.
//!
//! First row is the header; column order is preserved; value kinds are
//! sniffed per column (numeric, then datetime, else categorical).
//! Empty cells become missing values.

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::Fault;
use crate::frame::{Column, ColumnData, Frame};

/// Datetime layouts accepted by the sniffer, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Loads a frame from a delimited text file.
pub fn load_frame(path: &Path) -> Result<Frame, Fault> {
    if !path.exists() {
        return Err(Fault::InputAbsent(path.display().to_string()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| Fault::LoadFailure(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Fault::LoadFailure(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(Fault::LoadFailure("no header row".into()));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| Fault::LoadFailure(e.to_string()))?;
        if record.len() != headers.len() {
            return Err(Fault::LoadFailure(format!(
                "row has {} fields, expected {}",
                record.len(),
                headers.len()
            )));
        }
        for (i, field) in record.iter().enumerate() {
            cells[i].push(field.trim().to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column { data: sniff_column(&raw), name })
        .collect();
    let frame = Frame::new(columns)?;
    debug!(
        rows = frame.rows(),
        cols = frame.columns().len(),
        "loaded frame"
    );
    Ok(frame)
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Picks the narrowest kind that covers every present cell.
fn sniff_column(raw: &[String]) -> ColumnData {
    let present: Vec<&str> = raw.iter().map(|s| s.as_str()).filter(|s| !s.is_empty()).collect();

    if !present.is_empty() && present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnData::Numeric(
            raw.iter()
                .map(|s| if s.is_empty() { None } else { s.parse::<f64>().ok() })
                .collect(),
        );
    }
    if !present.is_empty() && present.iter().all(|s| parse_datetime(s).is_some()) {
        return ColumnData::Datetime(
            raw.iter()
                .map(|s| if s.is_empty() { None } else { parse_datetime(s) })
                .collect(),
        );
    }
    ColumnData::Categorical(
        raw.iter()
            .map(|s| if s.is_empty() { None } else { Some(s.clone()) })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ValueKind;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_numeric_and_categorical_columns() {
        let f = write_csv("x,grp\n1,a\n2,b\n3,a\n");
        let frame = load_frame(f.path()).unwrap();
        assert_eq!(frame.rows(), 3);
        assert_eq!(frame.column("x").unwrap().kind(), ValueKind::Numeric);
        assert_eq!(frame.column("grp").unwrap().kind(), ValueKind::Categorical);
    }

    #[test]
    fn empty_cells_become_missing() {
        let f = write_csv("x\n1\n\n3\n");
        let frame = load_frame(f.path()).unwrap();
        let col = frame.column("x").unwrap();
        assert_eq!(col.kind(), ValueKind::Numeric);
        assert_eq!(col.data.present(), 2);
    }

    #[test]
    fn detects_datetime_columns() {
        let f = write_csv("when\n2024-01-01\n2024-01-02\n");
        let frame = load_frame(f.path()).unwrap();
        assert_eq!(frame.column("when").unwrap().kind(), ValueKind::Datetime);
    }

    #[test]
    fn missing_file_is_input_absent() {
        let err = load_frame(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, Fault::InputAbsent(_)));
    }

    #[test]
    fn ragged_rows_are_load_failure() {
        let f = write_csv("a,b\n1,2\n3\n");
        let err = load_frame(f.path()).unwrap_err();
        assert!(matches!(err, Fault::LoadFailure(_)));
    }

    #[test]
    fn column_order_follows_the_file() {
        let f = write_csv("c,a,b\n1,2,3\n");
        let frame = load_frame(f.path()).unwrap();
        assert_eq!(frame.names(), vec!["c", "a", "b"]);
    }
}
