// Tabular export of harvested comments
// Columns: author, text, likes, date, kind

use crate::error::ExportError;
use crate::models::{CommentKind, CommentRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EXPORT_COLUMNS: [&str; 5] = ["author", "text", "likes", "date", "kind"];

/// One exported row. The container is CSV (UTF-8, header row first) rather
/// than a spreadsheet workbook; `date` is RFC 3339 in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub date: DateTime<Utc>,
    pub kind: CommentKind,
}

impl From<&CommentRecord> for ExportRow {
    fn from(record: &CommentRecord) -> Self {
        Self {
            author: record.author.clone(),
            text: record.text.clone(),
            likes: record.like_count,
            date: record.published_at,
            kind: record.kind,
        }
    }
}

/// Encode records as CSV with a header row, in record order
pub fn encode_comments(records: &[CommentRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        writer.write_record(EXPORT_COLUMNS)?;
    }
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}

pub fn decode_comments(bytes: &[u8]) -> Result<Vec<ExportRow>, ExportError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let rows = reader
        .deserialize::<ExportRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::harvester::tests::{thread, FakeSource};
    use crate::services::harvester::{harvest, HarvestOptions, ReplyPolicy};
    use chrono::TimeZone;

    fn sample() -> Vec<CommentRecord> {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap();
        vec![
            CommentRecord::top_level("c1", "Alice, \"the\" critic", "line one\nline two <b>bold</b>", 12, at),
            CommentRecord::reply("c1.r1", "c1", "Борис", "согласен", 0, at),
        ]
    }

    #[test]
    fn test_round_trip_preserves_fields_and_order() {
        let records = sample();
        let bytes = encode_comments(&records).unwrap();
        let rows = decode_comments(&bytes).unwrap();

        let expected: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();
        assert_eq!(rows, expected);
    }

    #[tokio::test]
    async fn test_round_trip_of_harvested_records() {
        let source = FakeSource::with_pages(vec![
            vec![thread("a", 3, 1), thread("b", 0, 0)],
            vec![thread("c", 2, 0)],
        ]);
        let outcome = harvest(&source, "vid", &HarvestOptions::with_policy(ReplyPolicy::Exhaustive)).await;
        assert_eq!(outcome.records.len(), 8);

        let rows = decode_comments(&encode_comments(&outcome.records).unwrap()).unwrap();

        let expected: Vec<ExportRow> = outcome.records.iter().map(ExportRow::from).collect();
        assert_eq!(rows, expected);
        assert_eq!(rows[1].kind, CommentKind::Reply);
    }

    #[test]
    fn test_header_matches_columns() {
        let bytes = encode_comments(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("author,text,likes,date,kind\n"));
        assert!(text.contains(",reply\n"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let bytes = encode_comments(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "author,text,likes,date,kind\n");
        assert!(decode_comments(b"author,text,likes,date,kind\n").unwrap().is_empty());
    }
}
