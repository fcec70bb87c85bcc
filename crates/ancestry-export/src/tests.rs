use ancestry_core::table::{Cell, Table, TableRow};

use crate::{
  ExportError, ExportFormat, ExportOptions, write_csv, write_json, write_table,
  write_text,
};

struct Tally {
  value: &'static str,
  count: i64,
  note:  Option<f64>,
}

impl TableRow for Tally {
  const COLUMNS: &'static [&'static str] = &["value", "count", "note"];

  fn cells(&self) -> Vec<Cell> {
    vec![
      Cell::Text(self.value.into()),
      Cell::Int(self.count),
      self.note.map_or(Cell::Null, Cell::Float),
    ]
  }
}

struct Tagged(serde_json::Value);

impl TableRow for Tagged {
  const COLUMNS: &'static [&'static str] = &["additional_data"];

  fn cells(&self) -> Vec<Cell> { vec![Cell::Json(self.0.clone())] }
}

fn sample() -> Table {
  Table::from_rows([
    Tally { value: "SMITH", count: 5, note: None },
    Tally { value: "O'BRIEN, JR", count: 2, note: Some(0.5) },
  ])
}

fn empty() -> Table { Table::from_rows(Vec::<Tally>::new()) }

// ─── Formats ─────────────────────────────────────────────────────────────────

#[test]
fn format_parsing() {
  assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
  assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
  assert_eq!("table".parse::<ExportFormat>().unwrap(), ExportFormat::Table);
  assert!(matches!(
    "parquet".parse::<ExportFormat>(),
    Err(ExportError::UnknownFormat(_))
  ));
}

#[test]
fn only_table_format_may_skip_output() {
  assert!(!ExportFormat::Table.requires_output());
  assert!(ExportFormat::Csv.requires_output());
  assert!(ExportFormat::Json.requires_output());
  assert!(ExportFormat::Excel.requires_output());

  let err = write_table(&sample(), ExportFormat::Json, None, &ExportOptions::default())
    .unwrap_err();
  assert!(matches!(err, ExportError::MissingOutput(ExportFormat::Json)));
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

#[test]
fn csv_has_header_and_no_index() {
  let mut buf = Vec::new();
  write_csv(&sample(), &mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines[0], "value,count,note");
  assert_eq!(lines[1], "SMITH,5,");
  assert_eq!(lines[2], "\"O'BRIEN, JR\",2,0.5");
}

#[test]
fn empty_csv_parses_as_empty_table() {
  let mut buf = Vec::new();
  write_csv(&empty(), &mut buf).unwrap();

  let mut reader = csv::Reader::from_reader(buf.as_slice());
  let headers = reader.headers().unwrap().clone();
  assert_eq!(headers.iter().collect::<Vec<_>>(), ["value", "count", "note"]);
  assert_eq!(reader.records().count(), 0);
}

// ─── JSON ────────────────────────────────────────────────────────────────────

#[test]
fn json_rows_keep_column_order() {
  let mut buf = Vec::new();
  write_json(&sample(), &mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();

  let value_at = text.find("\"value\"").unwrap();
  let count_at = text.find("\"count\"").unwrap();
  let note_at = text.find("\"note\"").unwrap();
  assert!(value_at < count_at && count_at < note_at);

  let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
  let rows = parsed.as_array().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0]["value"], "SMITH");
  assert_eq!(rows[0]["count"], 5);
  assert!(rows[0]["note"].is_null());
  assert_eq!(rows[1]["note"], 0.5);
}

#[test]
fn empty_json_is_empty_array() {
  let mut buf = Vec::new();
  write_json(&empty(), &mut buf).unwrap();
  let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
  assert_eq!(parsed, serde_json::json!([]));
}

// ─── Text ────────────────────────────────────────────────────────────────────

#[test]
fn text_columns_are_aligned() {
  let mut buf = Vec::new();
  write_text(&sample(), &mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();
  let lines: Vec<&str> = text.lines().collect();

  let width = lines[0].chars().count();
  assert!(lines.iter().all(|l| l.chars().count() == width), "{text}");

  let cells = |line: &str| -> Vec<String> {
    line
      .trim_matches('|')
      .split('|')
      .map(|c| c.trim().to_owned())
      .collect()
  };
  let content: Vec<&str> =
    lines.iter().copied().filter(|l| l.starts_with('|')).collect();
  assert_eq!(content.len(), 3);
  assert_eq!(cells(content[0]), ["value", "count", "note"]);
  assert_eq!(cells(content[1]), ["SMITH", "5", ""]);
  assert_eq!(cells(content[2]), ["O'BRIEN, JR", "2", "0.5"]);
}

#[test]
fn empty_text_says_so() {
  let mut buf = Vec::new();
  write_text(&empty(), &mut buf).unwrap();
  assert!(String::from_utf8(buf).unwrap().ends_with("(no rows)\n"));
}

// ─── Files ───────────────────────────────────────────────────────────────────

#[test]
fn writes_each_format_to_disk() {
  let dir = tempfile::tempdir().unwrap();
  let options = ExportOptions { sheet_name: "Surnames".into() };

  for (format, name) in [
    (ExportFormat::Csv, "out/values.csv"),
    (ExportFormat::Json, "out/values.json"),
    (ExportFormat::Excel, "out/values.xlsx"),
    (ExportFormat::Table, "out/values.txt"),
  ] {
    let path = dir.path().join(name);
    write_table(&sample(), format, Some(&path), &options).unwrap();
    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0, "{format} output is empty");
  }
}

#[test]
fn excel_creates_missing_directories() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fresh").join("nested").join("values.xlsx");
  write_table(&sample(), ExportFormat::Excel, Some(&path), &ExportOptions::default())
    .unwrap();
  assert!(path.exists());
}

#[test]
fn blocked_output_directory_is_an_io_error() {
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("plain-file");
  std::fs::write(&blocker, b"x").unwrap();

  for format in [ExportFormat::Csv, ExportFormat::Excel] {
    let path = blocker.join("out.bin");
    let err = write_table(&sample(), format, Some(&path), &ExportOptions::default())
      .unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }), "{format}: {err}");
  }
}

#[test]
fn json_cells_export_as_nested_objects() {
  let table = Table::from_rows([Tagged(serde_json::json!({ "ratio": 0.5 }))]);

  let mut buf = Vec::new();
  write_json(&table, &mut buf).unwrap();
  let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
  assert_eq!(parsed[0]["additional_data"]["ratio"], 0.5);

  let mut buf = Vec::new();
  write_csv(&table, &mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();
  assert_eq!(text.lines().nth(1), Some(r#""{""ratio"":0.5}""#));
}

#[test]
fn empty_table_exports_to_excel() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("empty.xlsx");
  write_table(&empty(), ExportFormat::Excel, Some(&path), &ExportOptions::default())
    .unwrap();
  assert!(path.exists());
}
