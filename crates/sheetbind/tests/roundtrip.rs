use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sheetbind::{
    AliasTable, CollectingSink, Diagnostic, ReadOptions, RecordWriter, SheetError, SheetReader,
    SheetRecord, StreamRole, TemplateStreams,
};
use sheetbind_testkit::{build_workbook, date_format, sheet1, workbook_bytes};
use std::io::Cursor;

#[derive(Debug, Default, Clone, PartialEq, SheetRecord)]
struct UserInfo {
    name: String,
    gender: String,
    birthday: Option<NaiveDate>,
    salary: Option<Decimal>,
    active: bool,
}

fn alias() -> AliasTable {
    AliasTable::new()
        .with("姓名", "name")
        .with("生日", "birthday")
        .with("性别", "gender")
        .with("薪水", "salary")
        .with("在职", "active")
}

fn users() -> Vec<UserInfo> {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    (0..3)
        .map(|i| UserInfo {
            name: format!("name:{i}"),
            gender: if i % 2 == 0 { "男" } else { "女" }.to_string(),
            birthday: today.with_year(today.year() - i),
            salary: Some(Decimal::from((i + 1) * 5000)),
            active: i % 2 == 0,
        })
        .collect()
}

/// Header row plus one example row: text name and gender, a date-formatted
/// birthday, a numeric salary and a boolean flag.
fn user_template() -> sheetbind_testkit::Fixture {
    build_workbook(|book| {
        let sh = sheet1(book);
        for (col, header) in ["姓名", "生日", "性别", "薪水", "在职"].into_iter().enumerate() {
            sh.get_cell_mut((col as u32 + 1, 1)).set_value(header);
        }
        sh.get_cell_mut((1, 2)).set_value_string("example");
        sh.get_cell_mut((2, 2)).set_value_number(0);
        date_format(sh, "B2");
        sh.get_cell_mut((3, 2)).set_value_string("example");
        sh.get_cell_mut((4, 2)).set_value_number(0);
        sh.get_cell_mut((5, 2)).set_value_bool(false);
    })
}

#[test]
fn alias_roundtrip_through_template() {
    let fixture = user_template();
    let output = fixture.sibling("users.xlsx");
    let alias = alias();

    RecordWriter::new()
        .with_alias(&alias)
        .write_path(&users(), fixture.path(), &output)
        .unwrap();

    let back: Vec<UserInfo> = SheetReader::new()
        .with_alias(&alias)
        .read_path(&output)
        .unwrap();
    assert_eq!(back, users());
}

#[test]
fn written_cells_keep_example_formats() {
    let fixture = user_template();
    let output = fixture.sibling("users.xlsx");
    sheetbind::write_path(&users(), Some(&alias()), fixture.path(), &output).unwrap();

    let book = sheetbind_testkit::open(&output);
    let sh = book.get_sheet(&0).unwrap();
    for row in 2..=4 {
        let code = sh
            .get_cell((2, row))
            .unwrap()
            .get_style()
            .get_number_format()
            .map(|f| f.get_format_code().to_string());
        assert_eq!(code.as_deref(), Some("yyyy-mm-dd"), "row {row}");
    }
    assert_eq!(sheetbind_testkit::text_at(sh, 1, 4), "name:2");
    assert_eq!(sheetbind_testkit::text_at(sh, 4, 3), "10000");
}

#[test]
fn stream_roundtrip() {
    let alias = alias();
    let template = std::fs::read(user_template().path()).unwrap();
    let mut output = Vec::new();
    let streams = TemplateStreams::new()
        .template(Cursor::new(template))
        .output(&mut output);
    RecordWriter::new()
        .with_alias(&alias)
        .write_to(&users(), "users.xlsx", streams)
        .unwrap();

    let back: Vec<UserInfo> = SheetReader::new()
        .with_alias(&alias)
        .read_from(Cursor::new(output), "users.XLSX")
        .unwrap();
    assert_eq!(back.len(), 3);
    assert_eq!(back[1].gender, "女");
    assert!(!back[1].active);
    assert!(back[2].active);
}

#[test]
fn non_spreadsheet_extensions_fail_before_io() {
    let fixture = user_template();
    for name in ["users.csv", "users.txt"] {
        let output = fixture.sibling(name);
        let err = RecordWriter::new()
            .write_path(&users(), fixture.path(), &output)
            .unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat(_)), "{name}: {err}");
        assert!(!output.exists());

        let err = SheetReader::new()
            .read_path::<UserInfo>(fixture.sibling(name))
            .unwrap_err();
        assert!(matches!(err.error, SheetError::UnsupportedFormat(_)));
    }
}

#[test]
fn failed_render_creates_no_output() {
    let fixture = user_template();
    let output = fixture.sibling("legacy.xls");
    let sink = CollectingSink::new();
    let err = RecordWriter::new()
        .with_sink(&sink)
        .write_path(&users(), fixture.path(), &output)
        .unwrap_err();
    assert!(matches!(err, SheetError::Engine(_)), "{err}");
    assert!(!output.exists());
    assert!(matches!(
        sink.entries().as_slice(),
        [Diagnostic::Failed { operation: "write", .. }]
    ));
}

#[cfg(feature = "xls")]
#[test]
fn xls_streams_go_through_the_legacy_reader() {
    let xlsx = std::fs::read(user_template().path()).unwrap();
    let err = SheetReader::new()
        .with_alias(&alias())
        .read_from::<UserInfo, _>(Cursor::new(xlsx), "users.xls")
        .unwrap_err();
    assert!(err.records.is_empty());
    assert!(matches!(err.error, SheetError::Engine(_)), "{}", err.error);
}

#[test]
fn missing_output_stream() {
    let streams: TemplateStreams<_, Vec<u8>> =
        TemplateStreams::new().template(Cursor::new(Vec::new()));
    let err = RecordWriter::new()
        .write_to(&users(), "users.xlsx", streams)
        .unwrap_err();
    assert!(matches!(err, SheetError::MissingStream(StreamRole::Output)));
}

#[derive(Debug, Default, PartialEq, SheetRecord)]
struct Reading {
    label: String,
    stamp: i64,
    count: Option<i32>,
    ratio: Option<f64>,
}

fn readings() -> Vec<u8> {
    workbook_bytes(|book| {
        let sh = sheet1(book);
        sh.get_cell_mut((1, 1)).set_value("ratio");
        sh.get_cell_mut((2, 1)).set_value(" count ");
        sh.get_cell_mut((3, 1)).set_value("label");
        sh.get_cell_mut((4, 1)).set_value("stamp");
        sh.get_cell_mut((5, 1)).set_value("unmapped");

        sh.get_cell_mut((1, 2)).set_value_number(0.25);
        sh.get_cell_mut((2, 2)).set_value_string("  ");
        sh.get_cell_mut((3, 2)).set_value_number(7);
        sh.get_cell_mut((4, 2)).set_value_number(45292.5);
        sh.get_cell_mut((5, 2)).set_value_string("ignored");

        sh.get_cell_mut((2, 4)).set_value_string("12");
        sh.get_cell_mut((4, 4)).set_value_number(42);
    })
}

#[test]
fn reads_with_trimming_and_long_as_timestamp() {
    let rows: Vec<Reading> = SheetReader::new()
        .read_from(Cursor::new(readings()), "readings.xlsx")
        .unwrap();
    assert_eq!(
        rows,
        [
            Reading {
                label: "7".into(),
                // 2024-01-01T12:00:00 UTC
                stamp: 1_704_110_400_000,
                count: None,
                ratio: Some(0.25),
            },
            Reading {
                label: String::new(),
                stamp: 42,
                count: Some(12),
                ratio: None,
            },
        ]
    );
}

#[test]
fn untrimmed_headers_stay_unbound() {
    let rows: Vec<Reading> = SheetReader::new()
        .with_options(ReadOptions::verbatim())
        .read_from(Cursor::new(readings()), "readings.xlsx")
        .unwrap();
    assert_eq!(rows[1].count, None);
    assert_eq!(rows[1].stamp, 42);
}

#[test]
fn malformed_text_reports_the_cell() {
    let bytes = workbook_bytes(|book| {
        let sh = sheet1(book);
        sh.get_cell_mut((1, 1)).set_value("count");
        sh.get_cell_mut((1, 2)).set_value_string("3");
        sh.get_cell_mut((1, 3)).set_value_string("three");
    });
    let err = SheetReader::new()
        .read_from::<Reading, _>(Cursor::new(bytes), "r.xlsx")
        .unwrap_err();
    let (records, error) = err.into_parts();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].count, Some(3));
    assert!(error.to_string().starts_with("cell A3"), "{error}");
}
