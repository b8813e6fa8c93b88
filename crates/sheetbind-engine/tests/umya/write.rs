use chrono::NaiveDate;
use sheetbind_engine::{CellKind, CellRef, CellValue, CellWrite, UmyaWorkbook, Workbook};
use sheetbind_testkit::{date_format, sheet1, workbook_bytes};

fn template() -> Vec<u8> {
    workbook_bytes(|book| {
        let sh = sheet1(book);
        sh.get_cell_mut((1, 1)).set_value("when");
        sh.get_cell_mut((1, 2)).set_value_number(0);
        date_format(sh, "A2");
        sh.get_column_dimension_mut("A").set_width(24.0);
    })
}

#[test]
fn copy_format_clones_style_and_kind() {
    let mut wb = UmyaWorkbook::from_bytes(template()).unwrap();
    wb.copy_cell_format(CellRef::new(0, 1, 0), CellRef::new(0, 2, 0))
        .unwrap();
    let copied = wb.cell(CellRef::new(0, 2, 0)).unwrap();
    assert_eq!(copied.kind(), CellKind::Numeric);

    let book = wb.spreadsheet();
    let sh = book.get_sheet(&0).unwrap();
    let code = sh
        .get_cell((1, 3))
        .unwrap()
        .get_style()
        .get_number_format()
        .map(|f| f.get_format_code().to_string());
    assert_eq!(code.as_deref(), Some("yyyy-mm-dd"));
}

#[test]
fn typed_writes_survive_save() {
    let mut wb = UmyaWorkbook::from_bytes(template()).unwrap();
    let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    wb.write_cell(CellRef::new(0, 1, 0), CellWrite::Date(dt)).unwrap();
    wb.write_cell(CellRef::new(0, 1, 1), CellWrite::Text("123".into()))
        .unwrap();
    wb.write_cell(CellRef::new(0, 1, 2), CellWrite::Formula("=A2+1".into()))
        .unwrap();
    wb.write_cell(CellRef::new(0, 1, 3), CellWrite::Boolean(false))
        .unwrap();

    let bytes = wb.save_to_bytes().unwrap();
    let reopened = UmyaWorkbook::from_bytes(bytes).unwrap();
    let at = |col| reopened.cell(CellRef::new(0, 1, col)).unwrap().value;
    assert_eq!(at(0), CellValue::Number(45292.0));
    assert_eq!(at(1), CellValue::Text("123".into()));
    assert_eq!(at(2).kind(), CellKind::Formula);
    assert_eq!(at(3), CellValue::Boolean(false));
    assert_eq!(reopened.column_width(0, 0), Some(24.0));
}

#[test]
fn sheet_swap_keeps_name() {
    let mut wb = UmyaWorkbook::from_bytes(template()).unwrap();
    let out = wb.create_sheet("sheetbind-out").unwrap();
    assert_eq!(out, 1);
    wb.write_cell(CellRef::new(out, 0, 0), CellWrite::Number(1.0))
        .unwrap();
    wb.remove_sheet(0).unwrap();
    wb.rename_sheet(0, "Sheet1").unwrap();
    assert_eq!(wb.sheet_count(), 1);
    assert_eq!(wb.sheet_name(0).as_deref(), Some("Sheet1"));
    assert_eq!(
        wb.cell(CellRef::new(0, 0, 0)).unwrap().value,
        CellValue::Number(1.0)
    );
}
