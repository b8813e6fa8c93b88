use sheetbind_engine::{
    CellRef, CellValue, SheetFormat, UmyaWorkbook, Workbook, open_workbook,
};
use sheetbind_testkit::{sheet1, workbook_bytes};

fn fixture() -> Vec<u8> {
    workbook_bytes(|book| {
        let sh = sheet1(book);
        sh.get_cell_mut((1, 2)).set_value("name");
        sh.get_cell_mut((3, 2)).set_value("age");
        sh.get_cell_mut((1, 3)).set_value_string("Ada");
        sh.get_cell_mut((3, 3)).set_value_number(36);
        sh.get_cell_mut((4, 3)).set_value_bool(true);
        sh.get_cell_mut((2, 5)).set_formula("C3*2");
    })
}

#[test]
fn bounds_follow_present_cells() {
    let wb = UmyaWorkbook::from_bytes(fixture()).unwrap();
    assert_eq!(wb.sheet_count(), 1);
    assert_eq!(wb.sheet_name(0).as_deref(), Some("Sheet1"));
    assert_eq!(wb.row_bounds(0), Some((1, 4)));
    assert_eq!(wb.cell_bounds(0, 1), Some((0, 2)));
    assert_eq!(wb.cell_bounds(0, 2), Some((0, 3)));
    assert!(!wb.row_exists(0, 3));
    assert!(wb.row_exists(0, 4));
    assert_eq!(wb.row_bounds(7), None);
}

#[test]
fn cell_snapshots_carry_kinds() {
    let wb = open_workbook(SheetFormat::Xlsx, fixture()).unwrap();
    let at = |row, col| wb.cell(CellRef::new(0, row, col)).unwrap().value;

    assert_eq!(at(2, 0), CellValue::Text("Ada".into()));
    assert_eq!(at(2, 2), CellValue::Number(36.0));
    assert_eq!(at(2, 3), CellValue::Boolean(true));

    match at(4, 1) {
        CellValue::Formula(f) => {
            assert_eq!(f.expression, "C3*2");
            assert_eq!(f.cached.numeric(), None);
        }
        other => panic!("expected formula, got {other:?}"),
    }
    assert!(wb.cell(CellRef::new(0, 2, 1)).is_none());
}
