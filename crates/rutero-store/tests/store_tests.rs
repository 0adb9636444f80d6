use std::path::Path;

use pretty_assertions::assert_eq;
use rutero_model::{CellValue, Sheet, Workbook};
use rutero_store::{LoadError, SaveError, SheetStore, StoreConfig};
use rutero_xlsx::{read_workbook, write_workbook};

fn fixture_workbook() -> Workbook {
    let mut clients = Sheet::new(
        "BITS_Q1",
        vec![
            "Customer Code".to_string(),
            "Customer Full Name".to_string(),
            "Address".to_string(),
            "Route".to_string(),
            "Bits Water".to_string(),
            "Bits Soda".to_string(),
        ],
    );
    clients.push_row(vec![
        CellValue::Number(1.0),
        CellValue::Text("Acme".to_string()),
        CellValue::Text("Calle 1".to_string()),
        CellValue::Number(8087.0),
        CellValue::Number(0.0),
        CellValue::Number(1.0),
    ]);
    clients.push_row(vec![
        CellValue::Number(2.0),
        CellValue::Text("Globex".to_string()),
        CellValue::Text("Calle 2".to_string()),
        CellValue::Number(8087.0),
        CellValue::Number(1.0),
        CellValue::Number(1.0),
    ]);
    clients.push_row(vec![
        CellValue::Number(3.0),
        CellValue::Text("Initech".to_string()),
        CellValue::Text("Calle 3".to_string()),
        CellValue::Number(9000.0),
        CellValue::Number(0.0),
        CellValue::Number(0.0),
    ]);

    let mut summary = Sheet::new("Resumen", vec!["Week".to_string(), "Target".to_string()]);
    summary.push_row(vec![CellValue::Number(1.0), CellValue::Number(40.0)]);

    let mut workbook = Workbook::new();
    workbook.push_sheet(summary);
    workbook.push_sheet(clients);
    workbook
}

fn write_fixture(path: &Path) {
    write_workbook(&fixture_workbook(), path).unwrap();
}

#[test]
fn load_selects_marker_sheet_and_filters_route() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let mut store = SheetStore::new(StoreConfig::new(&path));
    let loaded = store.load().unwrap();

    assert_eq!(loaded.sheet_name, "BITS_Q1");
    let codes: Vec<String> = (0..loaded.sheet.rows.len())
        .map(|r| loaded.sheet.key_of(r).unwrap())
        .collect();
    assert_eq!(codes, vec!["1", "2"]);
}

#[test]
fn save_without_mutation_round_trips_every_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let before = read_workbook(&path).unwrap();
    let mut store = SheetStore::new(StoreConfig::new(&path));
    let loaded = store.load().unwrap();
    store.save(&loaded.sheet, &loaded.sheet_name).unwrap();

    assert_eq!(read_workbook(&path).unwrap(), before);
}

#[test]
fn merge_updates_working_rows_and_leaves_the_rest_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let mut store = SheetStore::new(StoreConfig::new(&path));
    let mut loaded = store.load().unwrap();

    let col = loaded.sheet.column_index("Bits Water").unwrap();
    loaded.sheet.rows[0][col] = CellValue::Number(1.0);
    store.save(&loaded.sheet, &loaded.sheet_name).unwrap();

    let after = read_workbook(&path).unwrap();
    let clients = after.sheet("BITS_Q1").unwrap();
    // A updated, B unchanged, C untouched despite being outside the subset.
    assert_eq!(clients.value(0, "Bits Water"), Some(&CellValue::Number(1.0)));
    assert_eq!(clients.value(1, "Bits Water"), Some(&CellValue::Number(1.0)));
    assert_eq!(clients.value(2, "Bits Water"), Some(&CellValue::Number(0.0)));
    assert_eq!(clients.value(2, "Route"), Some(&CellValue::Number(9000.0)));

    // The non-working sheet survives byte-equivalent in content.
    assert_eq!(after.sheet("Resumen"), fixture_workbook().sheet("Resumen"));
}

#[test]
fn unmatched_working_rows_fail_the_save_and_leave_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let mut store = SheetStore::new(StoreConfig::new(&path));
    let mut loaded = store.load().unwrap();

    let mut ghost = vec![CellValue::Empty; loaded.sheet.columns.len()];
    ghost[0] = CellValue::Number(99.0);
    loaded.sheet.rows.push(ghost);

    let before = read_workbook(&path).unwrap();
    let err = store.save(&loaded.sheet, &loaded.sheet_name).unwrap_err();
    match err {
        SaveError::UnmatchedRows { sheet, codes } => {
            assert_eq!(sheet, "BITS_Q1");
            assert_eq!(codes, vec!["99"]);
        }
        other => panic!("expected UnmatchedRows, got {other:?}"),
    }
    assert_eq!(read_workbook(&path).unwrap(), before);
}

#[test]
fn save_aborts_when_the_file_changed_underneath_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let mut store = SheetStore::new(StoreConfig::new(&path));
    let loaded = store.load().unwrap();

    // External writer appends a client and rewrites the file.
    let mut external = read_workbook(&path).unwrap();
    let clients = external.sheet_mut("BITS_Q1").unwrap();
    clients.push_row(vec![
        CellValue::Number(4.0),
        CellValue::Text("Hooli".to_string()),
        CellValue::Text("Calle 4".to_string()),
        CellValue::Number(8087.0),
        CellValue::Number(0.0),
        CellValue::Number(0.0),
    ]);
    write_workbook(&external, &path).unwrap();

    let err = store.save(&loaded.sheet, &loaded.sheet_name).unwrap_err();
    assert!(matches!(err, SaveError::ConcurrentModification { .. }));
}

#[test]
fn duplicate_customer_codes_are_a_malformed_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");

    let mut workbook = fixture_workbook();
    let clients = workbook.sheet_mut("BITS_Q1").unwrap();
    let dupe = clients.rows[0].clone();
    clients.rows.push(dupe);
    write_workbook(&workbook, &path).unwrap();

    let mut store = SheetStore::new(StoreConfig::new(&path));
    assert!(matches!(store.load(), Err(LoadError::Malformed { .. })));
}

#[test]
fn missing_workbook_is_typed_and_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.xlsx");

    let mut store = SheetStore::new(StoreConfig::new(&path));
    assert!(matches!(store.load(), Err(LoadError::Missing { .. })));

    let loaded = store.load_or_empty();
    assert!(loaded.sheet.is_empty());
    assert_eq!(loaded.sheet_name, "");
}

#[test]
fn marker_miss_falls_back_to_the_first_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listado.xlsx");
    write_fixture(&path);

    let config = StoreConfig::new(&path).with_sheet_marker("NOPE");
    let mut store = SheetStore::new(config);
    let loaded = store.load().unwrap();
    assert_eq!(loaded.sheet_name, "Resumen");
}
