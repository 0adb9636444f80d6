use pretty_assertions::assert_eq;
use rutero_model::{
    classify, coverage, filter_by_route, flag_columns, progress, sold_today, CellValue, FlagState,
    Sheet, Workbook,
};

fn working_sheet() -> Sheet {
    let mut sheet = Sheet::new(
        "BITS_Q1",
        vec![
            "Customer Code".to_string(),
            "Customer Full Name".to_string(),
            "Route".to_string(),
            "Bits Water".to_string(),
            "Bits Soda".to_string(),
            "Notes".to_string(),
        ],
    );
    sheet.push_row(vec![
        CellValue::Number(1.0),
        CellValue::Text("Acme".to_string()),
        CellValue::Number(8087.0),
        CellValue::Number(0.0),
        CellValue::Number(1.0),
        CellValue::Empty,
    ]);
    sheet.push_row(vec![
        CellValue::Number(2.0),
        CellValue::Text("Globex".to_string()),
        CellValue::Number(9000.0),
        CellValue::Number(1.0),
        CellValue::Number(1.0),
        CellValue::Empty,
    ]);
    sheet.push_row(vec![
        CellValue::Number(3.0),
        CellValue::Text("Initech".to_string()),
        CellValue::Number(8087.0),
        CellValue::Number(0.0),
        CellValue::Number(0.0),
        CellValue::Empty,
    ]);
    sheet
}

#[test]
fn display_renders_integral_numbers_without_decimals() {
    assert_eq!(CellValue::Number(8087.0).display(), "8087");
    assert_eq!(CellValue::Number(0.5).display(), "0.5");
    assert_eq!(CellValue::Text("8087".to_string()).display(), "8087");
    assert_eq!(CellValue::Empty.display(), "");
    assert_eq!(CellValue::Bool(true).display(), "TRUE");
}

#[test]
fn flag_interpretation() {
    assert!(CellValue::Number(1.0).is_set());
    assert!(!CellValue::Number(0.0).is_set());
    assert!(CellValue::Text("1".to_string()).is_set());
    assert!(!CellValue::Text("yes".to_string()).is_set());
    assert!(CellValue::Bool(true).is_set());
    assert!(!CellValue::Empty.is_set());
}

#[test]
fn route_filter_is_a_partition_of_matching_rows() {
    let sheet = working_sheet();
    let filtered = filter_by_route(&sheet, "8087");

    // Exactly the rows whose route matches, in original order.
    let codes: Vec<String> = (0..filtered.rows.len())
        .map(|r| filtered.key_of(r).unwrap())
        .collect();
    assert_eq!(codes, vec!["1", "3"]);

    // Stable: same input, same output.
    assert_eq!(filter_by_route(&sheet, "8087"), filtered);
}

#[test]
fn route_filter_without_route_column_passes_through() {
    let mut sheet = Sheet::new(
        "BITS_Q1",
        vec!["Customer Code".to_string(), "Bits Water".to_string()],
    );
    sheet.push_row(vec![CellValue::Number(1.0), CellValue::Number(0.0)]);

    assert_eq!(filter_by_route(&sheet, "8087"), sheet);
}

#[test]
fn marker_selection_is_case_insensitive_with_first_sheet_fallback() {
    let mut workbook = Workbook::new();
    workbook.push_sheet(Sheet::new("Resumen", vec![]));
    workbook.push_sheet(Sheet::new("bits q1", vec![]));

    assert_eq!(workbook.select_by_marker("BIT").unwrap().name, "bits q1");
    assert_eq!(workbook.select_by_marker("ZZZ").unwrap().name, "Resumen");
    assert!(Workbook::new().select_by_marker("BIT").is_none());
}

#[test]
fn flag_columns_follow_column_order() {
    let sheet = working_sheet();
    assert_eq!(flag_columns(&sheet, "Bits"), vec!["Bits Water", "Bits Soda"]);
    assert!(flag_columns(&sheet, "Gadget").is_empty());
}

#[test]
fn progress_counts_set_flags() {
    let sheet = working_sheet();
    let flags = flag_columns(&sheet, "Bits");

    let p = progress(&sheet, 0, &flags);
    assert_eq!((p.done, p.total), (1, 2));
    assert_eq!(p.ratio(), 0.5);

    // No flag columns: defined ratio of zero, not a division failure.
    let p = progress(&sheet, 0, &[]);
    assert_eq!((p.done, p.total), (0, 0));
    assert_eq!(p.ratio(), 0.0);
}

#[test]
fn classification_truth_table() {
    let set = CellValue::Number(1.0);
    let unset = CellValue::Number(0.0);

    assert_eq!(classify(&unset, &unset), FlagState::Missing);
    // Current unset wins regardless of the snapshot.
    assert_eq!(classify(&unset, &set), FlagState::Missing);
    assert_eq!(classify(&set, &set), FlagState::Stocked);
    assert_eq!(classify(&set, &unset), FlagState::SoldThisSession);
}

#[test]
fn coverage_is_idempotent_and_increases_on_new_sales() {
    let mut sheet = working_sheet();
    let flags = flag_columns(&sheet, "Bits");

    let before = coverage(&sheet, &flags);
    assert_eq!(before, coverage(&sheet, &flags));

    let col = sheet.column_index("Bits Water").unwrap();
    sheet.rows[0][col] = CellValue::Number(1.0);
    assert!(coverage(&sheet, &flags) > before);

    assert_eq!(coverage(&Sheet::default(), &flags), 0.0);
}

#[test]
fn sold_today_counts_only_session_deltas() {
    let original = working_sheet();
    let mut current = original.clone();
    let flags = flag_columns(&current, "Bits");
    assert_eq!(sold_today(&current, &original, &flags), 0);

    let water = current.column_index("Bits Water").unwrap();
    let soda = current.column_index("Bits Soda").unwrap();
    current.rows[0][water] = CellValue::Number(1.0);
    current.rows[2][soda] = CellValue::Number(1.0);
    assert_eq!(sold_today(&current, &original, &flags), 2);

    // Undoing a session sale removes it from the delta.
    current.rows[0][water] = CellValue::Number(0.0);
    assert_eq!(sold_today(&current, &original, &flags), 1);
}

#[test]
fn find_by_key_matches_numeric_and_text_codes() {
    let sheet = working_sheet();
    assert_eq!(sheet.find_by_key("2").unwrap(), Some(1));
    assert_eq!(sheet.find_by_key("99").unwrap(), None);

    let no_key = Sheet::new("X", vec!["Name".to_string()]);
    assert!(no_key.find_by_key("1").is_err());
}

#[test]
fn duplicate_keys_are_reported_once() {
    let mut sheet = working_sheet();
    let row = sheet.rows[0].clone();
    sheet.rows.push(row.clone());
    sheet.rows.push(row);
    assert_eq!(sheet.duplicate_keys(), vec!["1"]);

    assert!(working_sheet().duplicate_keys().is_empty());
}

#[test]
fn cell_value_serializes_with_tagged_layout() {
    let json = serde_json::to_value(CellValue::Number(1.0)).unwrap();
    assert_eq!(json, serde_json::json!({"type": "number", "value": 1.0}));

    let json = serde_json::to_value(CellValue::Empty).unwrap();
    assert_eq!(json, serde_json::json!({"type": "empty"}));
}
