//! tests/export_tests.rs
//! Export de resultados a .xlsx

#[cfg(test)]
mod tests {
    use calamine::{open_workbook_auto, Data, Reader};
    use serde_json::json;

    use crate::services::export_service::{
        build_workbook, collect_columns, export_filename, to_rows, EXPORT_SHEET_NAME,
    };

    #[test]
    fn columns_follow_first_appearance() {
        let rows = to_rows(vec![
            json!({"csid": "CS1", "found_sheets": "JKT-01"}),
            json!({"csid": "CS2", "note": "vip", "found_sheets": "Not Found"}),
        ])
        .unwrap();

        assert_eq!(collect_columns(&rows), vec!["csid", "found_sheets", "note"]);
    }

    #[test]
    fn non_object_rows_are_rejected() {
        assert!(to_rows(vec![json!({"csid": "CS1"}), json!("CS2")]).is_err());
    }

    #[test]
    fn filename_has_timestamp() {
        let name = export_filename();
        assert!(name.starts_with("csid_results_"));
        assert!(name.ends_with(".xlsx"));
        // csid_results_YYYYmmdd_HHMMSS.xlsx
        assert_eq!(name.len(), "csid_results_20250101_120000.xlsx".len());
    }

    #[test]
    fn workbook_has_header_and_typed_cells() {
        let rows = to_rows(vec![
            json!({"csid": "CS1", "found_sheets": "JKT-01, BDG-02", "count": 2}),
            json!({"csid": "CS2", "flag": true, "extra": {"a": 1}}),
        ])
        .unwrap();

        let bytes = build_workbook(&rows).expect("export should build");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        std::fs::write(&path, &bytes).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![EXPORT_SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(EXPORT_SHEET_NAME).unwrap();
        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, vec!["csid", "found_sheets", "count", "flag", "extra"]);

        assert_eq!(range.get_value((1, 1)), Some(&Data::String("JKT-01, BDG-02".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(2.0)));
        assert_eq!(range.get_value((2, 3)), Some(&Data::Bool(true)));
        assert_eq!(range.get_value((2, 4)), Some(&Data::String(r#"{"a":1}"#.into())));
        // clave ausente => celda vacía
        assert_eq!(range.get_value((2, 1)), Some(&Data::Empty));
    }
}
