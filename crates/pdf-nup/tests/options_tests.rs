use pdf_nup::*;

#[test]
fn test_defaults_match_documented_values() {
    let params = BuildParams::default();
    assert_eq!(params.paper_size, PaperSize::A4);
    assert_eq!(params.orientation, Orientation::Portrait);
    assert!(params.layout.auto_readable);
    assert_eq!(params.layout.margin_mm, 10.0);
    assert_eq!(params.layout.gap_mm, 4.0);
    assert_eq!(params.layout.min_slide_width_mm, 90.0);
    assert!(params.trim_whitespace);
    assert_eq!(params.trim_threshold, 245);
    assert!(params.draw_page_numbers);
    assert!(!params.draw_cell_indices);
    assert!(params.validate().is_ok());
}

#[test]
fn test_paper_size_name_fallback() {
    assert_eq!(PaperSize::from_name("A3"), PaperSize::A3);
    assert_eq!(PaperSize::from_name(" letter "), PaperSize::Letter);
    assert_eq!(PaperSize::from_name("B5"), PaperSize::A4);
    assert_eq!(PaperSize::from_name(""), PaperSize::A4);
}

#[test]
fn test_landscape_swaps_dimensions() {
    let params = BuildParams {
        paper_size: PaperSize::A3,
        orientation: Orientation::Landscape,
        ..Default::default()
    };
    let (w, h) = params.page_size_pt();
    assert!(w > h);
    assert!((w - 420.0 * 72.0 / 25.4).abs() < 0.01);
}

#[test]
fn test_validation_zero_rows_fixed_grid() {
    let mut params = BuildParams::default();
    params.layout.auto_readable = false;
    params.layout.rows = 0;

    match params.validate() {
        Err(NupError::Config(msg)) => assert!(msg.contains("at least 1")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    // Ignored when the grid is chosen automatically
    params.layout.auto_readable = true;
    assert!(params.validate().is_ok());
}

#[test]
fn test_validation_negative_lengths_and_fonts() {
    let mut params = BuildParams::default();
    params.layout.gap_mm = -1.0;
    assert!(params.validate().is_err());

    let mut params = BuildParams::default();
    params.layout.margin_mm = f32::NAN;
    assert!(params.validate().is_err());

    let mut params = BuildParams::default();
    params.page_number_font_size_pt = 0.0;
    assert!(params.validate().is_err());
}

#[test]
fn test_json_missing_fields_take_defaults() {
    let params = BuildParams::from_json(br#"{"paper_size": "Letter", "layout": {"gap_mm": 2.0}}"#)
        .unwrap();
    assert_eq!(params.paper_size, PaperSize::Letter);
    assert_eq!(params.layout.gap_mm, 2.0);
    assert_eq!(params.layout.margin_mm, 10.0);
    assert!(params.draw_page_numbers);
}

#[test]
fn test_json_unknown_paper_loads_as_a4() {
    let params = BuildParams::from_json(br#"{"paper_size": "Tabloid"}"#).unwrap();
    assert_eq!(params.paper_size, PaperSize::A4);
}

#[test]
fn test_json_malformed_is_config_error() {
    let result = BuildParams::from_json(b"{not json");
    assert!(matches!(result, Err(NupError::Config(_))));
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");

    let params = BuildParams {
        paper_size: PaperSize::A3,
        orientation: Orientation::Landscape,
        layout: LayoutParams {
            rows: 3,
            cols: 4,
            auto_readable: false,
            ..Default::default()
        },
        trim_threshold: 200,
        draw_cell_indices: true,
        ..Default::default()
    };
    params.save(&path).await.unwrap();

    let loaded = BuildParams::load(&path).await.unwrap();
    assert_eq!(loaded, params);
}
