mod common;

use common::*;
use pdf_nup::*;

fn images(count: usize) -> Vec<image::DynamicImage> {
    (0..count)
        .map(|i| image_with_box(120 + i as u32, 80, 10, 10, 60, 60))
        .collect()
}

#[test]
fn test_four_images_per_page() {
    let output = build_image_sheets(&images(9), "Anatomy", PaperSize::A4).unwrap();
    assert_eq!(output.page_count(), 3);
    assert_eq!((output.rows(), output.cols()), (2, 2));
    assert_eq!(output.placements().len(), 9);
    assert_eq!(output.placements()[8].output_page, 2);
    assert_eq!(output.placements()[8].slot, 0);
}

#[test]
fn test_pages_are_landscape() {
    let output = build_image_sheets(&images(1), "Anatomy", PaperSize::Letter).unwrap();
    let doc = output.document();
    let page_id = *doc.get_pages().values().next().unwrap();
    let media_box = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();
    assert!(width > height);
}

#[test]
fn test_title_and_page_number_on_every_page() {
    let output = build_image_sheets(&images(5), "Week (3)", PaperSize::A4).unwrap();
    let contents = page_contents(output.document());

    for (i, content) in contents.iter().enumerate() {
        assert!(content.contains("(Week \\(3\\)) Tj"));
        assert!(content.contains(&format!("({}) Tj", i + 1)));
    }
}

#[test]
fn test_images_keep_aspect_ratio() {
    let output = build_image_sheets(&images(1), "Ratio", PaperSize::A4).unwrap();
    let dest = output.placements()[0].dest;
    assert!((dest.width / dest.height - 1.5).abs() < 1e-3);
}

#[test]
fn test_sheet_errors() {
    assert!(matches!(
        build_image_sheets(&[], "Title", PaperSize::A4),
        Err(NupError::NoImages)
    ));
    assert!(matches!(
        build_image_sheets(&images(1), "  ", PaperSize::A4),
        Err(NupError::Config(_))
    ));
    assert!(matches!(
        build_image_sheets(&images(1), "??", PaperSize::A4),
        Err(NupError::Config(_))
    ));
}

#[tokio::test]
async fn test_undecodable_file_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    image_with_box(20, 20, 0, 0, 5, 5).save(&good).unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"not an image").unwrap();

    let result = build_image_sheets_from_files(&[good.clone(), bad], "Mixed", PaperSize::A4).await;
    assert!(result.is_err());

    let output = build_image_sheets_from_files(&[good], "Mixed", PaperSize::A4)
        .await
        .unwrap();
    assert_eq!(output.page_count(), 1);
}
