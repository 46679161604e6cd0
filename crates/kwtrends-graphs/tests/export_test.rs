//! From a merged table to every download artifact.

use kwtrends_common::test_utils::{keywords, mock_date, trends_fixtures};
use kwtrends_common::Batch;
use kwtrends_config::{ChartConfig, CsvLayout, ExportConfig};
use kwtrends_data::CombinedTable;
use kwtrends_graphs::{ChartRenderer, Exporter};

fn merged_table() -> CombinedTable {
    let mut table = CombinedTable::new();
    table.merge_batch(
        &Batch::new(keywords(&["cats", "dogs"])),
        &trends_fixtures::batch_rows(&["cats", "dogs"], mock_date(2024, 1, 1), 14),
    );
    table.merge_batch(
        &Batch::new(keywords(&["birds"])),
        &trends_fixtures::batch_rows(&["birds"], mock_date(2024, 1, 8), 14),
    );
    table
}

#[test]
fn test_all_artifacts_from_one_table() {
    let table = merged_table();
    let chart = ChartRenderer::new(ChartConfig::default()).render(&table);
    let exporter = Exporter::new(&ExportConfig {
        png_width: 640,
        png_height: 360,
        ..ExportConfig::default()
    });

    let csv = String::from_utf8(exporter.csv(&table).unwrap()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,cats,dogs,birds"));
    assert_eq!(csv.lines().count(), 1 + 21);
    assert!(csv.lines().nth(1).unwrap().ends_with(','));

    let png = exporter.png(&chart).unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!((image.width(), image.height()), (640, 360));

    let json: serde_json::Value = serde_json::from_slice(&exporter.chart_json(&chart).unwrap()).unwrap();
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"][2]["x"][0], "2024-01-08");
}

#[test]
fn test_long_csv_has_one_line_per_cell() {
    let table = merged_table();
    let exporter = Exporter::new(&ExportConfig {
        csv_layout: CsvLayout::Long,
        ..ExportConfig::default()
    });
    let csv = String::from_utf8(exporter.csv(&table).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 1 + table.len());
}

#[test]
fn test_empty_table_gives_empty_chart_not_error() {
    let table = CombinedTable::new();
    let chart = ChartRenderer::default().render(&table);
    let exporter = Exporter::new(&ExportConfig {
        png_width: 200,
        png_height: 120,
        ..ExportConfig::default()
    });

    assert!(chart.is_empty());
    assert!(exporter.png(&chart).is_ok());
    assert!(exporter.chart_json(&chart).is_ok());
}
