//! Export boundary tests: pivot workbook contents and the all-locations
//! download, read back with calamine.

use aqualedger::ledger::Ledger;
use aqualedger::storage::MemoryStore;
use aqualedger::types::{Location, Readings};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_pivot_workbook_cells_match_recorded_days() {
    let mut ledger = Ledger::new(MemoryStore::new());
    for (day, ph, flow) in [(1, 7.2, 12.5), (5, 7.4, 11.0), (20, 7.0, 10.5)] {
        ledger
            .upsert_daily_record(
                Location::PowerPlant,
                date(2024, 3, day),
                Readings {
                    ph: Some(ph),
                    temperature: None,
                    flow: Some(flow),
                },
            )
            .unwrap();
    }

    let pivot = ledger.export_pivot(Location::PowerPlant, 2024, 3).unwrap();
    let bytes = aqualedger::export::pivot_workbook(&pivot).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pivot.xlsx");
    std::fs::write(&path, bytes).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let sheet_names = workbook.sheet_names().to_vec();
    assert_eq!(sheet_names, vec!["Power Plant 2024-03".to_string()]);

    let range = workbook.worksheet_range(&sheet_names[0]).unwrap();
    // Header: Metric, 1..31, Average -> 33 columns; pH, temperature and flow
    // rows below it.
    let (height, width) = range.get_size();
    assert_eq!(height, 4);
    assert_eq!(width, 33);

    // pH row: day 1 populated, day 2 blank, Average = mean of 3 readings.
    assert_eq!(range.get((1, 1)), Some(&Data::Float(7.2)));
    assert!(matches!(range.get((1, 2)), None | Some(&Data::Empty)));
    assert_eq!(range.get((1, 32)), Some(&Data::Float(7.2)));

    // Temperature row is entirely blank, including its average.
    for col in 1..33 {
        assert!(matches!(range.get((2, col)), None | Some(&Data::Empty)));
    }

    // Flow row average: (12.5 + 11.0 + 10.5) / 3 = 11.333
    assert_eq!(range.get((3, 32)), Some(&Data::Float(11.333)));
}

#[test]
fn test_download_workbook_has_one_sheet_per_location() {
    let mut ledger = Ledger::new(MemoryStore::new());
    for location in [Location::Intake, Location::PowerPlant] {
        ledger
            .upsert_daily_record(
                location,
                date(2024, 3, 1),
                Readings {
                    ph: Some(7.1),
                    temperature: Some(25.0),
                    flow: Some(2.0),
                },
            )
            .unwrap();
    }

    let mut tables = Vec::new();
    for location in [Location::Intake, Location::PowerPlant] {
        tables.push((location, ledger.rows(location).unwrap().to_vec()));
    }
    let bytes = aqualedger::export::ledger_workbook(&tables).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("download.xlsx");
    std::fs::write(&path, bytes).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(
        workbook.sheet_names().to_vec(),
        vec!["Intake".to_string(), "Power Plant".to_string()]
    );

    // Each sheet: header, one daily row, one average row.
    for sheet in ["Intake", "Power Plant"] {
        let range = workbook.worksheet_range(sheet).unwrap();
        let (height, _) = range.get_size();
        assert_eq!(height, 3);
        assert_eq!(range.get((0, 0)), Some(&Data::String("Kind".to_string())));
        assert_eq!(range.get((1, 0)), Some(&Data::String("daily".to_string())));
        assert_eq!(
            range.get((2, 0)),
            Some(&Data::String("average".to_string()))
        );
    }
}
