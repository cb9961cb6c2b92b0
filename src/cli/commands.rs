use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use colored::Colorize;

use super::store::StorageArgs;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{ledger_workbook, pivot_workbook};
use crate::ledger::{Ledger, ResetTarget};
use crate::storage::TableStore;
use crate::types::{Location, Metric, MonthlyAverageRecord, Readings};

/// Format a reading for display: 3 decimals, dash when missing.
fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.3}"),
        None => "-".to_string(),
    }
}

/// Parse a submitted date, ignoring any time-of-day component. Defaults to
/// today when the form leaves the field empty.
fn parse_date(input: Option<&str>) -> LedgerResult<NaiveDate> {
    let Some(input) = input else {
        return Ok(Local::now().date_naive());
    };
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    Err(LedgerError::Parse(format!(
        "unrecognized date '{trimmed}' (expected YYYY-MM-DD)"
    )))
}

fn print_averages_table(averages: &[MonthlyAverageRecord]) {
    println!(
        "   {:<10} {:>10} {:>14} {:>10}",
        "Period".bold(),
        "pH".bold(),
        "Temperature".bold(),
        "Flow".bold()
    );
    for record in averages {
        println!(
            "   {:<10} {:>10} {:>14} {:>10}",
            record.period.to_string(),
            format_reading(record.averages.ph),
            format_reading(record.averages.temperature),
            format_reading(record.averages.flow)
        );
    }
}

/// Execute the init command
pub fn init(storage: &StorageArgs) -> LedgerResult<()> {
    println!("{}", "💧 Aqualedger - Provisioning ledger".bold().green());
    let store = storage.provision()?;
    let provisioned = store.list_locations()?;
    for location in &provisioned {
        println!("   📋 {}", location.to_string().bright_blue());
    }
    println!(
        "{}",
        format!("✅ {} location tables ready", provisioned.len())
            .bold()
            .green()
    );
    Ok(())
}

/// Execute the record command: one form submission
pub fn record(
    storage: &StorageArgs,
    location: &str,
    date: Option<&str>,
    ph: f64,
    temperature: Option<f64>,
    flow: f64,
) -> LedgerResult<()> {
    let location: Location = location.parse()?;
    let date = parse_date(date)?;
    let readings = Readings {
        ph: Some(ph),
        temperature,
        flow: Some(flow),
    };

    println!("{}", "💧 Aqualedger - Recording measurement".bold().green());
    println!("   Location: {}", location.to_string().bright_blue().bold());
    println!("   Date: {date}");
    for metric in Metric::ALL {
        if let Some(value) = readings.get(metric) {
            println!("   {}: {value}", metric.key().cyan());
        }
    }
    println!();

    let mut ledger = Ledger::new(storage.open()?);
    let averages = ledger.upsert_daily_record(location, date, readings)?;

    println!("{}", "✅ Saved".bold().green());
    if !averages.is_empty() {
        println!("\n   📊 Monthly averages (recomputed):");
        print_averages_table(&averages);
    }
    Ok(())
}

/// Execute the averages command
pub fn averages(storage: &StorageArgs, location: &str) -> LedgerResult<()> {
    let location: Location = location.parse()?;

    println!("{}", "💧 Aqualedger - Monthly averages".bold().green());
    println!("   Location: {}\n", location.to_string().bright_blue().bold());

    let mut ledger = Ledger::new(storage.open()?);
    let averages = ledger.recompute_monthly_averages(location)?;

    if averages.is_empty() {
        println!("   {}", "No daily records yet".yellow());
        return Ok(());
    }
    print_averages_table(&averages);
    Ok(())
}

/// Execute the pivot command
pub fn pivot(
    storage: &StorageArgs,
    location: &str,
    year: i32,
    month: u32,
    output: &Path,
) -> LedgerResult<()> {
    let location: Location = location.parse()?;

    println!("{}", "💧 Aqualedger - Pivot report".bold().green());
    println!("   Location: {}", location.to_string().bright_blue().bold());
    println!("   Period: {month:02}/{year}");
    println!("   Output: {}\n", output.display());

    let mut ledger = Ledger::new(storage.open()?);
    let pivot = ledger.export_pivot(location, year, month)?;
    let populated: usize = pivot
        .rows
        .first()
        .map(|row| row.cells.iter().flatten().count())
        .unwrap_or(0);

    fs::write(output, pivot_workbook(&pivot)?)?;

    println!(
        "{}",
        format!("✅ Pivot written ({populated} recorded days)")
            .bold()
            .green()
    );
    Ok(())
}

/// Execute the download command: every location's table in one workbook
pub fn download(storage: &StorageArgs, output: &Path) -> LedgerResult<()> {
    println!("{}", "💧 Aqualedger - Download all locations".bold().green());
    println!("   Output: {}\n", output.display());

    let mut ledger = Ledger::new(storage.open()?);
    let mut tables = Vec::new();
    for location in ledger.store().list_locations()? {
        let rows = ledger.rows(location)?.to_vec();
        println!("   📋 {} ({} rows)", location.to_string().bright_blue(), rows.len());
        tables.push((location, rows));
    }

    fs::write(output, ledger_workbook(&tables)?)?;
    println!("{}", "✅ Workbook written".bold().green());
    Ok(())
}

/// Execute the reset command
pub fn reset(storage: &StorageArgs, location: Option<&str>, all: bool) -> LedgerResult<()> {
    let target = match (location, all) {
        (Some(location), false) => ResetTarget::One(location.parse()?),
        (None, true) => ResetTarget::All,
        // clap enforces exactly one of the two; guard for library callers.
        _ => {
            return Err(LedgerError::Parse(
                "reset needs either --location <name> or --all".to_string(),
            ))
        }
    };

    println!("{}", "💧 Aqualedger - Reset".bold().green());
    match target {
        ResetTarget::One(location) => {
            println!("   Location: {}\n", location.to_string().bright_blue().bold())
        }
        ResetTarget::All => println!("   Target: {}\n", "all locations".bright_blue().bold()),
    }

    let mut ledger = Ledger::new(storage.open()?);
    ledger.reset(target)?;

    println!("{}", "✅ Ledger cleared".bold().green());
    println!(
        "   {}",
        "This is irreversible; daily rows and averages are gone".yellow()
    );
    Ok(())
}

/// Execute the locations command
pub fn locations(storage: &StorageArgs) -> LedgerResult<()> {
    println!("{}", "💧 Aqualedger - Locations".bold().green());
    let store = storage.open()?;
    let provisioned = store.list_locations()?;
    for location in Location::ALL {
        let mark = if provisioned.contains(&location) {
            "✅".to_string()
        } else {
            "—".yellow().to_string()
        };
        println!("   {mark} {}", location.to_string().bright_blue());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_defaults_to_today() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_ignores_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date(Some("2024-03-01")).unwrap(), expected);
        assert_eq!(parse_date(Some("2024-03-01 13:45:00")).unwrap(), expected);
        assert_eq!(parse_date(Some("2024-03-01T13:45:00")).unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date(Some("01/03/2024")).is_err());
        assert!(parse_date(Some("yesterday")).is_err());
    }

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading(Some(7.3)), "7.300");
        assert_eq!(format_reading(None), "-");
    }
}
