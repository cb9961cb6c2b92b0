use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

//==============================================================================
// Monitoring Locations
//==============================================================================

/// The fixed set of monitoring sites.
///
/// Each location owns one worksheet in the backing store. Submissions for any
/// other site name are rejected before a single row is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Intake,
    Outlet,
    PowerPlant,
    Reservoir,
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::Intake,
        Location::Outlet,
        Location::PowerPlant,
        Location::Reservoir,
    ];

    /// Display name, also used as the worksheet name in both store realizations.
    pub fn name(&self) -> &'static str {
        match self {
            Location::Intake => "Intake",
            Location::Outlet => "Outlet",
            Location::PowerPlant => "Power Plant",
            Location::Reservoir => "Reservoir",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Location::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LedgerError::InvalidLocation(s.to_string()))
    }
}

//==============================================================================
// Metrics and Readings
//==============================================================================

/// The tracked measurement metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Ph,
    Temperature,
    Flow,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Ph, Metric::Temperature, Metric::Flow];

    /// Short key used in error messages and column headers.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Temperature => "temperature",
            Metric::Flow => "flow",
        }
    }

    /// Row label used in pivot reports.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Temperature => "Temperature (°C)",
            Metric::Flow => "Flow (L/s)",
        }
    }

    /// Human-readable description of the metric's valid domain.
    pub fn bounds(&self) -> &'static str {
        match self {
            Metric::Ph => "a value in [0, 14]",
            Metric::Temperature => "a value >= 0",
            Metric::Flow => "a value >= 0",
        }
    }

    /// Check a value against this metric's domain.
    pub fn validate(&self, value: f64) -> LedgerResult<()> {
        let in_domain = match self {
            Metric::Ph => value.is_finite() && (0.0..=14.0).contains(&value),
            Metric::Temperature | Metric::Flow => value.is_finite() && value >= 0.0,
        };
        if in_domain {
            Ok(())
        } else {
            Err(LedgerError::InvalidReading {
                metric: self.key(),
                value,
                bounds: self.bounds(),
            })
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One submission's numeric readings, one slot per metric.
///
/// A `None` slot is a missing reading. Missing readings are excluded from
/// averaging entirely — they never count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    pub flow: Option<f64>,
}

impl Readings {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ph => self.ph,
            Metric::Temperature => self.temperature,
            Metric::Flow => self.flow,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Ph => self.ph = Some(value),
            Metric::Temperature => self.temperature = Some(value),
            Metric::Flow => self.flow = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }

    /// Validate every present value against its metric domain.
    pub fn validate(&self) -> LedgerResult<()> {
        for metric in Metric::ALL {
            if let Some(value) = self.get(metric) {
                metric.validate(value)?;
            }
        }
        Ok(())
    }
}

//==============================================================================
// Periods and Records
//==============================================================================

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Construct a period, rejecting month numbers outside 1..=12.
    pub fn new(year: i32, month: u32) -> LedgerResult<Period> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(LedgerError::Parse(format!(
                "invalid calendar period {month:02}/{year}"
            )));
        }
        Ok(Period { year, month })
    }

    /// The period a date falls in.
    pub fn of(date: NaiveDate) -> Period {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Number of days in this month.
    pub fn days(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        // Period::new guarantees the first of the month exists.
        next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(31)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// One operator submission: the readings taken at a location on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub readings: Readings,
}

/// Derived per-month averages; regenerated in full whenever a daily row changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverageRecord {
    pub period: Period,
    pub averages: Readings,
}

/// A row of the ledger table.
///
/// Daily and average rows live in the same table but are discriminated by this
/// variant, not by a marker value inside the date field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerRow {
    Daily(DailyRecord),
    MonthlyAverage(MonthlyAverageRecord),
}

impl LedgerRow {
    pub fn as_daily(&self) -> Option<&DailyRecord> {
        match self {
            LedgerRow::Daily(record) => Some(record),
            LedgerRow::MonthlyAverage(_) => None,
        }
    }

    pub fn as_average(&self) -> Option<&MonthlyAverageRecord> {
        match self {
            LedgerRow::Daily(_) => None,
            LedgerRow::MonthlyAverage(record) => Some(record),
        }
    }
}
