use aqualedger::cli::{self, StorageArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aqualedger")]
#[command(about = "Daily water-quality ledger over a spreadsheet store.")]
#[command(long_about = "Aqualedger - Daily water-quality measurement ledger

Records pH, temperature and flow per monitoring location into a spreadsheet
store (a local .xlsx workbook or a hosted spreadsheet document), keeps
derived monthly-average rows consistent with the daily rows, and exports
day-by-metric pivot reports.

STORAGE:
  Local:  --file ledger.xlsx
  Remote: --document <id> with AQUALEDGER_TOKEN (and optionally
          AQUALEDGER_ENDPOINT) in the environment

COMMANDS:
  init       - Provision empty location tables
  record     - Record one day's measurements for a location
  averages   - Recompute and show monthly averages
  pivot      - Export a day-by-metric pivot report (.xlsx)
  download   - Export every location's table as one workbook
  reset      - Discard all rows for one location or all of them
  locations  - Show which location tables are provisioned

EXAMPLES:
  aqualedger init -f ledger.xlsx
  aqualedger record -f ledger.xlsx -l \"Power Plant\" --date 2024-03-01 --ph 7.2 --flow 12.5
  aqualedger averages -f ledger.xlsx -l \"Power Plant\"
  aqualedger pivot -f ledger.xlsx -l Intake --year 2024 --month 3 -o march.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Provision empty location tables.

Creates the local workbook (refusing to overwrite an existing one) or writes
header-only worksheets to the remote document, one per monitoring location.
Every other command expects the store to have been provisioned first: a
missing workbook or unreachable document is a storage error, not an implicit
create.")]
    /// Provision empty location tables
    Init {
        #[command(flatten)]
        storage: StorageArgs,
    },

    #[command(long_about = "Record one day's measurements for a location.

Inserts or replaces the daily row for (location, date): submitting the same
date twice keeps only the latest readings. Readings are validated before
anything is written - pH must lie in [0, 14], temperature and flow must be
non-negative - and the month's average rows are regenerated from the daily
rows as part of the same save.

DATE HANDLING:
  --date accepts YYYY-MM-DD (a time-of-day suffix is ignored) and defaults
  to today.

EXAMPLE:
  aqualedger record -f ledger.xlsx -l \"Power Plant\" --ph 7.2 --flow 12.5 --temperature 26.5")]
    /// Record one day's measurements for a location
    Record {
        #[command(flatten)]
        storage: StorageArgs,

        /// Monitoring location (Intake, Outlet, Power Plant, Reservoir)
        #[arg(short, long)]
        location: String,

        /// Measurement date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,

        /// pH reading, in [0, 14]
        #[arg(long)]
        ph: f64,

        /// Water temperature in °C, >= 0
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Flow (debit) in L/s, >= 0
        #[arg(long)]
        flow: f64,
    },

    #[command(long_about = "Recompute and show monthly averages for a location.

Averages are always rebuilt from the current daily rows - never incrementally
updated - and persisted, so the table on disk matches what is shown. Each
metric's mean covers only the days that actually carry a value for it;
missing readings are excluded, not counted as zero.")]
    /// Recompute and show monthly averages
    Averages {
        #[command(flatten)]
        storage: StorageArgs,

        /// Monitoring location
        #[arg(short, long)]
        location: String,
    },

    #[command(long_about = "Export a day-by-metric pivot report for one month.

The report has one row per metric and one column per day of the month plus a
trailing Average column. A cell is populated only where a daily record
exists; other days stay blank. If the stored table holds two daily rows for
the same date (legacy or merged data), the export fails naming the date
rather than silently picking one value.")]
    /// Export a day-by-metric pivot report (.xlsx)
    Pivot {
        #[command(flatten)]
        storage: StorageArgs,

        /// Monitoring location
        #[arg(short, long)]
        location: String,

        /// Report year
        #[arg(short, long)]
        year: i32,

        /// Report month (1-12)
        #[arg(short, long)]
        month: u32,

        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
    },

    #[command(long_about = "Export every location's table as one workbook.

Writes one worksheet per provisioned location in the same layout the local
store persists, suitable for archiving before a reset.")]
    /// Export every location's table as one workbook
    Download {
        #[command(flatten)]
        storage: StorageArgs,

        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
    },

    #[command(long_about = "Discard all rows for one location or all of them.

Clears daily rows and average rows alike, leaving empty tables with the same
schema. This is destructive and irreversible - use 'download' first if the
data should be archived.")]
    /// Discard all rows for one location or all of them
    Reset {
        #[command(flatten)]
        storage: StorageArgs,

        /// Monitoring location to clear
        #[arg(short, long, conflicts_with = "all", required_unless_present = "all")]
        location: Option<String>,

        /// Clear every location
        #[arg(long)]
        all: bool,
    },

    /// Show which location tables are provisioned
    Locations {
        #[command(flatten)]
        storage: StorageArgs,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aqualedger=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { storage } => cli::init(&storage),

        Commands::Record {
            storage,
            location,
            date,
            ph,
            temperature,
            flow,
        } => cli::record(&storage, &location, date.as_deref(), ph, temperature, flow),

        Commands::Averages { storage, location } => cli::averages(&storage, &location),

        Commands::Pivot {
            storage,
            location,
            year,
            month,
            output,
        } => cli::pivot(&storage, &location, year, month, &output),

        Commands::Download { storage, output } => cli::download(&storage, &output),

        Commands::Reset {
            storage,
            location,
            all,
        } => cli::reset(&storage, location.as_deref(), all),

        Commands::Locations { storage } => cli::locations(&storage),
    };
    result?;
    Ok(())
}
