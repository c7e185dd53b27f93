use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rent_invoice::draft::{self, GeminiDrafter};
use rent_invoice::io::fetch::SheetsClient;
use rent_invoice::model::BillingPeriod;
use rent_invoice::settings::{Settings, SettingsOverrides};
use rent_invoice::sync::{self, InvoiceStyle};
use rent_invoice::{FailureKind, InvoiceError, Result, render};
use tracing_subscriber::EnvFilter;

/// Exit code used when the range is valid but holds no rooms.
const EXIT_NO_DATA: i32 = 2;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
    }
    if let Err(error) = run(cli) {
        eprintln!("{error}");
        let code = if error.kind() == FailureKind::NoDataFound {
            EXIT_NO_DATA
        } else {
            1
        };
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| InvoiceError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path).merged(cli.source.overrides());

    if cli.save {
        settings.save(&settings_path)?;
    }

    match cli.command {
        Command::Rooms(args) => execute_rooms(&settings, args),
        Command::Invoice(args) => execute_invoice(&settings, args),
        Command::Draft(args) => execute_draft(&settings, args),
    }
}

fn execute_rooms(settings: &Settings, args: RoomsArgs) -> Result<()> {
    let records = sync::load_rooms(&SheetsClient::new()?, settings)?;

    if let Some(path) = &args.export {
        sync::export_rooms(&records, path)?;
    }

    match args.format {
        TableFormat::Text => println!("{}", render::room_table(&records)),
        TableFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

fn execute_invoice(settings: &Settings, args: InvoiceArgs) -> Result<()> {
    let records = sync::load_rooms(&SheetsClient::new()?, settings)?;
    let record = sync::select_room(&records, &args.room.room)?;
    let period = args.room.period();

    let text = sync::render_invoice(record, &settings.payment(), &period, args.style.into());
    match &args.output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn execute_draft(settings: &Settings, args: DraftArgs) -> Result<()> {
    let records = sync::load_rooms(&SheetsClient::new()?, settings)?;
    let record = sync::select_room(&records, &args.room.room)?;
    let period = args.room.period();
    let payment = settings.payment();

    if args.prompt_only {
        println!("{}", draft::build_prompt(record, &payment, &period));
        return Ok(());
    }

    let drafter = GeminiDrafter::from_env(args.model)?;
    let text = sync::draft_invoice(&drafter, record, &payment, &period)?;
    println!("{text}");
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate monthly rent invoices from a link-shared Google Sheet."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    source: SourceArgs,

    /// Settings file to read and, with --save, to write.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Persist the effective sheet and payment settings.
    #[arg(long, global = true)]
    save: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List every room found in the sheet range.
    Rooms(RoomsArgs),
    /// Print the invoice for one room.
    Invoice(InvoiceArgs),
    /// Ask the drafting service to write the invoice message for one room.
    Draft(DraftArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Link to the Google Sheet (shared with anyone who has the link).
    #[arg(long, global = true)]
    sheet_url: Option<String>,

    /// Cell range including the header row, e.g. A1:K29.
    #[arg(long, global = true)]
    range: Option<String>,

    /// Bank name printed on invoices.
    #[arg(long, global = true)]
    bank_name: Option<String>,

    /// Account number printed on invoices.
    #[arg(long, global = true)]
    account_number: Option<String>,

    /// Account holder printed on invoices.
    #[arg(long, global = true)]
    account_name: Option<String>,

    /// Transfer note template; {thang} becomes the billing month.
    #[arg(long, global = true)]
    payment_note: Option<String>,
}

impl SourceArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            sheet_url: self.sheet_url.clone(),
            range: self.range.clone(),
            bank_name: self.bank_name.clone(),
            account_number: self.account_number.clone(),
            account_name: self.account_name.clone(),
            payment_note: self.payment_note.clone(),
        }
    }
}

#[derive(clap::Args)]
struct RoomsArgs {
    /// Output format for the room table.
    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    format: TableFormat,

    /// Also write the room table to this .xlsx file.
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(clap::Args)]
struct RoomSelection {
    /// Room name (or tenant name) to bill.
    #[arg(long)]
    room: String,

    /// Billing month, defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Billing year, defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

impl RoomSelection {
    fn period(&self) -> BillingPeriod {
        BillingPeriod::current().with_overrides(self.month, self.year)
    }
}

#[derive(clap::Args)]
struct InvoiceArgs {
    #[command(flatten)]
    room: RoomSelection,

    /// Invoice layout.
    #[arg(long, value_enum, default_value_t = StyleKind::Plain)]
    style: StyleKind,

    /// Write the invoice to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DraftArgs {
    #[command(flatten)]
    room: RoomSelection,

    /// Print the prompt instead of sending it.
    #[arg(long)]
    prompt_only: bool,

    /// Drafting model to use.
    #[arg(long, env = "RENT_INVOICE_MODEL")]
    model: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TableFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StyleKind {
    Plain,
    Statement,
}

impl From<StyleKind> for InvoiceStyle {
    fn from(kind: StyleKind) -> Self {
        match kind {
            StyleKind::Plain => InvoiceStyle::Plain,
            StyleKind::Statement => InvoiceStyle::Statement,
        }
    }
}
