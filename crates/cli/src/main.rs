//! Bazaar CLI - Marketplace reports and offline form validation.
//!
//! # Usage
//!
//! ```bash
//! # Sales over the last 30 days, fetched from the API
//! bazaar report sales --window 30d
//!
//! # Product performance from exported JSON
//! bazaar report products --orders orders.json --products products.json
//!
//! # Check a draft before submitting it
//! bazaar validate product draft.json
//! ```
//!
//! # Commands
//!
//! - `report sales` - Totals, average order value and top products in a window
//! - `report products` - Per-product revenue and units sold
//! - `validate` - Run a form's rules against a JSON document
//!
//! Reports read from files when given, otherwise from the API configured by
//! `BAZAAR_API_URL` and `BAZAAR_API_TOKEN`. Logs go to stderr; set
//! `BAZAAR_LOG_JSON=1` for JSON lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bazaar_core::report::ReportWindow;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::validate::FormKind;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar marketplace tools")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate marketplace reports
    Report {
        #[command(subcommand)]
        report: ReportKind,
    },
    /// Validate a form document
    Validate {
        /// Which form's rules to apply
        #[arg(value_enum)]
        form: FormKind,

        /// JSON object with the form's fields
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Sales totals within a time window
    Sales {
        /// Time window (`all`, `7d`, `30d`, `90d`)
        #[arg(short, long, default_value = "all")]
        window: ReportWindow,

        /// Orders JSON file instead of the API
        #[arg(long)]
        orders: Option<PathBuf>,
    },
    /// Per-product performance
    Products {
        /// Orders JSON file instead of the API
        #[arg(long)]
        orders: Option<PathBuf>,

        /// Products JSON file instead of the API
        #[arg(long)]
        products: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_cli=info,bazaar_client=info".into());

    let json = std::env::var("BAZAAR_LOG_JSON").is_ok_and(|value| !value.is_empty());
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let output = commands::Output { json: cli.json };
    match cli.command {
        Commands::Report { report } => match report {
            ReportKind::Sales { window, orders } => {
                commands::report::sales(window, orders.as_deref(), output).await
            }
            ReportKind::Products { orders, products } => {
                commands::report::products(orders.as_deref(), products.as_deref(), output).await
            }
        },
        Commands::Validate { form, file } => commands::validate::run(form, &file, output),
    }
}
