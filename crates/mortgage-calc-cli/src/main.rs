mod commands;
mod input;
mod output;
mod session;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::overpayment::{CompareArgs, LumpSumArgs, OverpayArgs};
use commands::scenario::{AddArgs, ImportArgs, ScenarioIdArgs};
use commands::schedule::ScheduleArgs;
use session::Session;

/// Compare fixed-rate mortgage scenarios
#[derive(Parser)]
#[command(
    name = "mortgage-calc",
    version,
    about = "Compare fixed-rate mortgage scenarios",
    long_about = "Enter mortgage scenarios (principal, APR, term) and compare monthly \
                  payments, lifetime interest, amortisation schedules and the effect \
                  of lump-sum or monthly overpayments. Scenarios persist to a JSON or \
                  CSV file between runs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Scenario file; `.csv` selects CSV, anything else JSON
    #[arg(
        long,
        env = "MORTGAGE_CALC_STORE",
        default_value = "mortgage_scenarios.json",
        global = true
    )]
    store: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new mortgage scenario
    Add(AddArgs),
    /// Register scenarios from a JSON file or piped stdin
    Import(ImportArgs),
    /// Summary table of every scenario
    List,
    /// Details and headline figures for one scenario
    Show(ScenarioIdArgs),
    /// Amortisation schedule, yearly breakdown or interest-to-date
    Schedule(ScheduleArgs),
    /// Pay a lump sum off the principal (registers a new scenario)
    LumpSum(LumpSumArgs),
    /// Project a recurring monthly overpayment
    Overpay(OverpayArgs),
    /// Payment and interest difference between two scenarios
    Compare(CompareArgs),
    /// Remove a scenario
    Remove(ScenarioIdArgs),
    /// Menu-driven interactive session
    Interactive,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("mortgage-calc {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let mut session = match Session::open(store::open_store(&cli.store)) {
        Ok(session) => session,
        Err(e) => fail(&e),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Add(args) => commands::scenario::run_add(args, &mut session),
        Commands::Import(args) => commands::scenario::run_import(args, &mut session),
        Commands::List => commands::scenario::run_list(&session),
        Commands::Show(args) => commands::scenario::run_show(args, &session),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &session),
        Commands::LumpSum(args) => commands::overpayment::run_lump_sum(args, &mut session),
        Commands::Overpay(args) => commands::overpayment::run_overpay(args, &session),
        Commands::Compare(args) => commands::overpayment::run_compare(args, &session),
        Commands::Remove(args) => commands::scenario::run_remove(args, &mut session),
        Commands::Interactive => match commands::interactive::run_interactive(&mut session) {
            Ok(()) => process::exit(0),
            Err(e) => fail(e.as_ref()),
        },
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e.as_ref()),
    }
}

fn fail(e: &dyn std::error::Error) -> ! {
    output::print_error(e);
    process::exit(1);
}
